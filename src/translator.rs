use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::I18nConfig;
use crate::catalog::{Catalog, LocaleRegistry};
use crate::context::LocaleContext;
use crate::error::{I18nError, Result, ResultExt};
use crate::format::Arg;
use crate::loader::{DirSource, LocaleSource, Loader, load_locales};
use crate::locale::LocaleTag;
use crate::printer::Printer;

type ExtendHook = Box<dyn FnOnce(&Catalog) -> Result<()>>;

/// Configures and builds a [`Translator`].
///
/// Build order: local locale files, then the [`extend`](Self::extend) hook, then
/// the [`loader`](Self::loader). Later layers override earlier ones key by key.
pub struct TranslatorBuilder {
    default_locale: String,
    extend: Option<ExtendHook>,
    loader: Option<Arc<dyn Loader>>,
}

impl Default for TranslatorBuilder {
    fn default() -> Self {
        Self {
            default_locale: crate::DEFAULT_LOCALE.to_string(),
            extend: None,
            loader: None,
        }
    }
}

impl TranslatorBuilder {
    /// Locale used when a requested locale is not supported.
    #[must_use]
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Adds entries programmatically once the local files are in.
    #[must_use]
    pub fn extend<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&Catalog) -> Result<()> + 'static,
    {
        self.extend = Some(Box::new(hook));
        self
    }

    /// Remote source applied after local files and reused by
    /// [`Translator::refresh`].
    #[must_use]
    pub fn loader(self, loader: impl Loader + 'static) -> Self {
        self.shared_loader(Arc::new(loader))
    }

    /// Like [`loader`](Self::loader), for a loader that is already shared.
    #[must_use]
    pub fn shared_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Loads `source` and every configured layer. Any failure aborts the build.
    pub fn build(self, source: &dyn LocaleSource) -> Result<Translator> {
        let default_locale =
            LocaleTag::parse(&self.default_locale).context("parse default locale")?;
        let catalog = Arc::new(Catalog::new());

        load_locales(source, &catalog).context("load translations")?;

        if let Some(hook) = self.extend {
            hook(catalog.as_ref()).context("extend builder")?;
        }

        if let Some(loader) = &self.loader {
            loader.load(&catalog).context("load translations from external")?;
        }

        let translator = Translator {
            inner: Arc::new(Inner {
                catalog,
                default_locale,
                registry: LocaleRegistry::new(),
                loader: RwLock::new(self.loader),
            }),
        };
        info!(
            default_locale = %translator.default_locale(),
            locales = ?translator.supported_locales(),
            "translator initialized"
        );
        Ok(translator)
    }
}

struct Inner {
    catalog: Arc<Catalog>,
    default_locale: LocaleTag,
    registry: LocaleRegistry,
    loader: RwLock<Option<Arc<dyn Loader>>>,
}

/// Shared handle to a built catalog.
///
/// Cloning is cheap; clones see the same catalog, including entries applied by a
/// later [`refresh`](Self::refresh).
#[derive(Clone)]
pub struct Translator {
    inner: Arc<Inner>,
}

impl Translator {
    /// Starts a [`TranslatorBuilder`] with the `"en"` default locale.
    ///
    /// # Example
    ///
    /// ```rust
    /// use intl_catalog::{Arg, LocaleTag, MemorySource, Translator};
    ///
    /// let source = MemorySource::new()
    ///     .with_file("locales/en/active.json", r#"[{"key": "hi", "translation": "Hi %s"}]"#);
    /// let translator = Translator::builder()
    ///     .extend(|catalog| {
    ///         catalog.set_string(&LocaleTag::parse("en")?, "bye", "Bye %s");
    ///         Ok(())
    ///     })
    ///     .build(&source)
    ///     .unwrap();
    ///
    /// let en = LocaleTag::parse("en").unwrap();
    /// assert_eq!(translator.render(&en, "bye", &[Arg::from("Ann")]), "Bye Ann");
    /// ```
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::default()
    }

    /// Builds from `config`: files under `source_dir`, plus the remote source if
    /// one is configured.
    pub fn from_config(config: &I18nConfig) -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = Self::builder().default_locale(config.default_locale.clone());

        #[cfg(feature = "remote")]
        if let Some(remote) = &config.remote {
            let loader = crate::remote::HttpLoader::from_config(remote)
                .context("configure remote loader")?;
            builder = builder.loader(loader);
        }
        #[cfg(not(feature = "remote"))]
        if config.remote.is_some() {
            tracing::warn!("remote translations configured but the `remote` feature is disabled");
        }

        builder.build(&DirSource::new(&config.source_dir))
    }

    /// Locale substituted for unsupported ones.
    pub fn default_locale(&self) -> &LocaleTag {
        &self.inner.default_locale
    }

    /// The live catalog; entries set here are visible to every printer.
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Locales present in the catalog.
    pub fn supported_locales(&self) -> Vec<LocaleTag> {
        self.inner.registry.get(&self.inner.catalog).tags().to_vec()
    }

    /// True if `locale` or its base language has entries.
    pub fn is_supported(&self, locale: &LocaleTag) -> bool {
        self.inner.registry.get(&self.inner.catalog).contains(locale)
    }

    /// Drops the cached supported-locale set so the next query recomputes it.
    ///
    /// The cache already follows new locales on its own; this only forces a
    /// recompute.
    pub fn clear_locale_cache(&self) {
        self.inner.registry.clear();
    }

    /// The locale a request for `locale` is served in.
    pub fn resolve(&self, locale: &LocaleTag) -> LocaleTag {
        if self.is_supported(locale) {
            locale.clone()
        } else {
            debug!(%locale, default = %self.inner.default_locale, "unsupported locale, using default");
            self.inner.default_locale.clone()
        }
    }

    /// A [`Printer`] for the locale `locale` resolves to.
    pub fn printer(&self, locale: &LocaleTag) -> Printer {
        Printer::new(self.resolve(locale), Arc::clone(&self.inner.catalog))
    }

    /// Renders `key` for `locale` in one call.
    pub fn render(&self, locale: &LocaleTag, key: &str, args: &[Arg]) -> String {
        self.printer(locale).sprintf(key, args)
    }

    /// A [`LocaleContext`] for one unit of work; `None` means the default locale.
    pub fn context(&self, locale: Option<LocaleTag>) -> LocaleContext {
        LocaleContext::new(self.clone(), locale)
    }

    /// Replaces the loader used by [`refresh`](Self::refresh).
    pub fn set_loader(&self, loader: impl Loader + 'static) {
        *self.inner.loader.write() = Some(Arc::new(loader));
    }

    /// Re-runs the loader against the live catalog. A no-op without a loader.
    ///
    /// Readers keep being served during the refresh and see each locale either
    /// before or after its new entries are applied.
    pub fn refresh(&self) -> Result<()> {
        let Some(loader) = self.inner.loader.read().clone() else {
            return Ok(());
        };
        loader.load(&self.inner.catalog).context("refresh translations")?;
        info!("translations refreshed");
        Ok(())
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("default_locale", &self.inner.default_locale)
            .field("locales", &self.inner.catalog.languages())
            .field("has_loader", &self.inner.loader.read().is_some())
            .finish()
    }
}

/// Holds a [`Translator`] that is built at most once.
///
/// ```rust
/// use intl_catalog::{I18n, MemorySource, Translator};
///
/// static I18N: I18n = I18n::new();
///
/// let source = MemorySource::new().with_file("locales/en/active.json", "[]");
/// I18N.init_with(|| Translator::builder().build(&source)).unwrap();
/// // Already initialized: the closure is not called again.
/// I18N.init_with(|| unreachable!()).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct I18n {
    translator: OnceCell<Translator>,
}

impl I18n {
    /// An empty holder, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            translator: OnceCell::new(),
        }
    }

    /// Builds from `config` unless already initialized.
    pub fn init(&self, config: &I18nConfig) -> Result<&Translator> {
        self.init_with(|| Translator::from_config(config))
    }

    /// Runs `build` unless already initialized. A failed build leaves the
    /// holder empty, so a later call may try again.
    pub fn init_with<F>(&self, build: F) -> Result<&Translator>
    where
        F: FnOnce() -> Result<Translator>,
    {
        self.translator.get_or_try_init(build)
    }

    /// The translator, or [`I18nError::MissingCatalog`] before initialization.
    pub fn get(&self) -> Result<&Translator> {
        self.translator.get().ok_or(I18nError::MissingCatalog)
    }

    /// Like [`Translator::render`]; before initialization the key renders as
    /// itself.
    pub fn render(&self, locale: &LocaleTag, key: &str, args: &[Arg]) -> String {
        match self.translator.get() {
            Some(translator) => translator.render(locale, key, args),
            None => Printer::detached(locale.clone()).sprintf(key, args),
        }
    }

    /// Refreshes the translator, if there is one.
    pub fn refresh(&self) -> Result<()> {
        match self.translator.get() {
            Some(translator) => translator.refresh(),
            None => Ok(()),
        }
    }
}
