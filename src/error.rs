use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::format::Arg;
use crate::printer::Printer;

/// Errors raised while building or refreshing a catalog.
///
/// Rendering never fails: unknown keys and unsupported locales degrade to
/// best-effort output instead.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Malformed record shape or plural rule.
    #[error("parse error: {0}")]
    Parse(String),

    /// Malformed JSON in a locale file or remote payload.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid locale tag '{tag}': {reason}")]
    InvalidLocaleTag { tag: String, reason: String },

    /// The remote source answered with something other than `200 OK`.
    #[error("invalid response status code: got status {0}")]
    InvalidResponseStatus(u16),

    #[error("network error: {0}")]
    Network(String),

    /// A configuration value that cannot be used, e.g. a malformed header.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid url: {0}")]
    Url(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("translation catalog is not initialized")]
    MissingCatalog,

    /// Another error annotated with the locale, file or stage it came from.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<I18nError>,
    },
}

impl I18nError {
    /// The innermost error, with every [`I18nError::Context`] layer peeled off.
    pub fn root(&self) -> &I18nError {
        let mut current = self;
        while let I18nError::Context { source, .. } = current {
            current = source;
        }
        current
    }
}

pub type Result<T, E = I18nError> = std::result::Result<T, E>;

/// Attaches context to loader-path errors.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: Into<I18nError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|err| I18nError::Context {
            context: context.into(),
            source: Box::new(err.into()),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|err| I18nError::Context {
            context: f().into(),
            source: Box::new(err.into()),
        })
    }
}

// ---------- Translatable errors ----------

/// Something that knows how to render itself through a [`Printer`].
pub trait Translatable {
    /// Renders `self` in the printer's locale.
    fn translate(&self, printer: &Printer) -> String;
}

/// An error value carrying a message key plus parameters.
///
/// `Display` shows the raw key; [`Translatable::translate`] renders it through the
/// catalog. String parameters are translated too, so a key can be passed as a
/// parameter of another key.
///
/// ```rust
/// use intl_catalog::TranslatableError;
///
/// let err = TranslatableError::new("Should be shorter than %d symbols").with_params([12]);
/// assert_eq!(err.to_string(), "Should be shorter than %d symbols");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{key}")]
pub struct TranslatableError {
    key: String,
    params: Vec<Arg>,
}

impl TranslatableError {
    /// An error rendering `key` with no parameters.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: Vec::new(),
        }
    }

    /// Returns a copy with `params` replacing any previous parameters.
    #[must_use]
    pub fn with_params<I, A>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        Self {
            key: self.key.clone(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn params(&self) -> &[Arg] {
        &self.params
    }
}

impl Translatable for TranslatableError {
    fn translate(&self, printer: &Printer) -> String {
        let params: Vec<Arg> = self
            .params
            .iter()
            .map(|param| match param {
                Arg::Str(text) => Arg::Str(printer.sprintf(text, &[])),
                other => other.clone(),
            })
            .collect();
        printer.sprintf(&self.key, &params)
    }
}

/// An error type that renders itself; see [`AnyTranslatable`].
pub trait TranslatableSource: StdError + Translatable + Send + Sync + 'static {}

impl<T: StdError + Translatable + Send + Sync + 'static> TranslatableSource for T {}

/// Type-erased translatable error, for use as the `#[source]` of another error.
///
/// [`try_translate_error`] recognizes this wrapper, so any error type
/// implementing [`Translatable`] is found in a source chain once wrapped.
///
/// ```rust
/// use intl_catalog::{AnyTranslatable, Printer, Translatable};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("quota exceeded")]
/// struct QuotaExceeded;
///
/// impl Translatable for QuotaExceeded {
///     fn translate(&self, printer: &Printer) -> String {
///         printer.sprintf("quota exceeded", &[])
///     }
/// }
///
/// let err = AnyTranslatable::new(QuotaExceeded);
/// assert_eq!(err.to_string(), "quota exceeded");
/// ```
pub struct AnyTranslatable(Box<dyn TranslatableSource>);

impl AnyTranslatable {
    pub fn new(err: impl TranslatableSource) -> Self {
        Self(Box::new(err))
    }
}

impl fmt::Debug for AnyTranslatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for AnyTranslatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl StdError for AnyTranslatable {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl Translatable for AnyTranslatable {
    fn translate(&self, printer: &Printer) -> String {
        self.0.translate(printer)
    }
}

/// Walks the source chain of `err` and renders the first translatable error.
///
/// A link is translatable if it is a [`TranslatableError`] or an
/// [`AnyTranslatable`]. Returns `None` when nothing in the chain is.
pub fn try_translate_error(err: &(dyn StdError + 'static), printer: &Printer) -> Option<String> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(translatable) = err.downcast_ref::<TranslatableError>() {
            return Some(translatable.translate(printer));
        }
        if let Some(translatable) = err.downcast_ref::<AnyTranslatable>() {
            return Some(translatable.translate(printer));
        }
        current = err.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_unwraps_context_layers() {
        let err: Result<()> = Err(I18nError::InvalidResponseStatus(404));
        let err = err
            .context("load translation for en")
            .context("refresh translations")
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "refresh translations: load translation for en: invalid response status code: got status 404"
        );
        assert!(matches!(err.root(), I18nError::InvalidResponseStatus(404)));
    }

    #[test]
    fn with_params_keeps_original() {
        let base = TranslatableError::new("test");
        let with = base.with_params(["book"]);
        assert!(base.params().is_empty());
        assert_eq!(with.params(), &[Arg::from("book")]);
        assert_eq!(with.key(), "test");
    }
}
