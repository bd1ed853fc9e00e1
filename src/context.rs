use once_cell::sync::OnceCell;

use crate::error::Translatable;
use crate::format::Arg;
use crate::locale::LocaleTag;
use crate::printer::Printer;
use crate::translator::Translator;

/// The locale of one unit of work, e.g. an inbound request.
///
/// Carries an optional tag; without one the translator's default locale applies.
/// The [`Printer`] is derived on first use and cached for the lifetime of the
/// context.
#[derive(Debug, Clone)]
pub struct LocaleContext {
    translator: Translator,
    locale: Option<LocaleTag>,
    printer: OnceCell<Printer>,
}

impl LocaleContext {
    /// Binds `locale` (or the default locale, if `None`) to `translator`.
    pub fn new(translator: Translator, locale: Option<LocaleTag>) -> Self {
        Self {
            translator,
            locale,
            printer: OnceCell::new(),
        }
    }

    /// A context for `locale`, replacing whatever this one carried.
    #[must_use]
    pub fn with_locale(&self, locale: LocaleTag) -> Self {
        Self::new(self.translator.clone(), Some(locale))
    }

    /// The requested locale, or the default when none was attached.
    pub fn locale(&self) -> &LocaleTag {
        self.locale.as_ref().unwrap_or_else(|| self.translator.default_locale())
    }

    /// The printer for this context, derived on first call.
    pub fn printer(&self) -> &Printer {
        self.printer.get_or_init(|| self.translator.printer(self.locale()))
    }

    /// Shorthand for `self.printer().sprintf(key, args)`.
    pub fn sprintf(&self, key: &str, args: &[Arg]) -> String {
        self.printer().sprintf(key, args)
    }

    /// Renders a [`Translatable`] value, typically an error, in this locale.
    pub fn translate(&self, value: &dyn Translatable) -> String {
        value.translate(self.printer())
    }
}
