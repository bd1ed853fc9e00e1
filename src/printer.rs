use std::fmt;
use std::sync::Arc;

use crate::catalog::{Catalog, Message};
use crate::format::{self, Arg, NumberFormat};
use crate::locale::LocaleTag;
use crate::plural::{CompiledPlural, PluralClassifier};

/// Renders messages for one resolved locale.
///
/// Obtained from [`Translator::printer`](crate::Translator::printer), which has
/// already replaced unsupported locales with the default one. Rendering never
/// fails: an unknown key is formatted as its own template.
#[derive(Clone)]
pub struct Printer {
    locale: LocaleTag,
    catalog: Arc<Catalog>,
    plurals: Arc<PluralClassifier>,
    numbers: NumberFormat,
}

impl Printer {
    pub(crate) fn new(locale: LocaleTag, catalog: Arc<Catalog>) -> Self {
        Self {
            plurals: Arc::new(PluralClassifier::for_locale(&locale)),
            numbers: NumberFormat::for_locale(&locale),
            locale,
            catalog,
        }
    }

    /// A printer over no catalog at all; every key renders as itself.
    pub(crate) fn detached(locale: LocaleTag) -> Self {
        Self::new(locale, Arc::new(Catalog::new()))
    }

    /// The locale this printer renders for.
    pub fn locale(&self) -> &LocaleTag {
        &self.locale
    }

    /// Renders `key` with `args`.
    pub fn sprintf(&self, key: &str, args: &[Arg]) -> String {
        match self.catalog.lookup(&self.locale, key).as_deref() {
            Some(Message::Text(template)) => format::sprintf(template, args, self.numbers),
            Some(Message::Plural(plural)) => self.plural(plural, args),
            None => format::sprintf(key, args, self.numbers),
        }
    }

    /// Formats a single value with the locale's number conventions.
    pub fn sprint(&self, arg: &Arg) -> String {
        format::sprint(arg, self.numbers)
    }

    fn plural(&self, plural: &CompiledPlural, args: &[Arg]) -> String {
        let template = match plural.operand(args) {
            Some(operand) => plural.select(&operand, self.plurals.category(&operand)),
            None => plural.other(),
        };
        if template.contains('%') {
            format::sprintf(template, args, self.numbers)
        } else {
            template.to_string()
        }
    }
}

impl fmt::Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("locale", &self.locale)
            .field("numbers", &self.numbers)
            .finish_non_exhaustive()
    }
}

/// Renders a key through a [`Printer`] with any mix of argument types.
///
/// ```rust
/// use intl_catalog::{tr, MemorySource, Translator};
///
/// let source = MemorySource::new()
///     .with_file("locales/en/active.json", r#"[{"key": "greet", "translation": "Hi %s, %d new"}]"#);
/// let translator = Translator::builder().default_locale("en").build(&source).unwrap();
/// let printer = translator.printer(&"en".parse().unwrap());
/// assert_eq!(tr!(printer, "greet", "Ann", 3), "Hi Ann, 3 new");
/// ```
#[macro_export]
macro_rules! tr {
    ($printer:expr, $key:expr $(, $arg:expr)* $(,)?) => {
        $printer.sprintf($key, &[$($crate::Arg::from($arg)),*])
    };
}
