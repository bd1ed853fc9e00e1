#![doc = include_str!("../README.md")]

//! # intl-catalog
//!
//! Plural-aware translation catalogs:
//!
//! - **Directory Loading**: `locales/<tag>/active.json` per locale
//! - **Plurals**: CLDR categories plus exact (`=2`) and less-than (`<5`) selectors,
//!   exact matches always tried first
//! - **printf Templates**: `%s`, `%d`, `%v`, ... with locale-aware decimal and group separators
//! - **Fallback System**: regional variants use their base language, unsupported
//!   locales use the default one, unknown keys render as themselves
//! - **Remote Refresh**: per-locale overrides fetched over HTTP (`remote` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use intl_catalog::{tr, MemorySource, Translator};
//!
//! let source = MemorySource::new().with_file(
//!     "locales/ru/active.json",
//!     r#"[
//!         {"key": "test", "translation": "Тест %s"},
//!         {"key": "spiders", "plural": {"other": "всего %d пауков", "one": "паучок", "=0": "нет пауков"}}
//!     ]"#,
//! );
//! let translator = Translator::builder().default_locale("ru").build(&source).unwrap();
//!
//! let printer = translator.printer(&"ru-RU".parse().unwrap());
//! assert_eq!(tr!(printer, "test", "пива"), "Тест пива");
//! assert_eq!(tr!(printer, "spiders", 0), "нет пауков");
//! assert_eq!(tr!(printer, "spiders", 100), "всего 100 пауков");
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

mod catalog;
mod context;
mod error;
mod format;
mod loader;
mod locale;
mod plural;
mod printer;
mod record;
#[cfg(feature = "remote")]
mod remote;
mod translator;

pub use catalog::{Catalog, LocaleRegistry, Message, SupportedLocales};
pub use context::LocaleContext;
pub use error::{
    AnyTranslatable, I18nError, Result, ResultExt, Translatable, TranslatableError,
    TranslatableSource, try_translate_error,
};
pub use format::{Arg, NumberFormat, sprint, sprintf};
pub use loader::{
    ACTIVE_FILE, DirEntry, DirSource, LOCALES_DIR, LocaleSource, Loader, MemorySource,
    load_locales, load_records,
};
pub use locale::LocaleTag;
pub use plural::{Category, CompiledPlural, PluralClassifier, PluralRule, Selector, placeholders};
pub use printer::Printer;
pub use record::{MessageBody, MessageRecord, parse_record, parse_records};
#[cfg(feature = "remote")]
pub use remote::HttpLoader;
pub use translator::{I18n, Translator, TranslatorBuilder};

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// Configuration for building a [`Translator`] from disk.
///
/// # Example
///
/// ```rust
/// use intl_catalog::I18nConfig;
///
/// let config: I18nConfig = serde_json::from_str(r#"{
///     "source_dir": "assets",
///     "default_locale": "ru",
///     "remote": { "base_url": "https://translations.example.com/v1" }
/// }"#).unwrap();
/// assert_eq!(config.remote.unwrap().timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Directory containing the `locales/` folder.
    /// Default: "."
    pub source_dir: PathBuf,
    /// Locale substituted for unsupported ones.
    /// Default: "en"
    pub default_locale: String,
    /// Remote overrides; loaded at startup and on every refresh.
    pub remote: Option<RemoteConfig>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            default_locale: DEFAULT_LOCALE.to_string(),
            remote: None,
        }
    }
}

/// Where and how to fetch remote translations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Requests go to `{base_url}/{locale}`.
    pub base_url: String,
    /// Sent verbatim with every request.
    pub headers: BTreeMap<String, String>,
    /// TCP connect timeout.
    /// Default: 2000
    pub connect_timeout_ms: u64,
    /// Whole-request timeout.
    /// Default: 10000
    pub timeout_ms: u64,
    /// Largest accepted total size of the response headers.
    /// Default: 3 KiB
    pub max_header_bytes: usize,
    /// Largest accepted response body.
    /// Default: 4 MiB
    pub max_body_bytes: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            headers: BTreeMap::new(),
            connect_timeout_ms: 2_000,
            timeout_ms: 10_000,
            max_header_bytes: 3 * 1024,
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}
