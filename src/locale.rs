use std::fmt;
use std::str::FromStr;

use unic_langid::LanguageIdentifier;

use crate::error::I18nError;

/// A normalized language identifier such as `ru`, `en-US` or `pt-BR`.
///
/// Tags are the partition key of the [`Catalog`](crate::Catalog). Parsing accepts
/// both `-` and `_` separators, so directory names like `ru_RU` work too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleTag(LanguageIdentifier);

impl LocaleTag {
    /// Parses a tag, failing with [`I18nError::InvalidLocaleTag`].
    pub fn parse(tag: &str) -> Result<Self, I18nError> {
        tag.parse::<LanguageIdentifier>()
            .map(Self)
            .map_err(|err| I18nError::InvalidLocaleTag {
                tag: tag.to_string(),
                reason: err.to_string(),
            })
    }

    /// The language-only projection, e.g. `ru-RU` -> `ru`.
    pub fn base(&self) -> LocaleTag {
        Self(LanguageIdentifier::from_parts(self.0.language, None, None, &[]))
    }

    /// Returns true if the tag carries nothing but a language subtag.
    pub fn is_base(&self) -> bool {
        self.0.script.is_none() && self.0.region.is_none() && self.0.variants().next().is_none()
    }

    /// Tags to try, most specific first, when looking up a message.
    pub fn fallback_chain(&self) -> Vec<LocaleTag> {
        let mut chain = vec![self.clone()];
        if self.0.script.is_some() && (self.0.region.is_some() || self.0.variants().next().is_some()) {
            chain.push(Self(LanguageIdentifier::from_parts(
                self.0.language,
                self.0.script,
                None,
                &[],
            )));
        }
        if !self.is_base() {
            chain.push(self.base());
        }
        chain
    }

    /// The primary language subtag as a string.
    pub fn language(&self) -> &str {
        self.0.language.as_str()
    }

    pub fn as_langid(&self) -> &LanguageIdentifier {
        &self.0
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LocaleTag {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<LanguageIdentifier> for LocaleTag {
    fn from(id: LanguageIdentifier) -> Self {
        Self(id)
    }
}
