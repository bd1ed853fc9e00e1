//! The per-locale message catalog and the cached set of supported locales.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::locale::LocaleTag;
use crate::plural::CompiledPlural;
use crate::record::{MessageBody, MessageRecord};

/// A compiled catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Plural(CompiledPlural),
}

impl Message {
    /// Compiles a record body. Records without any text yield `None`.
    pub fn compile(body: &MessageBody) -> Option<Self> {
        match body {
            MessageBody::Plural(rule) => Some(Message::Plural(rule.compile())),
            MessageBody::Text(text) if !text.is_empty() => Some(Message::Text(text.clone())),
            MessageBody::Text(_) => None,
        }
    }
}

type Partition = HashMap<String, Arc<Message>>;

/// Messages partitioned by locale.
///
/// Entries are only ever added or replaced. Writers hold the lock for a whole
/// batch, so readers see either all of a [`Catalog::merge`] or none of it.
#[derive(Debug, Default)]
pub struct Catalog {
    partitions: RwLock<HashMap<LocaleTag, Partition>>,
    /// Bumped whenever a locale appears for the first time.
    generation: AtomicU64,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the message for `(locale, key)`.
    pub fn set(&self, locale: &LocaleTag, key: impl Into<String>, message: Message) {
        let mut partitions = self.partitions.write();
        let partition = self.partition_mut(&mut partitions, locale);
        partition.insert(key.into(), Arc::new(message));
    }

    /// Shorthand for installing a literal template.
    pub fn set_string(&self, locale: &LocaleTag, key: impl Into<String>, text: impl Into<String>) {
        self.set(locale, key, Message::Text(text.into()));
    }

    /// Compiles `records` and installs them under a single write lock.
    ///
    /// Returns the number of installed entries; records without text are skipped.
    pub fn merge(&self, locale: &LocaleTag, records: &[MessageRecord]) -> usize {
        let compiled: Vec<(String, Message)> = records
            .iter()
            .filter_map(|record| match Message::compile(&record.body) {
                Some(message) => Some((record.key.clone(), message)),
                None => {
                    trace!(%locale, key = %record.key, "skipping record without translation");
                    None
                }
            })
            .collect();

        let installed = compiled.len();
        let mut partitions = self.partitions.write();
        let partition = self.partition_mut(&mut partitions, locale);
        for (key, message) in compiled {
            partition.insert(key, Arc::new(message));
        }
        debug!(%locale, installed, "merged messages into catalog");
        installed
    }

    fn partition_mut<'a>(
        &self,
        partitions: &'a mut HashMap<LocaleTag, Partition>,
        locale: &LocaleTag,
    ) -> &'a mut Partition {
        if !partitions.contains_key(locale) {
            self.generation.fetch_add(1, Ordering::Release);
        }
        partitions.entry(locale.clone()).or_default()
    }

    /// Distinct locales present, sorted by tag.
    pub fn languages(&self) -> Vec<LocaleTag> {
        let mut languages: Vec<LocaleTag> = self.partitions.read().keys().cloned().collect();
        languages.sort_by_key(ToString::to_string);
        languages
    }

    /// True if `locale` itself has a partition; base languages are not consulted.
    pub fn has_locale(&self, locale: &LocaleTag) -> bool {
        self.partitions.read().contains_key(locale)
    }

    /// Finds `key` for `locale`, walking up to less specific tags (`pt-BR` -> `pt`).
    pub fn lookup(&self, locale: &LocaleTag, key: &str) -> Option<Arc<Message>> {
        let partitions = self.partitions.read();
        locale
            .fallback_chain()
            .iter()
            .find_map(|tag| partitions.get(tag).and_then(|p| p.get(key)).cloned())
    }

    /// Number of messages stored for exactly `locale`.
    pub fn len(&self, locale: &LocaleTag) -> usize {
        self.partitions.read().get(locale).map_or(0, HashMap::len)
    }

    /// True if no locale holds any message.
    pub fn is_empty(&self) -> bool {
        self.partitions.read().values().all(HashMap::is_empty)
    }

    /// Changes whenever the set of locales changes.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

// ---------- Supported locales ----------

/// Locales present in a catalog plus their base-language projections.
#[derive(Debug, Clone, Default)]
pub struct SupportedLocales {
    tags: Vec<LocaleTag>,
    accepted: HashSet<LocaleTag>,
}

impl SupportedLocales {
    /// Snapshots the locales of `catalog`.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let tags = catalog.languages();
        let accepted = tags.iter().flat_map(|tag| [tag.clone(), tag.base()]).collect();
        Self { tags, accepted }
    }

    /// True if the tag itself or its base language is registered.
    pub fn contains(&self, locale: &LocaleTag) -> bool {
        self.accepted.contains(locale) || self.accepted.contains(&locale.base())
    }

    /// The locales as registered, without base projections.
    pub fn tags(&self) -> &[LocaleTag] {
        &self.tags
    }
}

/// Lazily computed [`SupportedLocales`], recomputed once the catalog gains a
/// locale.
#[derive(Debug, Default)]
pub struct LocaleRegistry {
    cached: RwLock<Option<(u64, Arc<SupportedLocales>)>>,
}

impl LocaleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached set, recomputed first if the catalog gained a locale since.
    pub fn get(&self, catalog: &Catalog) -> Arc<SupportedLocales> {
        let generation = catalog.generation();
        if let Some((seen, locales)) = self.cached.read().as_ref() {
            if *seen == generation {
                return Arc::clone(locales);
            }
        }

        let locales = Arc::new(SupportedLocales::from_catalog(catalog));
        debug!(generation, locales = ?locales.tags(), "computed supported locales");
        *self.cached.write() = Some((generation, Arc::clone(&locales)));
        locales
    }

    /// Drops the cached set; the next [`LocaleRegistry::get`] recomputes it.
    pub fn clear(&self) {
        *self.cached.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tag(s: &str) -> LocaleTag {
        LocaleTag::parse(s).unwrap()
    }

    #[test]
    fn set_overwrites() {
        let catalog = Catalog::new();
        catalog.set_string(&tag("ru"), "test", "Тест %s");
        catalog.set_string(&tag("ru"), "test", "Тост %s");
        assert_eq!(
            catalog.lookup(&tag("ru"), "test").as_deref(),
            Some(&Message::Text("Тост %s".to_string()))
        );
        assert_eq!(catalog.len(&tag("ru")), 1);
    }

    #[test]
    fn lookup_falls_back_to_base() {
        let catalog = Catalog::new();
        catalog.set_string(&tag("pt"), "hello", "Olá");
        assert!(catalog.lookup(&tag("pt-BR"), "hello").is_some());
        assert!(catalog.lookup(&tag("pt-BR"), "bye").is_none());
        assert!(catalog.lookup(&tag("en"), "hello").is_none());
    }

    #[test]
    fn languages_are_distinct_and_sorted() {
        let catalog = Catalog::new();
        catalog.set_string(&tag("ru"), "a", "a");
        catalog.set_string(&tag("en"), "a", "a");
        catalog.set_string(&tag("ru"), "b", "b");
        assert_eq!(catalog.languages(), vec![tag("en"), tag("ru")]);
    }

    #[test]
    fn generation_tracks_new_locales_only() {
        let catalog = Catalog::new();
        catalog.set_string(&tag("ru"), "a", "a");
        let first = catalog.generation();
        catalog.set_string(&tag("ru"), "b", "b");
        assert_eq!(catalog.generation(), first);
        catalog.set_string(&tag("en"), "a", "a");
        assert_ne!(catalog.generation(), first);
    }

    #[test]
    fn registry_includes_base_languages_and_refreshes() {
        let catalog = Catalog::new();
        catalog.set_string(&tag("en-US"), "a", "a");
        let registry = LocaleRegistry::new();

        let supported = registry.get(&catalog);
        assert!(supported.contains(&tag("en-US")));
        assert!(supported.contains(&tag("en")));
        assert!(supported.contains(&tag("en-GB")));
        assert!(!supported.contains(&tag("ru")));

        catalog.set_string(&tag("ru"), "a", "a");
        assert!(registry.get(&catalog).contains(&tag("ru")));
    }

    #[test]
    fn clear_forces_recompute() {
        let catalog = Catalog::new();
        catalog.set_string(&tag("en"), "a", "a");
        let registry = LocaleRegistry::new();

        let first = registry.get(&catalog);
        assert!(Arc::ptr_eq(&first, &registry.get(&catalog)));

        registry.clear();
        let second = registry.get(&catalog);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.tags(), first.tags());
    }

    #[test]
    fn merge_skips_empty_records() {
        let catalog = Catalog::new();
        let records = crate::record::parse_records(
            br#"[{"key": "a", "translation": "A"}, {"key": "b"}]"#,
        )
        .unwrap();
        assert_eq!(catalog.merge(&tag("en"), &records), 1);
        assert!(catalog.lookup(&tag("en"), "b").is_none());
    }
}
