//! Loading locale directories into a [`Catalog`].
//!
//! A source exposes `locales/<tag>/active.json` for every locale, each file a JSON
//! array of records.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{Result, ResultExt};
use crate::locale::LocaleTag;
use crate::record::parse_records;

pub const LOCALES_DIR: &str = "locales";
pub const ACTIVE_FILE: &str = "active.json";

/// A directory entry reported by a [`LocaleSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// A read-only tree of files addressed by `/`-separated relative paths.
pub trait LocaleSource {
    /// Lists the entries directly under `path`.
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>>;

    /// Reads the whole file at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Extra catalog entries from somewhere other than the locale source.
///
/// Implementations run after the local files are loaded and again on every
/// refresh. They may only touch locales the catalog already has.
pub trait Loader: Send + Sync {
    /// Applies this loader's entries to `catalog`.
    fn load(&self, catalog: &Catalog) -> Result<()>;
}

/// A [`LocaleSource`] rooted at a filesystem directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// A source whose `locales/` folder lives under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl LocaleSource for DirSource {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }
}

/// An in-memory [`LocaleSource`]; directories are implied by file paths.
///
/// ```rust
/// use intl_catalog::MemorySource;
///
/// let source = MemorySource::new()
///     .with_file("locales/en/active.json", r#"[{"key": "hi", "translation": "Hello"}]"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file; builder style.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into().trim_matches('/').to_string(), data.into());
    }
}

impl LocaleSource for MemorySource {
    fn read_dir(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let prefix = format!("{}/", path.trim_matches('/'));
        let mut entries: BTreeMap<String, bool> = BTreeMap::new();
        for file in self.files.keys() {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    entries.insert(dir.to_string(), true);
                }
                None => {
                    entries.entry(rest.to_string()).or_insert(false);
                }
            }
        }
        if entries.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{path} folder not found"),
            ));
        }
        Ok(entries.into_iter().map(|(name, is_dir)| DirEntry { name, is_dir }).collect())
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files.get(path.trim_matches('/')).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{path} not found"))
        })
    }
}

/// Loads every `locales/<tag>/active.json` of `source` into `catalog`.
///
/// Non-directory entries under `locales/` are ignored. The first bad directory
/// name, missing file or malformed record aborts the load.
pub fn load_locales(source: &dyn LocaleSource, catalog: &Catalog) -> Result<()> {
    let entries = source.read_dir(LOCALES_DIR).context("read locales dir")?;

    for entry in entries.iter().filter(|e| e.is_dir) {
        let locale = LocaleTag::parse(&entry.name)
            .with_context(|| format!("parse language {}", entry.name))?;

        let file_path = format!("{LOCALES_DIR}/{}/{ACTIVE_FILE}", entry.name);

        let data = source.read(&file_path).with_context(|| format!("open file {file_path}"))?;
        let installed = load_records(&data, &locale, catalog)
            .with_context(|| format!("load translations from {file_path}"))?;
        debug!(%locale, file = %file_path, installed, "loaded locale file");
    }

    info!(locales = ?catalog.languages(), "local translations loaded");
    Ok(())
}

/// Decodes a JSON array of records and merges it into `catalog` under `locale`.
pub fn load_records(data: &[u8], locale: &LocaleTag, catalog: &Catalog) -> Result<usize> {
    let records = parse_records(data).context("decode translation")?;
    Ok(catalog.merge(locale, &records))
}
