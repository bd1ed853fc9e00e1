//! Remote overrides fetched over HTTP.
//!
//! For every locale the catalog already knows, [`HttpLoader`] issues
//! `GET {base_url}/{locale}` and expects `200 OK` with a JSON array of records in
//! the same shape as `active.json`. The first failing locale aborts the pass;
//! locales processed before it keep their new entries.

use std::io::Read;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONNECTION, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info};
use url::Url;

use crate::RemoteConfig;
use crate::catalog::Catalog;
use crate::error::{I18nError, Result, ResultExt};
use crate::loader::Loader;
use crate::locale::LocaleTag;
use crate::record::{MessageRecord, parse_records};

/// Fetches per-locale records from `{base_url}/{locale}`.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    base_url: Url,
    headers: HeaderMap,
    client: Client,
    max_header_bytes: usize,
    max_body_bytes: u64,
}

impl HttpLoader {
    /// Builds a loader with the default client settings of [`RemoteConfig`].
    pub fn new(base_url: &str, headers: HeaderMap) -> Result<Self> {
        let config = RemoteConfig {
            base_url: base_url.to_string(),
            ..RemoteConfig::default()
        };
        let client = build_client(&config)?;
        Self::with_client(base_url, headers, client)
    }

    /// Builds a loader from configuration, including its header map.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| I18nError::Config(format!("invalid header name '{name}': {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| I18nError::Config(format!("invalid header value: {err}")))?;
            headers.insert(name, value);
        }

        let mut loader = Self::with_client(&config.base_url, headers, build_client(config)?)?;
        loader.max_header_bytes = config.max_header_bytes;
        loader.max_body_bytes = config.max_body_bytes;
        Ok(loader)
    }

    /// Uses a caller-provided client; timeouts are then the caller's business.
    pub fn with_client(base_url: &str, headers: HeaderMap, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|err| I18nError::Url(err.to_string()))?;
        let defaults = RemoteConfig::default();
        Ok(Self {
            base_url,
            headers,
            client,
            max_header_bytes: defaults.max_header_bytes,
            max_body_bytes: defaults.max_body_bytes,
        })
    }

    /// `{base_url}/{locale}`, keeping any path the base URL already has.
    pub fn locale_url(&self, locale: &LocaleTag) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| I18nError::Url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push(&locale.to_string());
        Ok(url)
    }

    /// Fetches and decodes the records for one locale.
    pub fn fetch(&self, locale: &LocaleTag) -> Result<Vec<MessageRecord>> {
        let url = self.locale_url(locale).context("join url path")?;

        let response = self
            .client
            .get(url.as_str())
            .header(CONNECTION, "close")
            .headers(self.headers.clone())
            .send()
            .map_err(|err| I18nError::Network(err.to_string()))
            .context("do request")?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(I18nError::InvalidResponseStatus(status.as_u16()));
        }

        let header_bytes: usize = response
            .headers()
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len() + 4)
            .sum();
        if header_bytes > self.max_header_bytes {
            return Err(I18nError::Network(format!(
                "response headers exceed {} bytes",
                self.max_header_bytes
            )));
        }

        let mut body = Vec::new();
        response
            .take(self.max_body_bytes + 1)
            .read_to_end(&mut body)
            .map_err(|err| I18nError::Network(err.to_string()))
            .context("read response body")?;
        if body.len() as u64 > self.max_body_bytes {
            return Err(I18nError::Network(format!(
                "response body exceeds {} bytes",
                self.max_body_bytes
            )));
        }

        debug!(%locale, %url, bytes = body.len(), "fetched remote translations");
        parse_records(&body).context("load translation")
    }
}

impl Loader for HttpLoader {
    fn load(&self, catalog: &Catalog) -> Result<()> {
        for locale in catalog.languages() {
            let records = self
                .fetch(&locale)
                .with_context(|| format!("load translation for {locale}"))?;
            catalog.merge(&locale, &records);
        }
        info!(base_url = %self.base_url, "remote translations applied");
        Ok(())
    }
}

fn build_client(config: &RemoteConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .timeout(Duration::from_millis(config.timeout_ms))
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|err| I18nError::Network(err.to_string()))
}
