use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::I18nError;
use crate::plural::PluralRule;

/// One translation entry as it appears in `active.json` or a remote payload.
#[derive(Debug, Deserialize)]
struct RawRecord {
    key: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    plural: Option<BTreeMap<String, String>>,
}

/// A parsed translation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub key: String,
    /// Informational only.
    pub description: String,
    pub body: MessageBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// A literal template; empty when the record carries no translation.
    Text(String),
    Plural(PluralRule),
}

impl TryFrom<RawRecord> for MessageRecord {
    type Error = I18nError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let body = match raw.plural {
            // A plural body wins over `translation`.
            Some(entries) if !entries.is_empty() => {
                let rule = PluralRule::from_entries(entries).map_err(|err| match err {
                    I18nError::Parse(msg) => {
                        I18nError::Parse(format!("plural for '{}': {msg}", raw.key))
                    }
                    other => other,
                })?;
                MessageBody::Plural(rule)
            }
            _ => MessageBody::Text(raw.translation.unwrap_or_default()),
        };
        Ok(Self {
            key: raw.key,
            description: raw.description,
            body,
        })
    }
}

/// Parses one record object.
pub fn parse_record(json: &[u8]) -> Result<MessageRecord, I18nError> {
    let raw: RawRecord = serde_json::from_slice(json)?;
    raw.try_into()
}

/// Parses a JSON array of records.
pub fn parse_records(json: &[u8]) -> Result<Vec<MessageRecord>, I18nError> {
    let raw: Vec<RawRecord> = serde_json::from_slice(json)?;
    raw.into_iter().map(MessageRecord::try_from).collect()
}
