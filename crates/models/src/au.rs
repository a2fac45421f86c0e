use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

/// Identifier of a stored AU.
///
/// The file backend hands out epoch-millisecond integers, the document backend
/// hands out ObjectId hex strings. Both serialize as plain JSON scalars.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuId {
    Millis(i64),
    Object(String),
}

impl AuId {
    /// Compare against the raw `:id` path segment.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            AuId::Millis(n) => raw.parse::<i64>().map(|r| r == *n).unwrap_or(false),
            AuId::Object(s) => s == raw,
        }
    }
}

impl fmt::Display for AuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuId::Millis(n) => write!(f, "{n}"),
            AuId::Object(s) => f.write_str(s),
        }
    }
}

/// A persisted AU record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Au {
    pub id: AuId,
    pub name: String,
    pub author: String,
    pub desc: String,
    #[serde(default)]
    pub link: String,
    pub created: DateTime<Utc>,
}

/// Validated input for a store `create`: required fields are non-empty, `link` defaulted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAu {
    pub name: String,
    pub author: String,
    pub desc: String,
    pub link: String,
}

impl NewAu {
    pub fn into_au(self, id: AuId, created: DateTime<Utc>) -> Au {
        Au {
            id,
            name: self.name,
            author: self.author,
            desc: self.desc,
            link: self.link,
            created,
        }
    }
}

/// Raw client submission. Fields are kept as loose JSON values so that
/// missing, `null` and non-string values all reach `validate` instead of
/// failing deserialization.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AuDraft {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
    #[serde(default)]
    pub desc: Option<Value>,
    #[serde(default)]
    pub link: Option<Value>,
}

impl AuDraft {
    pub fn new(name: &str, author: &str, desc: &str) -> Self {
        Self {
            name: Some(Value::from(name)),
            author: Some(Value::from(author)),
            desc: Some(Value::from(desc)),
            link: None,
        }
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(Value::from(link));
        self
    }

    /// Check required fields and produce the store input.
    ///
    /// `name`, `author` and `desc` must be non-empty strings. `link` is never
    /// required; anything other than a string becomes `""`.
    pub fn validate(self) -> Result<NewAu, ModelError> {
        let name = required_text(self.name);
        let author = required_text(self.author);
        let desc = required_text(self.desc);

        let missing: Vec<&str> = [
            ("name", name.is_none()),
            ("author", author.is_none()),
            ("desc", desc.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        match (name, author, desc) {
            (Some(name), Some(author), Some(desc)) => Ok(NewAu {
                name,
                author,
                desc,
                link: optional_text(self.link),
            }),
            _ => Err(ModelError::Validation(format!(
                "missing required field: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn required_text(v: Option<Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn optional_text(v: Option<Value>) -> String {
    match v {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

/// Current time truncated to millisecond precision, which is what both
/// the JSON file and BSON datetimes can round-trip.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
