//! Where the submissions of a form go.
//!
//! Stored alongside the schema as `destination`, e.g.
//! `{"type": "web", "url": "...", "contentType": "application/json"}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum DestinationError {
    #[error("destination type of \"{0}\" is not implemented")]
    UnsupportedType(String),
    #[error("invalid {kind} destination: {source}")]
    Invalid {
        kind: DestinationType,
        source: serde_json::Error,
    },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum DestinationType {
    Default,
    Db,
    Web,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Destination {
    /// Keep the submission on the Grand Forms server.
    #[default]
    Default,
    /// Hand the submission to the aggregation service, which writes it to a database table.
    Db(DbDestination),
    /// Re-encode the submission and POST it to a web endpoint.
    Web(WebDestination),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbDestination {
    pub url: String,
    pub table: String,
}

impl Default for DbDestination {
    fn default() -> Self {
        Self {
            url: "jdbc:mysql://localhost/grandforms?characterEncoding=utf8&user=root".to_string(),
            table: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebDestination {
    pub url: String,
    /// Kept as written; checked against [`ContentType`] when a submission is forwarded.
    pub content_type: String,
}

impl Default for WebDestination {
    fn default() -> Self {
        Self {
            url: "http://192.168.1.90/api/submit".to_string(),
            content_type: ContentType::Json.to_string(),
        }
    }
}

/// Encodings a `web` destination can receive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
pub enum ContentType {
    #[strum(serialize = "application/json")]
    Json,
    #[strum(serialize = "application/x-www-form-urlencoded")]
    FormUrlEncoded,
    #[strum(serialize = "multipart/form-data")]
    Multipart,
}

impl WebDestination {
    pub fn content_type(&self) -> Result<ContentType, strum::ParseError> {
        ContentType::from_str(&self.content_type)
    }
}

impl Destination {
    pub fn destination_type(&self) -> DestinationType {
        match self {
            Destination::Default => DestinationType::Default,
            Destination::Db(_) => DestinationType::Db,
            Destination::Web(_) => DestinationType::Web,
        }
    }

    /// The destination the form builder starts from when the user picks `kind`.
    pub fn with_defaults(kind: DestinationType) -> Self {
        match kind {
            DestinationType::Default => Destination::Default,
            DestinationType::Db => Destination::Db(DbDestination::default()),
            DestinationType::Web => Destination::Web(WebDestination::default()),
        }
    }

    /// Decodes a stored `destination` value.
    ///
    /// An absent destination, `null`, or an object without `type` is the
    /// default destination. The type tag is checked before the remaining
    /// fields, so an unknown type is reported as such even when the other
    /// fields would not decode either.
    pub fn from_value(value: Option<&Value>) -> Result<Self, DestinationError> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(Destination::Default);
        };
        let kind = match value.get("type") {
            None | Some(Value::Null) => return Ok(Destination::Default),
            Some(Value::String(tag)) => DestinationType::from_str(tag)
                .map_err(|_| DestinationError::UnsupportedType(tag.clone()))?,
            Some(other) => return Err(DestinationError::UnsupportedType(other.to_string())),
        };
        serde_json::from_value(value.clone()).map_err(|source| DestinationError::Invalid { kind, source })
    }
}
