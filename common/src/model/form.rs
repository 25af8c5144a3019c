use crate::model::destination::{Destination, DestinationError};
use crate::model::field::{FieldSchema, FieldUiSchema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The top-level JSON Schema of a form: an object whose properties are the
/// fields, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: IndexMap<String, FieldSchema>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn object_type() -> String {
    "object".to_string()
}

impl Default for FormSchema {
    fn default() -> Self {
        Self {
            title: None,
            schema_type: object_type(),
            properties: IndexMap::new(),
            extra: Map::new(),
        }
    }
}

/// UI hints of a whole form, keyed by field name, in the order written.
pub type UiSchema = IndexMap<String, FieldUiSchema>;

/// Everything persisted for one form under `forms/<id>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub schema: FormSchema,
    #[serde(rename = "uiSchema", default)]
    pub ui_schema: UiSchema,
    /// Kept as stored. A record whose destination does not decode can still
    /// be opened and saved; see [`FormRecord::destination`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Value>,
}

impl FormRecord {
    /// Decodes the stored destination the way the submission router does.
    pub fn destination(&self) -> Result<Destination, DestinationError> {
        Destination::from_value(self.destination.as_ref())
    }
}

/// One entry of `GET /api/forms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    pub id: String,
    pub title: Option<String>,
}

/// Body of `GET /api/forms/{id}/resp`: the form schema and the stored
/// submissions, each carrying `meta.time` in unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponses {
    pub schema: Value,
    pub items: Vec<Value>,
}
