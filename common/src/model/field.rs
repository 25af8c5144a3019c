use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the custom input the renderer uses for vehicle license plates.
pub const VEHICLE_ID_WIDGET: &str = "VehicleIdWidget";

pub const FORMAT_DATA_URL: &str = "data-url";
pub const FORMAT_DATE: &str = "date";
pub const FORMAT_DATETIME: &str = "datetime";
pub const FORMAT_EMAIL: &str = "email";

/// The JSON Schema `type` of a single form field.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
}

/// JSON Schema attributes of one field, as stored under `schema.properties.<name>`.
///
/// Keys the editor does not know about are kept in `extra` so that a record
/// loaded from disk is written back without losing anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type", default)]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `ui:options` hints of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiOptions {
    /// MIME prefix filter for file-like inputs, e.g. `image/*`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UiOptions {
    pub fn is_empty(&self) -> bool {
        self.accept.is_none() && self.extra.is_empty()
    }
}

/// Rendering hints for one field, stored under `uiSchema.<name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldUiSchema {
    #[serde(rename = "ui:widget", default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(rename = "ui:options", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<UiOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldUiSchema {
    pub fn accept(&self) -> Option<&str> {
        self.options.as_ref().and_then(|o| o.accept.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.widget.is_none()
            && self.options.as_ref().is_none_or(UiOptions::is_empty)
            && self.extra.is_empty()
    }
}

/// One question of a form.
///
/// `deleted` never leaves the editor: a soft-deleted field keeps its slot so
/// that the handles of its siblings stay valid, and it is simply skipped when
/// the schema is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: FieldSchema,
    pub deleted: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: FieldSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            deleted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_schema_keeps_unknown_keys() {
        let raw = json!({
            "type": "string",
            "title": "Name",
            "minLength": 3
        });
        let schema: FieldSchema = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(schema.data_type, DataType::String);
        assert_eq!(schema.extra.get("minLength"), Some(&json!(3)));
        assert_eq!(serde_json::to_value(&schema).unwrap(), raw);
    }

    #[test]
    fn ui_schema_uses_renderer_keys() {
        let ui = FieldUiSchema {
            widget: Some(VEHICLE_ID_WIDGET.to_string()),
            options: Some(UiOptions {
                accept: Some("image/*".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&ui).unwrap(),
            json!({"ui:widget": "VehicleIdWidget", "ui:options": {"accept": "image/*"}})
        );
    }

    #[test]
    fn empty_options_count_as_empty_ui_schema() {
        let ui = FieldUiSchema {
            options: Some(UiOptions::default()),
            ..Default::default()
        };
        assert!(ui.is_empty());
        assert!(FieldUiSchema::default().is_empty());
    }
}
