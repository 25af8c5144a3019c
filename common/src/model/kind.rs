//! Mapping between the user-facing field kinds and the `(schema, uiSchema)`
//! pair understood by the JSON-Schema form renderer.
//!
//! The form builder only ever shows one of the [`FieldKind`] variants; the
//! renderer only ever sees `type`, `format`, `ui:widget` and
//! `ui:options.accept`. [`kind_of`] reads the kind back from those four
//! attributes and [`apply_kind`] writes exactly one consistent combination of
//! them, so `kind_of(apply_kind(k, ..)) == k` for every kind.

use crate::model::field::{
    DataType, FieldSchema, FieldUiSchema, UiOptions, FORMAT_DATA_URL, FORMAT_DATE,
    FORMAT_DATETIME, FORMAT_EMAIL, VEHICLE_ID_WIDGET,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    File,
    Image,
    Video,
    Date,
    Datetime,
    Email,
    LicensePlate,
}

impl FieldKind {
    /// The `format` written for this kind, if any.
    fn format(self) -> Option<&'static str> {
        match self {
            FieldKind::File | FieldKind::Image | FieldKind::Video => Some(FORMAT_DATA_URL),
            FieldKind::Date => Some(FORMAT_DATE),
            FieldKind::Datetime => Some(FORMAT_DATETIME),
            FieldKind::Email => Some(FORMAT_EMAIL),
            FieldKind::String
            | FieldKind::Number
            | FieldKind::Integer
            | FieldKind::Boolean
            | FieldKind::LicensePlate => None,
        }
    }

    fn data_type(self) -> DataType {
        match self {
            FieldKind::Number => DataType::Number,
            FieldKind::Integer => DataType::Integer,
            FieldKind::Boolean => DataType::Boolean,
            _ => DataType::String,
        }
    }
}

impl From<DataType> for FieldKind {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::String => FieldKind::String,
            DataType::Number => FieldKind::Number,
            DataType::Integer => FieldKind::Integer,
            DataType::Boolean => FieldKind::Boolean,
        }
    }
}

/// Reads the kind of a field from its schema and UI hints.
///
/// Total over every input: unknown formats and widgets fall back to the
/// plain data type.
pub fn kind_of(schema: &FieldSchema, ui: &FieldUiSchema) -> FieldKind {
    if schema.data_type == DataType::String
        && schema.format.is_none()
        && ui.widget.as_deref() == Some(VEHICLE_ID_WIDGET)
    {
        return FieldKind::LicensePlate;
    }

    match schema.format.as_deref() {
        Some(FORMAT_DATA_URL) => match ui.accept() {
            Some(accept) if accept.starts_with("image/") => FieldKind::Image,
            Some(accept) if accept.starts_with("video/") => FieldKind::Video,
            _ => FieldKind::File,
        },
        Some(FORMAT_DATE) => FieldKind::Date,
        Some(FORMAT_DATETIME) => FieldKind::Datetime,
        Some(FORMAT_EMAIL) => FieldKind::Email,
        _ => schema.data_type.into(),
    }
}

/// Returns the `(schema, uiSchema)` pair for `kind`, starting from the
/// previous pair. `title`, `default`, `enum` and unknown keys are kept.
pub fn apply_kind(
    kind: FieldKind,
    schema: &FieldSchema,
    ui: &FieldUiSchema,
) -> (FieldSchema, FieldUiSchema) {
    let mut schema = schema.clone();
    let mut ui = ui.clone();
    apply_kind_in_place(kind, &mut schema, &mut ui);
    (schema, ui)
}

pub(crate) fn apply_kind_in_place(kind: FieldKind, schema: &mut FieldSchema, ui: &mut FieldUiSchema) {
    schema.data_type = kind.data_type();
    // the renderer's validator rejects formats it does not recognize, so
    // license plates carry no format at all
    schema.format = kind.format().map(str::to_string);

    match kind {
        FieldKind::File => {
            ui.widget = None;
            if let Some(options) = ui.options.as_mut() {
                options.accept = None;
            }
            if ui.options.as_ref().is_some_and(UiOptions::is_empty) {
                ui.options = None;
            }
        }
        FieldKind::Image | FieldKind::Video => {
            ui.widget = None;
            ui.options.get_or_insert_with(UiOptions::default).accept = Some(format!("{kind}/*"));
        }
        FieldKind::LicensePlate => {
            ui.widget = Some(VEHICLE_ID_WIDGET.to_string());
        }
        FieldKind::Date
        | FieldKind::Datetime
        | FieldKind::Email
        | FieldKind::String
        | FieldKind::Number
        | FieldKind::Integer
        | FieldKind::Boolean => {
            ui.widget = None;
        }
    }
}

/// Parses the comma separated `enum` input of the field editor.
///
/// Blank input means "no enum constraint". Tokens that do not parse as the
/// requested numeric type become `0`; string tokens are trimmed and kept in
/// order, duplicates included.
pub fn coerce_enum_input(csv: &str, data_type: DataType) -> Option<Vec<Value>> {
    if csv.trim().is_empty() {
        return None;
    }

    let values = csv
        .split(',')
        .map(str::trim)
        .map(|token| match data_type {
            DataType::Number => parse_number(token),
            DataType::Integer => Value::from(parse_integer(token)),
            DataType::String | DataType::Boolean => Value::from(token),
        })
        .collect();
    Some(values)
}

/// Converts the raw `default` input of the field editor.
pub fn coerce_default_input(raw: &str, data_type: DataType) -> Value {
    match data_type {
        DataType::Boolean => Value::Bool(raw == "true"),
        _ => Value::from(raw),
    }
}

fn parse_number(token: &str) -> Value {
    let number = token.parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0);
    // whole numbers are written as integers, `1` rather than `1.0`
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}

/// Leading base-10 integer of `token`; `12px` reads as 12, `x` as 0.
fn parse_integer(token: &str) -> i64 {
    let (sign, digits) = match token.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, token.strip_prefix('+').unwrap_or(token)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn apply_to_empty(kind: FieldKind) -> (FieldSchema, FieldUiSchema) {
        apply_kind(kind, &FieldSchema::default(), &FieldUiSchema::default())
    }

    #[test]
    fn every_kind_round_trips() {
        for kind in FieldKind::iter() {
            let (schema, ui) = apply_to_empty(kind);
            assert_eq!(kind_of(&schema, &ui), kind, "kind {kind}");
        }
    }

    #[test]
    fn applying_a_kind_twice_changes_nothing() {
        for kind in FieldKind::iter() {
            let (schema, ui) = apply_to_empty(kind);
            assert_eq!(apply_kind(kind, &schema, &ui), (schema, ui), "kind {kind}");
        }
    }

    #[test]
    fn switching_between_any_two_kinds_lands_on_the_target() {
        for from in FieldKind::iter() {
            let (schema, ui) = apply_to_empty(from);
            for to in FieldKind::iter() {
                let (schema, ui) = apply_kind(to, &schema, &ui);
                assert_eq!(kind_of(&schema, &ui), to, "{from} -> {to}");
            }
        }
    }

    #[rstest]
    #[case::string(FieldKind::String, json!({"type": "string"}), json!({}))]
    #[case::number(FieldKind::Number, json!({"type": "number"}), json!({}))]
    #[case::integer(FieldKind::Integer, json!({"type": "integer"}), json!({}))]
    #[case::boolean(FieldKind::Boolean, json!({"type": "boolean"}), json!({}))]
    #[case::file(FieldKind::File, json!({"type": "string", "format": "data-url"}), json!({}))]
    #[case::image(
        FieldKind::Image,
        json!({"type": "string", "format": "data-url"}),
        json!({"ui:options": {"accept": "image/*"}})
    )]
    #[case::video(
        FieldKind::Video,
        json!({"type": "string", "format": "data-url"}),
        json!({"ui:options": {"accept": "video/*"}})
    )]
    #[case::date(FieldKind::Date, json!({"type": "string", "format": "date"}), json!({}))]
    #[case::datetime(FieldKind::Datetime, json!({"type": "string", "format": "datetime"}), json!({}))]
    #[case::email(FieldKind::Email, json!({"type": "string", "format": "email"}), json!({}))]
    #[case::license_plate(
        FieldKind::LicensePlate,
        json!({"type": "string"}),
        json!({"ui:widget": "VehicleIdWidget"})
    )]
    fn kind_writes_renderer_attributes(
        #[case] kind: FieldKind,
        #[case] schema: Value,
        #[case] ui: Value,
    ) {
        let (s, u) = apply_to_empty(kind);
        assert_eq!(serde_json::to_value(&s).unwrap(), schema);
        assert_eq!(serde_json::to_value(&u).unwrap(), ui);
    }

    #[test]
    fn file_clears_accept_and_drops_empty_options() {
        let (schema, ui) = apply_to_empty(FieldKind::Image);
        let (_, ui) = apply_kind(FieldKind::File, &schema, &ui);
        assert_eq!(ui.options, None);
    }

    #[test]
    fn file_keeps_other_options() {
        let ui: FieldUiSchema = serde_json::from_value(json!({
            "ui:options": {"accept": "video/*", "orderable": false}
        }))
        .unwrap();
        let (_, ui) = apply_kind(FieldKind::File, &FieldSchema::default(), &ui);
        assert_eq!(
            serde_json::to_value(&ui).unwrap(),
            json!({"ui:options": {"orderable": false}})
        );
    }

    #[test]
    fn license_plate_removes_format() {
        let (schema, ui) = apply_to_empty(FieldKind::Email);
        let (schema, _) = apply_kind(FieldKind::LicensePlate, &schema, &ui);
        assert_eq!(schema.format, None);
    }

    #[test]
    fn unrelated_attributes_survive_a_kind_change() {
        let schema: FieldSchema = serde_json::from_value(json!({
            "type": "string",
            "title": "Colour",
            "default": "red",
            "enum": ["red", "blue"]
        }))
        .unwrap();
        let (changed, _) = apply_kind(FieldKind::Email, &schema, &FieldUiSchema::default());
        assert_eq!(changed.title.as_deref(), Some("Colour"));
        assert_eq!(changed.default, Some(json!("red")));
        assert_eq!(changed.enum_values, Some(vec![json!("red"), json!("blue")]));
    }

    #[test]
    fn unknown_format_falls_back_to_type() {
        let schema: FieldSchema =
            serde_json::from_value(json!({"type": "string", "format": "uri"})).unwrap();
        assert_eq!(kind_of(&schema, &FieldUiSchema::default()), FieldKind::String);
    }

    #[test]
    fn vehicle_widget_on_a_number_is_a_number() {
        let schema = FieldSchema {
            data_type: DataType::Number,
            ..Default::default()
        };
        let ui = FieldUiSchema {
            widget: Some(VEHICLE_ID_WIDGET.to_string()),
            ..Default::default()
        };
        assert_eq!(kind_of(&schema, &ui), FieldKind::Number);
    }

    #[test]
    fn kind_names() {
        assert_eq!(FieldKind::LicensePlate.to_string(), "license-plate");
        assert_eq!(FieldKind::from_str("datetime").unwrap(), FieldKind::Datetime);
        assert!(FieldKind::from_str("color").is_err());
    }

    #[rstest]
    #[case::integers("1,2,3", DataType::Integer, Some(vec![json!(1), json!(2), json!(3)]))]
    #[case::blank_string("", DataType::String, None)]
    #[case::whitespace_only("   ", DataType::Number, None)]
    #[case::trimmed_strings("a, b", DataType::String, Some(vec![json!("a"), json!("b")]))]
    #[case::duplicates_kept("a,a", DataType::String, Some(vec![json!("a"), json!("a")]))]
    #[case::numbers("1.5, 2, x", DataType::Number, Some(vec![json!(1.5), json!(2), json!(0)]))]
    #[case::integer_prefix("12px, -3, abc", DataType::Integer, Some(vec![json!(12), json!(-3), json!(0)]))]
    fn enum_input(#[case] csv: &str, #[case] data_type: DataType, #[case] expected: Option<Vec<Value>>) {
        assert_eq!(coerce_enum_input(csv, data_type), expected);
    }

    #[rstest]
    #[case("true", DataType::Boolean, json!(true))]
    #[case("false", DataType::Boolean, json!(false))]
    #[case("x", DataType::Boolean, json!(false))]
    #[case("42", DataType::Integer, json!("42"))]
    #[case("hello", DataType::String, json!("hello"))]
    fn default_input(#[case] raw: &str, #[case] data_type: DataType, #[case] expected: Value) {
        assert_eq!(coerce_default_input(raw, data_type), expected);
    }
}
