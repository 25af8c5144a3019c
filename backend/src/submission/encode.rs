//! Re-encoding of a JSON submission for `web` destinations that do not take JSON.

use crate::submission::SubmitError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart;
use serde_json::{Map, Value};

/// Characters left alone by JavaScript's `encodeURIComponent`; everything
/// else is percent-encoded, so a space becomes `%20` rather than `+`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn parse_body(body: &[u8]) -> Result<Value, SubmitError> {
    serde_json::from_slice(body).map_err(|e| SubmitError::InvalidBody(e.to_string()))
}

/// Parses a body whose top-level keys become form fields.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, SubmitError> {
    match parse_body(body)? {
        Value::Object(fields) => Ok(fields),
        other => Err(SubmitError::InvalidBody(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// Text of a value used as a form field. Strings are taken as they are,
/// arrays are joined with commas, everything else is written as JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

pub fn form_urlencoded(fields: &Map<String, Value>) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, URI_COMPONENT),
                utf8_percent_encode(&stringify(value), URI_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn multipart_form(fields: &Map<String, Value>) -> multipart::Form {
    fields.iter().fold(multipart::Form::new(), |form, (key, value)| {
        form.text(key.clone(), stringify(value))
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    #[test]
    fn urlencoded_follows_field_order() {
        let fields = parse_object(br#"{"a":"1","b":"x y"}"#).unwrap();
        assert_eq!(form_urlencoded(&fields), "a=1&b=x%20y");
    }

    #[test]
    fn urlencoded_escapes_keys_and_values() {
        let fields = object(json!({"名字": "张三", "q&a": "a=b+c", "ok": "it's (fine)!"}));
        assert_eq!(
            form_urlencoded(&fields),
            "%E5%90%8D%E5%AD%97=%E5%BC%A0%E4%B8%89&q%26a=a%3Db%2Bc&ok=it's%20(fine)!"
        );
    }

    #[test]
    fn values_are_stringified() {
        let fields = object(json!({
            "n": 1.5,
            "yes": true,
            "none": null,
            "tags": ["a", 2],
            "nested": {"k": "v"}
        }));
        assert_eq!(
            form_urlencoded(&fields),
            "n=1.5&yes=true&none=null&tags=a%2C2&nested=%7B%22k%22%3A%22v%22%7D"
        );
    }

    #[test]
    fn bodies_must_be_objects_to_become_fields() {
        assert!(matches!(parse_object(b"[1, 2]"), Err(SubmitError::InvalidBody(_))));
        assert!(matches!(parse_object(b"{"), Err(SubmitError::InvalidBody(_))));
        assert!(parse_body(b"[1, 2]").is_ok());
    }
}
