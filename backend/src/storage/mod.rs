//! Flat-file storage of forms and their submissions.
//!
//! Layout under the data directory:
//! - `forms/<id>.json`: the form record (`schema`, `uiSchema`, `destination`)
//! - `forms/trash/<id>.json`: deleted form records
//! - `responses/<id>/<unix_millis>_<4 hex>.json`: one submission each
//!
//! All functions are blocking; async callers go through [`blocking`].

use common::model::form::FormSummary;
use log::warn;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::NamedTempFile;
use uuid::Uuid;

static FORM_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z_-]+$").unwrap());
static JSON_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z_-]+\.json$").unwrap());

/// How many of the most recent submissions the responses view returns.
pub const RESPONSES_LIMIT: usize = 100;

pub fn is_valid_form_id(id: &str) -> bool {
    FORM_ID_RE.is_match(id)
}

/// The parts of a stored form record the server itself looks at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredForm {
    #[serde(default)]
    pub schema: Value,
    #[serde(default)]
    pub destination: Option<Value>,
}

/// Runs a blocking storage call off the async executor.
pub async fn blocking<F, T>(f: F) -> io::Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(io::Error::other)?
}

#[derive(Debug, Clone)]
pub struct FormStore {
    data_dir: PathBuf,
}

impl FormStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn forms_dir(&self) -> PathBuf {
        self.data_dir.join("forms")
    }

    fn form_path(&self, id: &str) -> PathBuf {
        self.forms_dir().join(format!("{id}.json"))
    }

    fn responses_dir(&self, id: &str) -> PathBuf {
        self.data_dir.join("responses").join(id)
    }

    /// Every stored form that has a schema. A missing forms directory is an
    /// empty list.
    pub fn list_forms(&self) -> io::Result<Vec<FormSummary>> {
        let mut names = match json_file_names(&self.forms_dir()) {
            Ok(names) => names,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        names.sort();

        let mut forms = Vec::with_capacity(names.len());
        for name in names {
            let id = name.trim_end_matches(".json");
            let form = self.read_form(id)?;
            if form.schema.is_null() {
                continue;
            }
            let title = form.schema.get("title").and_then(Value::as_str).map(str::to_string);
            forms.push(FormSummary {
                id: id.to_string(),
                title,
            });
        }
        Ok(forms)
    }

    /// The stored form record, byte for byte.
    pub fn read_form_bytes(&self, id: &str) -> io::Result<Vec<u8>> {
        fs::read(self.form_path(id))
    }

    pub fn read_form(&self, id: &str) -> io::Result<StoredForm> {
        let bytes = self.read_form_bytes(id)?;
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Replaces the form record. The bytes go to a temporary file next to
    /// the target first, so readers see either the old or the new record.
    pub fn write_form(&self, id: &str, bytes: &[u8]) -> io::Result<()> {
        let dir = self.forms_dir();
        fs::create_dir_all(&dir)?;
        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(bytes)?;
        file.persist(self.form_path(id)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Moves the form record to `forms/trash/`. Its submissions stay where
    /// they are.
    pub fn trash_form(&self, id: &str) -> io::Result<()> {
        let source = self.form_path(id);
        if !source.exists() {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("form {id} not found")));
        }
        let trash_dir = self.forms_dir().join("trash");
        fs::create_dir_all(&trash_dir)?;
        fs::rename(source, trash_dir.join(format!("{id}.json")))
    }

    /// Stores one submission verbatim under a fresh name and returns its path.
    ///
    /// Names are `<unix_millis>_<4 hex>.json`: unique in practice, but two
    /// submissions in the same millisecond are ordered only by the random
    /// suffix. An existing file is never overwritten.
    pub fn write_submission(&self, id: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dir = self.responses_dir(id);
        fs::create_dir_all(&dir)?;
        let path = dir.join(submission_file_name());

        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(bytes)?;
        file.persist_noclobber(&path).map_err(|e| e.error)?;
        Ok(path)
    }

    /// The latest [`RESPONSES_LIMIT`] submissions, oldest first, each with
    /// `meta.time` set from its file name. Files that are not valid JSON are
    /// skipped.
    pub fn list_responses(&self, id: &str) -> io::Result<Vec<Value>> {
        let dir = self.responses_dir(id);
        let mut names = match json_file_names(&dir) {
            Ok(names) => names,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        names.sort();
        let skip = names.len().saturating_sub(RESPONSES_LIMIT);

        let mut items = Vec::with_capacity(names.len() - skip);
        for name in names.into_iter().skip(skip) {
            let bytes = fs::read(dir.join(&name))?;
            let mut item: Value = match serde_json::from_slice(&bytes) {
                Ok(item) => item,
                Err(e) => {
                    warn!("Skipping unreadable response {}/{}: {}", id, name, e);
                    continue;
                }
            };
            if let Some(object) = item.as_object_mut() {
                let time: String = name.chars().take(10).collect();
                object.insert("meta".to_string(), serde_json::json!({ "time": time }));
            }
            items.push(item);
        }
        Ok(items)
    }
}

fn submission_file_name() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}.json", millis, &suffix[..4])
}

fn json_file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if JSON_FILE_RE.is_match(name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, FormStore) {
        let dir = TempDir::new().unwrap();
        let store = FormStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn form_ids() {
        assert!(is_valid_form_id("b1e0-form_2"));
        assert!(!is_valid_form_id("../etc"));
        assert!(!is_valid_form_id("a.json"));
        assert!(!is_valid_form_id(""));
    }

    #[test]
    fn write_then_read_form_verbatim() {
        let (_dir, store) = store();
        let bytes = br#"{"schema": {"title": "Visit", "type": "object", "properties": {}}}"#;
        store.write_form("visit", bytes).unwrap();
        assert_eq!(store.read_form_bytes("visit").unwrap(), bytes);

        store.write_form("visit", br#"{"schema": null}"#).unwrap();
        assert!(store.read_form("visit").unwrap().schema.is_null());
    }

    #[test]
    fn list_forms_skips_records_without_schema() {
        let (_dir, store) = store();
        assert!(store.list_forms().unwrap().is_empty());

        store.write_form("b", br#"{"schema": {"title": "Second"}}"#).unwrap();
        store.write_form("a", br#"{"schema": {"type": "object"}}"#).unwrap();
        store.write_form("c", br#"{"uiSchema": {}}"#).unwrap();

        assert_eq!(
            store.list_forms().unwrap(),
            vec![
                FormSummary { id: "a".to_string(), title: None },
                FormSummary { id: "b".to_string(), title: Some("Second".to_string()) },
            ]
        );
    }

    #[test]
    fn trash_moves_the_record() {
        let (dir, store) = store();
        store.write_form("gone", b"{}").unwrap();
        store.trash_form("gone").unwrap();

        assert_eq!(
            store.read_form_bytes("gone").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        assert!(dir.path().join("forms/trash/gone.json").exists());
        assert_eq!(store.trash_form("gone").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn submissions_are_stored_verbatim() {
        let (_dir, store) = store();
        let path = store.write_submission("visit", br#"{"q":"a"}"#).unwrap();

        assert_eq!(fs::read(&path).unwrap(), br#"{"q":"a"}"#);
        let name = path.file_name().unwrap().to_str().unwrap();
        let re = Regex::new(r"^\d{13}_[0-9a-f]{4}\.json$").unwrap();
        assert!(re.is_match(name), "unexpected name {name}");
    }

    #[test]
    fn responses_carry_their_time() {
        let (dir, store) = store();
        assert!(store.list_responses("visit").unwrap().is_empty());

        let responses = dir.path().join("responses/visit");
        fs::create_dir_all(&responses).unwrap();
        fs::write(responses.join("1700000000123_ab12.json"), br#"{"q":"a"}"#).unwrap();
        fs::write(responses.join("1700000001000_cd34.json"), b"not json").unwrap();
        fs::write(responses.join("notes.txt"), b"ignored").unwrap();

        assert_eq!(
            store.list_responses("visit").unwrap(),
            vec![json!({"q": "a", "meta": {"time": "1700000000"}})]
        );
    }

    #[test]
    fn responses_are_limited_to_the_latest() {
        let (dir, store) = store();
        let responses = dir.path().join("responses/busy");
        fs::create_dir_all(&responses).unwrap();
        for i in 0..(RESPONSES_LIMIT + 5) {
            let name = format!("{}_0000.json", 1_700_000_000_000u64 + i as u64 * 1000);
            fs::write(responses.join(name), format!(r#"{{"n":{i}}}"#)).unwrap();
        }

        let items = store.list_responses("busy").unwrap();
        assert_eq!(items.len(), RESPONSES_LIMIT);
        assert_eq!(items[0]["n"], json!(5));
    }
}
