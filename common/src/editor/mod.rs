//! In-memory state of one form while it is being built.
//!
//! Fields live in an append-only arena and are addressed by [`FieldId`]
//! handles. Deleting a field only marks its slot, so handles held by the UI
//! for the remaining fields never shift. The editor never performs I/O:
//! callers persist what [`FormEditor::to_record`] returns.
//!
//! The destination is carried as stored and only decoded on request, so a
//! form whose destination the server would refuse can still be opened and
//! given a new one.

use crate::model::destination::{Destination, DestinationError};
use crate::model::field::{Field, FieldSchema, FieldUiSchema};
use crate::model::form::{FormRecord, FormSchema, UiSchema};
use crate::model::kind::{apply_kind_in_place, coerce_default_input, coerce_enum_input, kind_of, FieldKind};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("no field with handle {0}")]
    UnknownField(FieldId),
    #[error("field {0} has been deleted")]
    DeletedField(FieldId),
    #[error("unknown field attribute \"{0}\"")]
    UnknownAttribute(String),
    #[error("unknown field kind \"{0}\"")]
    UnknownKind(String),
}

/// Stable handle of a field inside one [`FormEditor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An edit coming from the field editor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAttribute {
    Title(String),
    /// Goes through the kind mapping, never written to `type` directly.
    Kind(FieldKind),
    /// Raw text of the default value input.
    Default(String),
    /// Raw comma separated text of the enum input.
    Enum(String),
}

impl FieldAttribute {
    /// Builds an edit from the attribute name and raw input of the UI.
    /// Unknown names and kinds are rejected here, before they reach the editor.
    pub fn parse(name: &str, value: &str) -> Result<Self, EditorError> {
        match name {
            "title" => Ok(FieldAttribute::Title(value.to_string())),
            "type" => FieldKind::from_str(value)
                .map(FieldAttribute::Kind)
                .map_err(|_| EditorError::UnknownKind(value.to_string())),
            "default" => Ok(FieldAttribute::Default(value.to_string())),
            "enum" => Ok(FieldAttribute::Enum(value.to_string())),
            _ => Err(EditorError::UnknownAttribute(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormEditor {
    title: String,
    fields: Vec<Field>,
    ui_schema: UiSchema,
    destination: Option<Value>,
}

impl FormEditor {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Opens a persisted form; its properties become the fields, in order.
    pub fn from_record(record: &FormRecord) -> Self {
        let fields = record
            .schema
            .properties
            .iter()
            .map(|(name, schema)| Field::new(name.clone(), schema.clone()))
            .collect();
        Self {
            title: record.schema.title.clone().unwrap_or_default(),
            fields,
            ui_schema: record.ui_schema.clone(),
            destination: record.destination.clone(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn ui_schema(&self) -> &UiSchema {
        &self.ui_schema
    }

    /// Live fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.deleted)
            .map(|(i, f)| (FieldId(i), f))
    }

    pub fn field(&self, id: FieldId) -> Result<&Field, EditorError> {
        self.fields.get(id.0).ok_or(EditorError::UnknownField(id))
    }

    fn live_field_mut(&mut self, id: FieldId) -> Result<&mut Field, EditorError> {
        let field = self.fields.get_mut(id.0).ok_or(EditorError::UnknownField(id))?;
        if field.deleted {
            return Err(EditorError::DeletedField(id));
        }
        Ok(field)
    }

    /// Appends `field_<n>` titled `新字段 <n>`, where `n` is the number of
    /// slots (deleted ones included) plus one.
    ///
    /// Names are not checked for uniqueness: after a rename a later
    /// `field_<n>` can collide with an existing name. See
    /// [`FormEditor::duplicate_names`].
    pub fn add_field(&mut self) -> FieldId {
        let n = self.fields.len() + 1;
        let schema = FieldSchema {
            title: Some(format!("新字段 {n}")),
            ..Default::default()
        };
        self.fields.push(Field::new(format!("field_{n}"), schema));
        FieldId(self.fields.len() - 1)
    }

    /// Changes the property key of a field. The `uiSchema` entry stays under
    /// the old name until the caller moves it; [`FormEditor::prune_ui_schema`]
    /// drops it otherwise.
    pub fn rename_field(&mut self, id: FieldId, name: impl Into<String>) -> Result<(), EditorError> {
        self.live_field_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_field_attribute(&mut self, id: FieldId, attribute: FieldAttribute) -> Result<(), EditorError> {
        let field = self.fields.get_mut(id.0).ok_or(EditorError::UnknownField(id))?;
        if field.deleted {
            return Err(EditorError::DeletedField(id));
        }
        let schema = &mut field.schema;
        match attribute {
            FieldAttribute::Title(title) => schema.title = Some(title),
            FieldAttribute::Kind(kind) => {
                let ui = self.ui_schema.entry(field.name.clone()).or_default();
                apply_kind_in_place(kind, schema, ui);
            }
            FieldAttribute::Default(raw) => {
                schema.default = Some(coerce_default_input(&raw, schema.data_type));
            }
            FieldAttribute::Enum(raw) => {
                schema.enum_values = coerce_enum_input(&raw, schema.data_type);
            }
        }
        Ok(())
    }

    pub fn kind_of(&self, id: FieldId) -> Result<FieldKind, EditorError> {
        let field = self.field(id)?;
        let ui = self.ui_schema.get(&field.name).cloned().unwrap_or_default();
        Ok(kind_of(&field.schema, &ui))
    }

    /// Marks a field deleted; the slot stays, so no other handle moves.
    pub fn soft_delete_field(&mut self, id: FieldId) -> Result<(), EditorError> {
        let field = self.fields.get_mut(id.0).ok_or(EditorError::UnknownField(id))?;
        field.deleted = true;
        Ok(())
    }

    /// Folds the live fields into the form schema, in field order.
    ///
    /// Should two live fields share a name, the property keeps the position
    /// of the first one and the schema of the last one.
    pub fn build_schema(&self) -> FormSchema {
        let mut schema = FormSchema {
            title: Some(self.title.clone()),
            ..Default::default()
        };
        for (_, field) in self.fields() {
            schema.properties.insert(field.name.clone(), field.schema.clone());
        }
        schema
    }

    /// Drops UI hints of names that are not a live field any more, and
    /// hints that say nothing.
    pub fn prune_ui_schema(&mut self) {
        let live: HashSet<&str> = self
            .fields
            .iter()
            .filter(|f| !f.deleted)
            .map(|f| f.name.as_str())
            .collect();
        self.ui_schema
            .retain(|name, ui| live.contains(name.as_str()) && !ui.is_empty());
    }

    /// Names carried by more than one live field.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, field) in self.fields() {
            *counts.entry(field.name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn destination(&self) -> Result<Destination, DestinationError> {
        Destination::from_value(self.destination.as_ref())
    }

    pub fn set_destination(&mut self, destination: &Destination) {
        // a `Destination` is plain strings, it always serializes
        self.destination = serde_json::to_value(destination).ok();
    }

    /// Prunes the UI hints and returns the record to persist. The
    /// destination is written back as loaded unless it was replaced.
    pub fn to_record(&mut self) -> FormRecord {
        self.prune_ui_schema();
        FormRecord {
            schema: self.build_schema(),
            ui_schema: self.ui_schema.clone(),
            destination: self.destination.clone(),
        }
    }

    /// UI hints of one field, if any.
    pub fn field_ui_schema(&self, id: FieldId) -> Result<Option<&FieldUiSchema>, EditorError> {
        let field = self.field(id)?;
        Ok(self.ui_schema.get(&field.name))
    }
}
