//! Form schema: field descriptors, form state, reactive observers, and validation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Current value of a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(value) => value,
            FieldValue::Flag(true) => "1",
            FieldValue::Flag(false) => "",
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            FieldValue::Flag(value) => *value,
            FieldValue::Text(value) => {
                matches!(value.trim(), "1" | "true" | "on" | "yes")
            }
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.trim().is_empty(),
            FieldValue::Flag(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Options come from `relationship`, labelled by `title_attribute`.
    Select {
        relationship: &'static str,
        title_attribute: &'static str,
    },
    TextInput,
    /// Media attachment stored in the named collection.
    FileUpload { collection: &'static str },
    RichEditor,
    Toggle,
}

/// Writable view over sibling fields handed to observers.
pub struct FieldSetter<'a> {
    values: &'a mut BTreeMap<&'static str, FieldValue>,
}

impl FieldSetter<'_> {
    /// Overwrite a sibling field. Does not trigger that field's own observer.
    pub fn set(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }
}

/// Callback run after a reactive field's state changes.
pub type AfterStateUpdated = Arc<dyn Fn(&mut FieldSetter<'_>, &FieldValue) + Send + Sync>;

#[derive(Clone)]
pub struct FieldSpec {
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    after_state_updated: Option<AfterStateUpdated>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label: name,
            kind,
            required: false,
            after_state_updated: None,
        }
    }

    pub fn select(
        name: &'static str,
        relationship: &'static str,
        title_attribute: &'static str,
    ) -> Self {
        Self::new(
            name,
            FieldKind::Select {
                relationship,
                title_attribute,
            },
        )
    }

    pub fn text_input(name: &'static str) -> Self {
        Self::new(name, FieldKind::TextInput)
    }

    pub fn file_upload(name: &'static str, collection: &'static str) -> Self {
        Self::new(name, FieldKind::FileUpload { collection })
    }

    pub fn rich_editor(name: &'static str) -> Self {
        Self::new(name, FieldKind::RichEditor)
    }

    pub fn toggle(name: &'static str) -> Self {
        Self::new(name, FieldKind::Toggle)
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Register an observer, making this field reactive.
    pub fn after_state_updated<F>(mut self, observer: F) -> Self
    where
        F: Fn(&mut FieldSetter<'_>, &FieldValue) + Send + Sync + 'static,
    {
        self.after_state_updated = Some(Arc::new(observer));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_label(&self) -> &'static str {
        self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_reactive(&self) -> bool {
        self.after_state_updated.is_some()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("reactive", &self.is_reactive())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<&'static str, FieldValue>,
}

impl FormState {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).map(FieldValue::as_flag).unwrap_or(false)
    }

    /// Fill a value without running observers, e.g. when hydrating from a record.
    pub fn fill(&mut self, name: &'static str, value: FieldValue) {
        self.values.insert(name, value);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("form has no field named `{0}`")]
    UnknownField(String),
}

/// Field-level validation failures keyed by field name.
#[derive(Debug, Clone, Default, Error, PartialEq, Eq)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Apply a user edit to `name`, then run that field's observer if it has one.
    pub fn update(
        &self,
        state: &mut FormState,
        name: &str,
        value: FieldValue,
    ) -> Result<(), FormError> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;

        state.values.insert(field.name, value.clone());

        if let Some(observer) = field.after_state_updated.as_ref() {
            let mut setter = FieldSetter {
                values: &mut state.values,
            };
            observer(&mut setter, &value);
        }

        Ok(())
    }

    pub fn validate(&self, state: &FormState) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in self.fields.iter().filter(|field| field.required) {
            let missing = state.get(field.name).is_none_or(FieldValue::is_blank);
            if missing {
                errors.insert(
                    field.name,
                    format!("The {} field is required.", field.label.to_lowercase()),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
