// File: src/forms.rs
// Purpose: Declarative form validation and the form action registry

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::handler::Callable;
use crate::request_context::FormData;
use crate::value::Value;

/// Field value kinds a form can validate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Int,
}

/// One declared form field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            max_len: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Email)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Validates one submitted value; `None` means valid.
    fn validate(&self, value: Option<&String>) -> Option<String> {
        let value = value.map(|v| v.as_str()).unwrap_or("");

        if value.is_empty() {
            return self
                .required
                .then(|| "This field is required.".to_string());
        }

        if let Some(max_len) = self.max_len {
            if value.chars().count() > max_len {
                return Some(format!(
                    "Ensure this value has at most {} characters.",
                    max_len
                ));
            }
        }

        match self.kind {
            FieldKind::Text => None,
            FieldKind::Email => {
                let valid = value
                    .split_once('@')
                    .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
                    .unwrap_or(false);
                (!valid).then(|| "Enter a valid email address.".to_string())
            }
            FieldKind::Int => value
                .parse::<i64>()
                .is_err()
                .then(|| "Enter a whole number.".to_string()),
        }
    }
}

/// Declarative form: an ordered list of field specs.
#[derive(Debug, Clone, Default)]
pub struct FormSpec {
    fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field (functional builder)
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validates submitted data, returning field → message for every
    /// failing field. An empty map means the form is valid.
    pub fn validate(&self, data: &FormData) -> HashMap<String, String> {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .validate(data.get(&field.name))
                    .map(|message| (field.name.clone(), message))
            })
            .collect()
    }
}

/// Computes the stable dispatch id for an action: the first 16 hex
/// characters of sha256 over `file:name`. Same file and name always yield
/// the same id; the id is the literal URL segment under the shared
/// dispatch endpoint.
pub fn action_id(handler_file: &str, name: &str) -> String {
    let digest = Sha256::digest(format!("{}:{}", handler_file, name).as_bytes());
    digest
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>()[..16]
        .to_string()
}

/// One registered form action.
#[derive(Clone)]
pub struct FormAction {
    pub handler_file: String,
    pub name: String,
    pub id: String,
    pub form: Option<FormSpec>,
    pub initial: HashMap<String, String>,
    pub handler: Arc<Callable>,
}

impl std::fmt::Debug for FormAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormAction")
            .field("handler_file", &self.handler_file)
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}

/// Registry of form actions keyed by dispatch id.
#[derive(Debug, Clone, Default)]
pub struct FormActionRegistry {
    actions: HashMap<String, FormAction>,
}

impl FormActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action and returns its dispatch id.
    pub fn register(
        &mut self,
        handler_file: impl Into<String>,
        name: impl Into<String>,
        form: Option<FormSpec>,
        handler: Callable,
    ) -> String {
        self.register_with_initial(handler_file, name, form, HashMap::new(), handler)
    }

    /// Registers an action with initial field values, used to prefill the
    /// bound form on re-render.
    pub fn register_with_initial(
        &mut self,
        handler_file: impl Into<String>,
        name: impl Into<String>,
        form: Option<FormSpec>,
        initial: HashMap<String, String>,
        handler: Callable,
    ) -> String {
        let handler_file = handler_file.into();
        let name = name.into();
        let id = action_id(&handler_file, &name);
        self.actions.insert(
            id.clone(),
            FormAction {
                handler_file,
                name,
                id: id.clone(),
                form,
                initial,
                handler: Arc::new(handler),
            },
        );
        id
    }

    pub fn get(&self, id: &str) -> Option<&FormAction> {
        self.actions.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormAction> {
        self.actions.values()
    }
}

/// Projects a bound form into a template value: submitted fields overlaid
/// on the action's initial values, plus the validation error map.
pub fn form_value(form: &FormData, initial: &HashMap<String, String>) -> Value {
    let mut fields: HashMap<String, Value> = initial
        .iter()
        .map(|(k, v)| (k.clone(), Value::Str(v.clone())))
        .collect();
    for (k, v) in form.as_map() {
        fields.insert(k.clone(), Value::Str(v.clone()));
    }

    let errors: HashMap<String, Value> = form
        .validation_errors()
        .iter()
        .map(|(k, v)| (k.clone(), Value::Str(v.clone())))
        .collect();

    let mut out = HashMap::new();
    out.insert("fields".to_string(), Value::Object(fields));
    out.insert("errors".to_string(), Value::Object(errors));
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::CallOutcome;

    fn form_data(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_action_id_is_stable() {
        let a = action_id("contact/page.rs", "submit");
        let b = action_id("contact/page.rs", "submit");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_action_id_varies_by_file_and_name() {
        let base = action_id("contact/page.rs", "submit");
        assert_ne!(base, action_id("contact/page.rs", "other"));
        assert_ne!(base, action_id("about/page.rs", "submit"));
    }

    #[test]
    fn test_required_field() {
        let spec = FormSpec::new().with_field(FieldSpec::text("name").required());

        let errors = spec.validate(&form_data(&[]));
        assert_eq!(errors.get("name"), Some(&"This field is required.".to_string()));

        let errors = spec.validate(&form_data(&[("name", "Alice")]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_email_field() {
        let spec = FormSpec::new().with_field(FieldSpec::email("email").required());

        assert!(!spec.validate(&form_data(&[("email", "nope")])).is_empty());
        assert!(!spec.validate(&form_data(&[("email", "a@b")])).is_empty());
        assert!(spec
            .validate(&form_data(&[("email", "a@example.com")]))
            .is_empty());
    }

    #[test]
    fn test_int_field() {
        let spec = FormSpec::new().with_field(FieldSpec::int("age"));

        assert!(!spec.validate(&form_data(&[("age", "abc")])).is_empty());
        assert!(spec.validate(&form_data(&[("age", "30")])).is_empty());
        // Optional and absent: valid
        assert!(spec.validate(&form_data(&[])).is_empty());
    }

    #[test]
    fn test_max_len() {
        let spec = FormSpec::new().with_field(FieldSpec::text("bio").with_max_len(5));
        assert!(!spec.validate(&form_data(&[("bio", "too long")])).is_empty());
        assert!(spec.validate(&form_data(&[("bio", "short")])).is_empty());
    }

    #[test]
    fn test_registry_lookup_by_id() {
        let mut registry = FormActionRegistry::new();
        let id = registry.register(
            "contact/page.rs",
            "submit",
            None,
            Callable::new(|_| CallOutcome::None),
        );

        assert!(registry.get(&id).is_some());
        assert!(registry.get("0000000000000000").is_none());
        assert_eq!(registry.get(&id).unwrap().name, "submit");
    }

    #[test]
    fn test_form_value_overlays_initial() {
        let mut initial = HashMap::new();
        initial.insert("name".to_string(), "prefill".to_string());
        initial.insert("city".to_string(), "Berlin".to_string());

        let mut form = form_data(&[("name", "typed")]);
        let mut errors = HashMap::new();
        errors.insert("name".to_string(), "bad".to_string());
        form.set_validation_errors(errors);

        let value = form_value(&form, &initial);
        let obj = value.as_object().unwrap();
        let fields = obj.get("fields").unwrap().as_object().unwrap();
        assert_eq!(fields.get("name"), Some(&Value::Str("typed".into())));
        assert_eq!(fields.get("city"), Some(&Value::Str("Berlin".into())));

        let errors = obj.get("errors").unwrap().as_object().unwrap();
        assert_eq!(errors.get("name"), Some(&Value::Str("bad".into())));
    }
}
