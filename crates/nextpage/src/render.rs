// File: src/render.rs
// Purpose: Template rendering with variable interpolation

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::value::Value;

/// Template renderer with `{name}` variable interpolation.
///
/// Dotted names reach into `Value::Object` entries; unknown placeholders
/// are left verbatim so a missing context value is visible, not silent.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    variables: HashMap<String, Value>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_context(variables: HashMap<String, Value>) -> Self {
        Self { variables }
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn render(&self, template: &str) -> String {
        static VAR_REGEX: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_\.]*)\}").unwrap());

        VAR_REGEX
            .replace_all(template, |caps: &regex::Captures| {
                let name = &caps[1];
                self.lookup(name)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| format!("{{{}}}", name))
            })
            .to_string()
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        if name.contains('.') {
            self.get_nested(name)
        } else {
            self.variables.get(name)
        }
    }

    fn get_nested(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        let mut current = self.variables.get(parts[0])?;
        for part in &parts[1..] {
            match current {
                Value::Object(map) => current = map.get(*part)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_interpolation() {
        let mut renderer = Renderer::new();
        renderer.set_var("name", Value::Str("Alice".to_string()));
        renderer.set_var("age", Value::Int(30));
        let html = renderer.render("<p>Hello, {name}! Age: {age}</p>");
        assert_eq!(html, "<p>Hello, Alice! Age: 30</p>");
    }

    #[test]
    fn test_nested_value() {
        let mut user = HashMap::new();
        user.insert("name".to_string(), Value::Str("Bob".to_string()));
        let mut renderer = Renderer::new();
        renderer.set_var("user", Value::Object(user));
        assert_eq!(renderer.render("<p>{user.name}</p>"), "<p>Bob</p>");
    }

    #[test]
    fn test_missing_variable_left_verbatim() {
        let renderer = Renderer::new();
        assert_eq!(renderer.render("<p>{missing}</p>"), "<p>{missing}</p>");
    }
}
