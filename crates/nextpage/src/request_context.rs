// File: src/request_context.rs
// Purpose: Request context with query params, headers, cookies, and form data

use axum::http::{HeaderMap, Method};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Request context passed to views, context providers, and dependencies.
///
/// Opaque to the resolver itself: providers hand it through whole.
#[derive(Clone)]
pub struct RequestContext {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: Method,

    /// Request path
    pub path: String,

    /// Query parameters from URL (?key=value)
    pub query: QueryParams,

    /// Form data from POST/PUT requests
    pub form: FormData,

    /// Request headers
    pub headers: HeaderMap,

    /// Parsed cookies
    pub cookies: HashMap<String, String>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

impl RequestContext {
    /// Create a new request context
    pub fn new(
        method: Method,
        path: String,
        query: QueryParams,
        form: FormData,
        headers: HeaderMap,
    ) -> Self {
        let cookies = Self::parse_cookies(&headers);

        Self {
            method,
            path,
            query,
            form,
            headers,
            cookies,
        }
    }

    /// Parse cookies from Cookie header
    fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
        let mut cookies = HashMap::new();

        if let Some(cookie_header) = headers.get("cookie") {
            if let Ok(cookie_str) = cookie_header.to_str() {
                for cookie in cookie_str.split(';') {
                    let cookie = cookie.trim();
                    if let Some((key, value)) = cookie.split_once('=') {
                        cookies.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        cookies
    }

    /// Get a cookie value
    pub fn get_cookie(&self, name: &str) -> Option<&String> {
        self.cookies.get(name)
    }

    /// Get a header value
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Check if request accepts JSON
    pub fn accepts_json(&self) -> bool {
        self.get_header("accept")
            .map(|accept| accept.contains("application/json"))
            .unwrap_or(false)
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }
}

/// Query parameters from URL
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Create from HashMap
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Get a query parameter value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a query parameter as a specific type
    pub fn get_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.params.get(key)?.parse().ok()
    }

    /// Check if a parameter exists
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get as HashMap
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.params
    }
}

/// Form data from POST/PUT requests.
///
/// Carries validation errors alongside field values so a failed submission
/// can re-render the page with the bound form.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    raw_json: Option<JsonValue>,
    validation_errors: HashMap<String, String>,
}

impl FormData {
    /// Create empty form data
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from form fields with automatic trimming
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        let trimmed_fields = fields
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect();

        Self {
            fields: trimmed_fields,
            raw_json: None,
            validation_errors: HashMap::new(),
        }
    }

    /// Create from a JSON request body
    pub fn from_json(json: JsonValue) -> Self {
        let mut fields = HashMap::new();

        if let JsonValue::Object(map) = &json {
            for (key, value) in map {
                if let Some(s) = value.as_str() {
                    fields.insert(key.clone(), s.trim().to_string());
                } else {
                    fields.insert(key.clone(), value.to_string());
                }
            }
        }

        Self {
            fields,
            raw_json: Some(json),
            validation_errors: HashMap::new(),
        }
    }

    /// Get a form field value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.fields.get(key)
    }

    /// Get a form field as a specific type
    pub fn get_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.fields.get(key)?.parse().ok()
    }

    /// Check if a field exists
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Get all field names
    pub fn keys(&self) -> Vec<&String> {
        self.fields.keys().collect()
    }

    /// Get raw JSON if available
    pub fn json(&self) -> Option<&JsonValue> {
        self.raw_json.as_ref()
    }

    /// Get as HashMap
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Check if form is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.raw_json.is_none()
    }

    /// Set validation errors
    pub fn set_validation_errors(&mut self, errors: HashMap<String, String>) {
        self.validation_errors = errors;
    }

    /// Get validation errors
    pub fn validation_errors(&self) -> &HashMap<String, String> {
        &self.validation_errors
    }

    /// Get error for a specific field
    pub fn get_error(&self, field: &str) -> Option<&String> {
        self.validation_errors.get(field)
    }

    /// Check if there are validation errors
    pub fn has_errors(&self) -> bool {
        !self.validation_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_data_empty() {
        let form = FormData::new();
        assert!(form.is_empty());
        assert!(!form.has_errors());
    }

    #[test]
    fn test_form_data_trimming() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), "  John  ".to_string());

        let form = FormData::from_fields(fields);
        assert_eq!(form.get("name"), Some(&"John".to_string()));
    }

    #[test]
    fn test_form_data_json_parsing() {
        let json = serde_json::json!({ "name": "Alice", "age": 30 });
        let form = FormData::from_json(json.clone());

        assert_eq!(form.get("name"), Some(&"Alice".to_string()));
        assert_eq!(form.get("age"), Some(&"30".to_string()));
        assert_eq!(form.json(), Some(&json));
    }

    #[test]
    fn test_form_data_validation_errors() {
        let mut form = FormData::new();
        assert!(!form.has_errors());

        let mut errors = HashMap::new();
        errors.insert("name".to_string(), "Name is required".to_string());
        form.set_validation_errors(errors);

        assert!(form.has_errors());
        assert_eq!(form.get_error("name"), Some(&"Name is required".to_string()));
        assert!(form.get_error("email").is_none());
    }

    #[test]
    fn test_query_params_get_as() {
        let mut params = HashMap::new();
        params.insert("page".to_string(), "2".to_string());

        let query = QueryParams::new(params);
        assert_eq!(query.get_as::<i32>("page"), Some(2));
        assert_eq!(query.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_request_context_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "session=abc123; user=john".parse().unwrap());

        let cookies = RequestContext::parse_cookies(&headers);
        assert_eq!(cookies.get("session"), Some(&"abc123".to_string()));
        assert_eq!(cookies.get("user"), Some(&"john".to_string()));
    }
}
