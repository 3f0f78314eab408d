//! Schema-driven forms for the privacy flows.
//!
//! A form is a list of field definitions. `filter` normalizes raw input field
//! by field and `validate` collects every violation in field order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::types::ConfirmInput;

pub const FIELD_REQUIRED: &str = "JLIB_FORM_VALIDATE_FIELD_REQUIRED";
pub const FIELD_INVALID: &str = "JLIB_FORM_VALIDATE_FIELD_INVALID";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormIntent {
    Confirm,
    Request,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Email,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFilter {
    /// Strip surrounding whitespace
    Trim,
    /// Keep ASCII letters and digits only
    Alnum,
}

impl FieldFilter {
    pub fn apply(self, value: &str) -> String {
        match self {
            FieldFilter::Trim => value.trim().to_string(),
            FieldFilter::Alnum => alnum(value),
        }
    }
}

/// Keep only ASCII alphanumerics.
pub fn alnum(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub filter: FieldFilter,
    #[serde(default)]
    pub value: String,
}

impl FieldDefinition {
    fn new(name: &str, label: &str, field_type: FieldType, filter: FieldFilter) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            required: true,
            filter,
            value: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldErrorKind {
    Required,
    Invalid,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub label: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn required(field: &str, label: &str) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
            kind: FieldErrorKind::Required,
        }
    }

    pub fn invalid(field: &str, label: &str) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
            kind: FieldErrorKind::Invalid,
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self.kind {
            FieldErrorKind::Required => FIELD_REQUIRED,
            FieldErrorKind::Invalid => FIELD_INVALID,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FieldErrorKind::Required => write!(f, "Field required: {}", self.label),
            FieldErrorKind::Invalid => write!(f, "Invalid field: {}", self.label),
        }
    }
}

/// Request method of the invocation that asked for a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(format!("unsupported method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub name: String,
    pub intent: FormIntent,
    pub control: String,
    pub fields: Vec<FieldDefinition>,
}

impl Form {
    pub fn for_intent(intent: FormIntent) -> Self {
        let email = FieldDefinition::new("email", "Email Address", FieldType::Email, FieldFilter::Trim);
        let fields = match intent {
            FormIntent::Confirm => vec![
                email,
                FieldDefinition::new(
                    "confirm_token",
                    "Confirmation Token",
                    FieldType::Text,
                    FieldFilter::Alnum,
                ),
            ],
            FormIntent::Request => vec![email],
        };

        let name = match intent {
            FormIntent::Confirm => "com_privacy.confirm",
            FormIntent::Request => "com_privacy.request",
        };

        Self {
            name: name.to_string(),
            intent,
            control: "jform".to_string(),
            fields,
        }
    }

    pub fn confirm() -> Self {
        Self::for_intent(FormIntent::Confirm)
    }

    pub fn request() -> Self {
        Self::for_intent(FormIntent::Request)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value.as_str())
    }

    /// Set a field's display value. Returns false for unknown fields.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Apply each field's filter. Keys the form does not define pass through.
    pub fn filter(&self, data: &HashMap<String, String>) -> HashMap<String, String> {
        let mut filtered = data.clone();
        for field in &self.fields {
            if let Some(raw) = data.get(&field.name) {
                filtered.insert(field.name.clone(), field.filter.apply(raw));
            }
        }
        filtered
    }

    /// Validate filtered data, collecting every violation in field order.
    pub fn validate(&self, data: &HashMap<String, String>) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        for field in &self.fields {
            let value = data.get(&field.name).map(String::as_str).unwrap_or("");

            if value.is_empty() {
                if field.required {
                    errors.push(FieldError::required(&field.name, &field.label));
                }
                continue;
            }

            if field.field_type == FieldType::Email && !EMAIL_PATTERN.is_match(value) {
                errors.push(FieldError::invalid(&field.name, &field.label));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Load the confirm form.
///
/// GET invocations come from the emailed link, so the token field is
/// pre-populated from the query string with everything but ASCII
/// alphanumerics stripped.
pub fn load_form(method: HttpMethod, query: &HashMap<String, String>) -> Form {
    let mut form = Form::confirm();

    if method == HttpMethod::Get {
        let token = query.get("confirm_token").map(|raw| alnum(raw)).unwrap_or_default();
        form.set_value("confirm_token", token);
    }

    form
}

/// Parse and percent-decode an `a=b&c=d` query string. Later keys win.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

impl From<&ConfirmInput> for HashMap<String, String> {
    fn from(input: &ConfirmInput) -> Self {
        let mut data = input.extra.clone();
        data.insert("email".to_string(), input.email.clone());
        data.insert("confirm_token".to_string(), input.confirm_token.clone());
        data
    }
}

impl From<HashMap<String, String>> for ConfirmInput {
    fn from(mut data: HashMap<String, String>) -> Self {
        let email = data.remove("email").unwrap_or_default();
        let confirm_token = data.remove("confirm_token").unwrap_or_default();
        Self {
            email,
            confirm_token,
            extra: data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_filter_strips_token_and_trims_email() {
        let form = Form::confirm();
        let filtered = form.filter(&data(&[
            ("email", "  a@example.com "),
            ("confirm_token", "ab-12 <script>"),
            ("itemid", "7"),
        ]));

        assert_eq!(filtered["email"], "a@example.com");
        assert_eq!(filtered["confirm_token"], "ab12script");
        assert_eq!(filtered["itemid"], "7");
    }

    #[test]
    fn test_validate_collects_errors_in_field_order() {
        let form = Form::confirm();
        let errors = form
            .validate(&data(&[("email", "not an email"), ("confirm_token", "")]))
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], FieldError::invalid("email", "Email Address"));
        assert_eq!(errors[1], FieldError::required("confirm_token", "Confirmation Token"));
        assert_eq!(errors[1].to_string(), "Field required: Confirmation Token");
    }

    #[test]
    fn test_validate_accepts_punycode_email() {
        let form = Form::confirm();
        assert!(form
            .validate(&data(&[
                ("email", "user@xn--bcher-kva.example"),
                ("confirm_token", "abc123"),
            ]))
            .is_ok());
    }

    #[test]
    fn test_request_form_only_needs_email() {
        let form = Form::request();
        assert!(form.validate(&data(&[("email", "a@example.com")])).is_ok());
        assert!(form.field("confirm_token").is_none());
    }

    #[test]
    fn test_get_prefills_token_from_query() {
        let query = parse_query("?option=com_privacy&confirm_token=Ab3%2F..x9");
        let form = load_form(HttpMethod::Get, &query);
        assert_eq!(form.value("confirm_token"), Some("Ab3x9"));
        assert_eq!(form.value("email"), Some(""));
    }

    #[test]
    fn test_get_prefill_decodes_encoded_key() {
        let query = parse_query("confirm%5Ftoken=abc123");
        let form = load_form(HttpMethod::Get, &query);
        assert_eq!(form.value("confirm_token"), Some("abc123"));
    }

    #[test]
    fn test_parse_query_decodes_values() {
        let query = parse_query("email=user%40example.com&note=a+b&flag");
        assert_eq!(query["email"], "user@example.com");
        assert_eq!(query["note"], "a b");
        assert_eq!(query["flag"], "");
    }

    #[test]
    fn test_post_does_not_prefill() {
        let query = parse_query("confirm_token=abc");
        let form = load_form(HttpMethod::Post, &query);
        assert_eq!(form.value("confirm_token"), Some(""));
    }

    #[test]
    fn test_confirm_input_map_conversion() {
        let mut input = ConfirmInput::new("a@example.com", "tok");
        input.extra.insert("itemid".to_string(), "3".to_string());

        let map: HashMap<String, String> = (&input).into();
        let back = ConfirmInput::from(map);
        assert_eq!(back, input);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert!("PUT".parse::<HttpMethod>().is_err());
    }
}
