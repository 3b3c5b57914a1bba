//! Form error collection shared by the HTML forms.

use serde::Serialize;
use std::collections::BTreeMap;
use validator::ValidationErrors;

/// Errors collected while cleaning a submitted form.
///
/// Field errors are shown next to their input; non-field errors at the top
/// of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding a single non-field message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add_non_field(message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages for one field (empty when the field is valid).
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    /// All messages, non-field first.
    pub fn messages(&self) -> Vec<String> {
        self.non_field
            .iter()
            .cloned()
            .chain(self.fields.values().flatten().cloned())
            .collect()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                form_errors.add(field, message);
            }
        }
        form_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_empty_by_default() {
        let errors = FormErrors::new();
        assert!(errors.is_empty());
        assert!(errors.field("date").is_empty());
        assert!(errors.messages().is_empty());
    }

    #[test]
    fn test_add_field_and_non_field() {
        let mut errors = FormErrors::new();
        errors.add("date", "Date is required");
        errors.add("date", "Enter a valid date");
        errors.add_non_field("This slot is full");

        assert!(!errors.is_empty());
        assert!(errors.has_field("date"));
        assert_eq!(errors.field("date").len(), 2);
        assert_eq!(errors.non_field(), ["This slot is full".to_string()]);
        assert_eq!(errors.messages()[0], "This slot is full");
        assert_eq!(errors.messages().len(), 3);
    }

    #[test]
    fn test_from_message() {
        let errors = FormErrors::from_message("Login failed.");
        assert_eq!(errors.non_field().len(), 1);
        assert!(errors.fields.is_empty());
    }

    #[test]
    fn test_from_validation_errors() {
        let sample = Sample {
            name: String::new(),
        };
        let errors: FormErrors = sample.validate().unwrap_err().into();
        assert_eq!(errors.field("name"), ["Name is required".to_string()]);
    }
}
