//! Structural validation of template JSON.

use serde_json::Value as JsonValue;
use vlei_types::ExportedTemplate;

use crate::TemplateError;

/// Required fields and the message reported when one is missing or empty.
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("id", "Template ID is required"),
    ("name", "Template name is required"),
    ("description", "Template description is required"),
    ("author", "Template author is required"),
    ("version", "Template version is required"),
    ("createdDate", "Template created date is required"),
    ("workflow", "Template workflow is required"),
    ("config", "Template config is required"),
];

/// Checks a parsed template, reporting every problem rather than the first.
///
/// A field counts as missing when it is absent, null, `false`, zero or an
/// empty string. `tags` must be an array, possibly empty.
pub fn validate_template(value: &JsonValue) -> Result<(), TemplateError> {
    let mut errors: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|(field, _)| is_blank(value.get(field)))
        .map(|(_, message)| message.to_string())
        .collect();
    if !value.get("tags").is_some_and(JsonValue::is_array) {
        errors.push("Template tags must be an array".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(TemplateError::Invalid { errors }) }
}

fn is_blank(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::Bool(flag)) => !flag,
        Some(JsonValue::String(text)) => text.is_empty(),
        Some(JsonValue::Number(number)) => number.as_f64() == Some(0.0),
        Some(JsonValue::Array(_) | JsonValue::Object(_)) => false,
    }
}

/// Parses, validates and decodes template JSON text.
pub fn import_template_str(text: &str) -> Result<ExportedTemplate, TemplateError> {
    let value: JsonValue = serde_json::from_str(text).map_err(TemplateError::Parse)?;
    validate_template(&value)?;
    serde_json::from_value(value).map_err(TemplateError::Malformed)
}
