//! The validation gateway contract.
//!
//! Sanitization rules belong to the gateway; the store only asks and reacts to
//! pass or fail. [`BasicGateway`] is the stock implementation used when the host
//! application does not supply its own.

use serde_json::Value;

/// Which characters a text field may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedCharacters {
    Any,
    /// No control characters.
    Printable,
    /// Letters, digits, spaces and common punctuation.
    AlphanumericPunctuation,
}

/// Constraints for a text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRules {
    pub max_length: usize,
    pub min_length: usize,
    pub required: bool,
    pub allowed_characters: AllowedCharacters,
    pub trim: bool,
}

impl TextRules {
    /// Rules for a save display name.
    pub fn save_name(max_length: usize) -> Self {
        Self {
            max_length,
            min_length: 1,
            required: true,
            allowed_characters: AllowedCharacters::AlphanumericPunctuation,
            trim: true,
        }
    }
}

/// Constraints for structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRules {
    pub max_depth: usize,
    pub required_keys: Vec<String>,
}

/// The verdict of a gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome<T> {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub sanitized_value: T,
}

impl<T> ValidationOutcome<T> {
    /// The sanitized value, or the joined error messages.
    pub fn into_result(self) -> Result<T, String> {
        if self.is_valid {
            Ok(self.sanitized_value)
        } else {
            Err(self.errors.join("; "))
        }
    }
}

/// External validator consulted by the store.
pub trait ValidationGateway {
    /// Check and canonicalize a text field.
    fn sanitize_text(&self, input: &str, rules: &TextRules) -> ValidationOutcome<String>;

    /// Check a structured payload.
    fn validate_data(&self, input: &Value, rules: &DataRules) -> ValidationOutcome<Value>;
}

/// Straightforward length, character-class and shape checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicGateway;

impl BasicGateway {
    fn char_allowed(c: char, allowed: AllowedCharacters) -> bool {
        match allowed {
            AllowedCharacters::Any => true,
            AllowedCharacters::Printable => !c.is_control(),
            AllowedCharacters::AlphanumericPunctuation => {
                c.is_alphanumeric() || c == ' ' || "-_.,!?'()#:&".contains(c)
            }
        }
    }
}

impl ValidationGateway for BasicGateway {
    fn sanitize_text(&self, input: &str, rules: &TextRules) -> ValidationOutcome<String> {
        let value = if rules.trim { input.trim() } else { input };
        let mut errors = Vec::new();
        let length = value.chars().count();

        if value.is_empty() {
            if rules.required {
                errors.push("value is required".to_string());
            }
        } else {
            if length < rules.min_length {
                errors.push(format!("must be at least {} characters", rules.min_length));
            }
            if length > rules.max_length {
                errors.push(format!("must be at most {} characters", rules.max_length));
            }
        }

        if let Some(bad) = value
            .chars()
            .find(|c| !Self::char_allowed(*c, rules.allowed_characters))
        {
            errors.push(format!("character {bad:?} is not allowed"));
        }

        ValidationOutcome {
            is_valid: errors.is_empty(),
            errors,
            sanitized_value: value.to_string(),
        }
    }

    fn validate_data(&self, input: &Value, rules: &DataRules) -> ValidationOutcome<Value> {
        let mut errors = Vec::new();

        if depth(input) > rules.max_depth {
            errors.push(format!("nesting deeper than {}", rules.max_depth));
        }
        match input.as_object() {
            Some(object) => {
                for key in &rules.required_keys {
                    if !object.contains_key(key) {
                        errors.push(format!("missing field '{key}'"));
                    }
                }
            }
            None => errors.push("expected a JSON object".to_string()),
        }

        ValidationOutcome {
            is_valid: errors.is_empty(),
            errors,
            sanitized_value: input.clone(),
        }
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        Value::Object(map) => 1 + map.values().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_trims_and_accepts() {
        let outcome = BasicGateway.sanitize_text("  Maya's first year  ", &TextRules::save_name(50));
        assert!(outcome.is_valid);
        assert_eq!(outcome.sanitized_value, "Maya's first year");
    }

    #[test]
    fn test_sanitize_rejects() {
        let rules = TextRules::save_name(10);
        assert!(!BasicGateway.sanitize_text("   ", &rules).is_valid);
        assert!(!BasicGateway.sanitize_text("far too long a name", &rules).is_valid);

        let outcome = BasicGateway.sanitize_text("<script>", &rules);
        assert!(!outcome.is_valid);
        assert!(outcome.into_result().unwrap_err().contains("not allowed"));
    }

    #[test]
    fn test_validate_data() {
        let rules = DataRules {
            max_depth: 3,
            required_keys: vec!["saveGame".to_string()],
        };

        assert!(BasicGateway.validate_data(&json!({ "saveGame": {} }), &rules).is_valid);
        assert!(!BasicGateway.validate_data(&json!({ "other": 1 }), &rules).is_valid);
        assert!(!BasicGateway.validate_data(&json!([1, 2]), &rules).is_valid);
        assert!(
            !BasicGateway
                .validate_data(&json!({ "saveGame": { "a": { "b": { "c": 1 } } } }), &rules)
                .is_valid
        );
    }
}
