//! Listing submission rules, checked before anything is persisted or generated.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::listing::{PropertyType, Tone};

const MAX_TEXT_LEN: usize = 255;
pub const DEFAULT_OPTION_COUNT: usize = 1;
pub const MAX_OPTION_COUNT: usize = 5;

/// Raw submission body. Every field is optional here so missing values produce
/// the field-specific messages below instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateListingRequest {
    pub title: Option<String>,
    pub property_type: Option<String>,
    pub location: Option<String>,
    /// A JSON number or a numeric string.
    pub price: Option<Value>,
    pub key_features: Option<String>,
    pub tone: Option<String>,
    /// Number of description options to generate.
    pub options: Option<Value>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub property_type: PropertyType,
    pub location: String,
    pub price: f64,
    pub key_features: String,
    pub tone: Tone,
}

impl CreateListingRequest {
    /// Validates every field and reports all failures at once.
    pub fn validate(self) -> Result<(NewListing, usize), AppError> {
        let mut errors: Vec<String> = Vec::new();

        let title = required_text(self.title, "Property title is required.", "title", &mut errors);
        let location = required_text(
            self.location,
            "Property location is required.",
            "location",
            &mut errors,
        );

        let property_type = match self.property_type.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Please select a property type.".to_string());
                None
            }
            Some(raw) => parse_property_type(raw).or_else(|| {
                errors.push("The property type must be one of House, Flat, Land, Commercial.".to_string());
                None
            }),
        };

        let price = match self.price {
            None | Some(Value::Null) => {
                errors.push("Price is required.".to_string());
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                errors.push("Price is required.".to_string());
                None
            }
            Some(raw) => match numeric(&raw) {
                None => {
                    errors.push("The price must be a number.".to_string());
                    None
                }
                Some(p) if !p.is_finite() || p < 0.0 => {
                    errors.push("The price must be at least 0.".to_string());
                    None
                }
                Some(p) => Some(p),
            },
        };

        let key_features = match self.key_features {
            Some(k) if !k.trim().is_empty() => Some(k),
            _ => {
                errors.push("Key features are required.".to_string());
                None
            }
        };

        let tone = match self.tone.as_deref().map(str::trim) {
            None | Some("") => Some(Tone::default()),
            Some(raw) => parse_tone(raw).or_else(|| {
                errors.push("The tone must be either Formal or Casual.".to_string());
                None
            }),
        };

        let option_count = match parse_option_count(self.options.as_ref()) {
            Ok(n) => Some(n),
            Err(message) => {
                errors.push(message);
                None
            }
        };

        match (title, property_type, location, price, key_features, tone, option_count) {
            (
                Some(title),
                Some(property_type),
                Some(location),
                Some(price),
                Some(key_features),
                Some(tone),
                Some(option_count),
            ) if errors.is_empty() => Ok((
                NewListing {
                    title,
                    property_type,
                    location,
                    price,
                    key_features,
                    tone,
                },
                option_count,
            )),
            _ => Err(AppError::Validation(errors.join(" "))),
        }
    }
}

/// `None` → default of one option; otherwise must be within 1..=MAX_OPTION_COUNT.
pub fn validate_option_count(options: Option<usize>) -> Result<usize, String> {
    match options.unwrap_or(DEFAULT_OPTION_COUNT) {
        n @ 1..=MAX_OPTION_COUNT => Ok(n),
        _ => Err(option_count_message()),
    }
}

/// Body form of the option count: a whole number, given as a JSON number or string.
fn parse_option_count(options: Option<&Value>) -> Result<usize, String> {
    let count = match options {
        None | Some(Value::Null) => None,
        Some(raw) => Some(whole_number(raw).ok_or_else(option_count_message)?),
    };
    validate_option_count(count)
}

fn option_count_message() -> String {
    format!("The number of options must be between 1 and {MAX_OPTION_COUNT}.")
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn whole_number(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_text(
    value: Option<String>,
    missing_message: &str,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match value {
        Some(v) if v.trim().is_empty() => {
            errors.push(missing_message.to_string());
            None
        }
        Some(v) if v.chars().count() > MAX_TEXT_LEN => {
            errors.push(format!(
                "The {field} may not be greater than {MAX_TEXT_LEN} characters."
            ));
            None
        }
        Some(v) => Some(v),
        None => {
            errors.push(missing_message.to_string());
            None
        }
    }
}

fn parse_property_type(raw: &str) -> Option<PropertyType> {
    match raw {
        "House" => Some(PropertyType::House),
        "Flat" => Some(PropertyType::Flat),
        "Land" => Some(PropertyType::Land),
        "Commercial" => Some(PropertyType::Commercial),
        _ => None,
    }
}

fn parse_tone(raw: &str) -> Option<Tone> {
    match raw {
        "Formal" => Some(Tone::Formal),
        "Casual" => Some(Tone::Casual),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_request() -> CreateListingRequest {
        CreateListingRequest {
            title: Some("My House".to_string()),
            property_type: Some("House".to_string()),
            location: Some("Lagos".to_string()),
            price: Some(json!(2_500_000.0)),
            key_features: Some("Spacious, Modern".to_string()),
            tone: Some("Formal".to_string()),
            options: None,
        }
    }

    fn validation_message(req: CreateListingRequest) -> String {
        match req.validate() {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_passes_with_default_option_count() {
        let (listing, options) = valid_request().validate().unwrap();
        assert_eq!(listing.property_type, PropertyType::House);
        assert_eq!(listing.tone, Tone::Formal);
        assert_eq!(options, 1);
    }

    #[test]
    fn test_missing_tone_defaults_to_formal() {
        let mut req = valid_request();
        req.tone = None;
        assert_eq!(req.validate().unwrap().0.tone, Tone::Formal);
    }

    #[test]
    fn test_empty_request_reports_every_required_field() {
        let msg = validation_message(CreateListingRequest::default());
        for expected in [
            "Property title is required.",
            "Please select a property type.",
            "Property location is required.",
            "Price is required.",
            "Key features are required.",
        ] {
            assert!(msg.contains(expected), "missing '{expected}' in '{msg}'");
        }
    }

    #[test]
    fn test_unknown_property_type_rejected() {
        let mut req = valid_request();
        req.property_type = Some("Apartment".to_string());
        assert!(validation_message(req).contains("House, Flat, Land, Commercial"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut req = valid_request();
        req.price = Some(json!(-1.0));
        assert!(validation_message(req).contains("at least 0"));
    }

    #[test]
    fn test_zero_price_allowed() {
        let mut req = valid_request();
        req.price = Some(json!(0));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_overlong_title_rejected() {
        let mut req = valid_request();
        req.title = Some("x".repeat(256));
        assert!(validation_message(req).contains("title may not be greater than 255"));
    }

    #[test]
    fn test_unknown_tone_rejected() {
        let mut req = valid_request();
        req.tone = Some("Playful".to_string());
        assert!(validation_message(req).contains("Formal or Casual"));
    }

    #[test]
    fn test_option_count_bounds() {
        assert_eq!(validate_option_count(None), Ok(1));
        assert_eq!(validate_option_count(Some(5)), Ok(5));
        assert!(validate_option_count(Some(0)).is_err());
        assert!(validate_option_count(Some(6)).is_err());
    }

    #[test]
    fn test_numeric_string_price_accepted() {
        let mut req = valid_request();
        req.price = Some(json!(" 2500000.50 "));
        assert_eq!(req.validate().unwrap().0.price, 2_500_000.5);
    }

    #[test]
    fn test_non_numeric_price_rejected() {
        let mut req = valid_request();
        req.price = Some(json!("two million"));
        assert!(validation_message(req).contains("The price must be a number."));

        let mut req = valid_request();
        req.price = Some(json!(["1"]));
        assert!(validation_message(req).contains("The price must be a number."));
    }

    #[test]
    fn test_blank_price_is_missing() {
        let mut req = valid_request();
        req.price = Some(json!("  "));
        assert!(validation_message(req).contains("Price is required."));
    }

    #[test]
    fn test_body_option_count_must_be_whole_and_in_range() {
        assert_eq!(parse_option_count(None), Ok(1));
        assert_eq!(parse_option_count(Some(&json!(null))), Ok(1));
        assert_eq!(parse_option_count(Some(&json!(3))), Ok(3));
        assert_eq!(parse_option_count(Some(&json!("4"))), Ok(4));
        for bad in [json!(-1), json!(2.5), json!("many"), json!(true), json!(9)] {
            assert_eq!(
                parse_option_count(Some(&bad)),
                Err("The number of options must be between 1 and 5.".to_string()),
                "{bad}"
            );
        }
    }
}
