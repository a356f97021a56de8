//! value.rs - Recursive, policy-driven sanitization of a single value.
//!
//! [`sanitize_value`] is the leaf transform of the pipeline: given a value and
//! its resolved [`FieldOptions`], it applies an ordered series of steps.
//! Digit restriction runs first, then emptiness coercion, then the text
//! pipeline; containers recurse into every key and value. The step order is
//! part of the contract and interacts in subtle ways (the digit regex runs
//! before the emptiness check; emptiness coercion short-circuits the text
//! steps entirely).
//!
//! Every step is total. Non-string scalars that reach the text stage are
//! passed through untouched instead.
//!
//! License: MIT

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::config::FieldOptions;
use crate::sanitizers;

lazy_static! {
    static ref NON_NUMBER: Regex = Regex::new(r"[^0-9\-]").unwrap();
    static ref NON_NUMBER_PERIOD: Regex = Regex::new(r"[^0-9\-.]").unwrap();
}

/// Sentinel protecting literal `+` characters across URL-decoding. Form
/// encoding treats `+` as an encoded space, but a `+` already present in the
/// submitted text must survive the decode round-trip.
const PLUS_SENTINEL: &str = "[|#|#plus#|#|]";

/// The host notion of an empty value: empty string, the string `"0"`, null,
/// false, numeric zero, or an empty container.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => {
            n.as_f64().map(|f| f == 0.0).unwrap_or(false)
        }
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Literal values excluded from null/empty-string coercion: the string `"0"`,
/// numeric zero, and `false` are empty but must not be discarded.
fn is_preserved_literal(value: &Value) -> bool {
    match value {
        Value::Bool(false) => true,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s == "0",
        _ => false,
    }
}

/// Applies the digit-restriction policies to string values. Non-strings pass
/// through; a number is already pure digits as far as the policy cares.
fn apply_number_policy(value: &Value, options: &FieldOptions) -> Value {
    if let Value::String(s) = value {
        if options.numbers_only {
            return Value::String(NON_NUMBER.replace_all(s, "").into_owned());
        }
        if options.numbers_and_period_only {
            return Value::String(NON_NUMBER_PERIOD.replace_all(s, "").into_owned());
        }
    }
    value.clone()
}

/// Sanitizes one value under the given options.
///
/// Recurses into arrays and objects without a depth limit; records are
/// assumed to be the acyclic, bounded trees realistic form submissions
/// produce.
pub fn sanitize_value(value: &Value, options: &FieldOptions) -> Value {
    if options.ignore {
        return value.clone();
    }

    let value = apply_number_policy(value, options);

    if is_empty_value(&value) {
        if options.null_if_empty && !is_preserved_literal(&value) {
            return Value::Null;
        } else if options.zero_if_empty {
            return Value::from(0);
        } else if options.empty_string_if_null && !is_preserved_literal(&value) {
            return Value::String(String::new());
        }
        return value;
    }

    // numeric-policy fields and non-string scalars skip the text pipeline
    if matches!(value, Value::Number(_) | Value::Bool(_))
        || options.numbers_only
        || options.numbers_and_period_only
    {
        return value;
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_value(item, options))
                .collect(),
        ),
        Value::Object(entries) => {
            let mut out = Map::new();
            for (key, val) in entries.iter() {
                let key = sanitize_key(key, options);
                out.insert(key, sanitize_value(val, options));
            }
            Value::Object(out)
        }
        Value::String(text) => Value::String(sanitize_text(&text, options)),
        other => other,
    }
}

/// Sanitizes an object key. Keys stay strings; a coercion result that is not
/// a string collapses back to its string form.
pub fn sanitize_key(key: &str, options: &FieldOptions) -> String {
    match sanitize_value(&Value::String(key.to_string()), options) {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The ordered text pipeline of the sanitizer.
fn sanitize_text(text: &str, options: &FieldOptions) -> String {
    let protected = text.replace('+', PLUS_SENTINEL);
    let decoded = url_decode(protected.trim());
    let mut value = decoded.trim().replace(PLUS_SENTINEL, "+");

    value = sanitizers::collapse_space_before_gt(&value);
    if options.strip_whitespace {
        value = sanitizers::strip_whitespace(&value);
    }
    if options.strip_scripts {
        value = sanitizers::strip_scripts_blocks(&value);
    }
    if options.strip_iframes {
        value = sanitizers::strip_iframes(&value);
    }
    if options.strip_images {
        value = sanitizers::strip_images(&value);
    }
    if options.strip_html {
        value = sanitizers::strip_tags(&value);
    }
    if options.clean {
        value = sanitizers::clean(&value, options);
    }
    value
}

/// Percent-decodes a string, tolerating invalid sequences by lossy UTF-8
/// conversion. Literal `+` never reaches this point; see [`PLUS_SENTINEL`].
fn url_decode(text: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(text.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> FieldOptions {
        FieldOptions::default()
    }

    #[test]
    fn ignore_short_circuits_everything() {
        let options = FieldOptions {
            ignore: true,
            ..defaults()
        };
        let input = json!("<script>alert(1)</script>");
        assert_eq!(sanitize_value(&input, &options), input);
    }

    #[test]
    fn numbers_only_strips_non_digits_but_keeps_minus() {
        let options = FieldOptions {
            numbers_only: true,
            ..defaults()
        };
        assert_eq!(
            sanitize_value(&json!("a-1b2c3"), &options),
            json!("-123")
        );
    }

    #[test]
    fn numbers_and_period_keeps_decimal_point() {
        let options = FieldOptions {
            numbers_and_period_only: true,
            ..defaults()
        };
        assert_eq!(
            sanitize_value(&json!("$ -12.50 usd"), &options),
            json!("-12.50")
        );
    }

    #[test]
    fn digit_policy_runs_before_emptiness_check() {
        // after stripping, nothing is left, and the coercion still fires
        let options = FieldOptions {
            numbers_only: true,
            zero_if_empty: true,
            ..defaults()
        };
        assert_eq!(sanitize_value(&json!("abc"), &options), json!(0));
    }

    #[test]
    fn null_wins_over_zero_wins_over_empty_string() {
        let both = FieldOptions {
            null_if_empty: true,
            zero_if_empty: true,
            ..defaults()
        };
        assert_eq!(sanitize_value(&json!(""), &both), Value::Null);

        let zero = FieldOptions {
            zero_if_empty: true,
            ..defaults()
        };
        assert_eq!(sanitize_value(&json!(""), &zero), json!(0));

        let empty_string = FieldOptions {
            empty_string_if_null: true,
            ..defaults()
        };
        assert_eq!(sanitize_value(&Value::Null, &empty_string), json!(""));
    }

    #[test]
    fn zero_literals_survive_null_coercion() {
        let options = FieldOptions {
            null_if_empty: true,
            ..defaults()
        };
        assert_eq!(sanitize_value(&json!("0"), &options), json!("0"));
        assert_eq!(sanitize_value(&json!(false), &options), json!(false));
        assert_eq!(sanitize_value(&json!(0), &options), json!(0));
    }

    #[test]
    fn zero_literal_survives_empty_string_coercion() {
        let options = FieldOptions {
            empty_string_if_null: true,
            ..defaults()
        };
        assert_eq!(sanitize_value(&json!("0"), &options), json!("0"));
    }

    #[test]
    fn numbers_pass_through_untouched() {
        assert_eq!(sanitize_value(&json!(42), &defaults()), json!(42));
        assert_eq!(sanitize_value(&json!(4.5), &defaults()), json!(4.5));
        assert_eq!(sanitize_value(&json!(true), &defaults()), json!(true));
    }

    #[test]
    fn containers_recurse_into_keys_and_values() {
        let input = json!({"ti tle": ["<b>x</b>", "plain"]});
        let options = FieldOptions {
            clean: false,
            ..defaults()
        };
        let out = sanitize_value(&input, &options);
        assert_eq!(out, json!({"ti tle": ["", "plain"]}));
    }

    #[test]
    fn literal_plus_survives_url_decode() {
        let out = sanitize_value(&json!("a+b %2B c"), &defaults());
        assert_eq!(out, json!("a+b + c"));
    }

    #[test]
    fn strip_html_is_idempotent() {
        let input = json!(r#"good<a href="">link</a><b>bold</b>stuff"#);
        let once = sanitize_value(&input, &defaults());
        let twice = sanitize_value(&once, &defaults());
        assert_eq!(once, twice);
        assert_eq!(once, json!("goodstuff"));
    }
}
