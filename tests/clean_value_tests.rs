// tests/clean_value_tests.rs
//
// Contract cases for the value-sanitization pipeline: the concrete
// script/iframe/image stripping inputs, URL-encoded payloads, emptiness
// coercion priority, and the encode flag's legacy entity spelling.

use cleanable_core::{sanitize_value, FieldOptions};
use serde_json::{json, Value};

const HOSTILE_MARKUP: &str = "good<a href=\"\">link</a><img src=\"/blank.gif\"/><img>\
<script src=\"/script.js\"></script><script>alert(\"yo\");</script>\
<SCriPT >alert(\"yo\");</scRIpt\t><IFraME>stuff";

fn defaults() -> FieldOptions {
    FieldOptions::default()
}

#[test]
fn full_strip_reduces_hostile_markup_to_text() {
    let out = sanitize_value(&json!(HOSTILE_MARKUP), &defaults());
    assert_eq!(out, json!("goodstuff"));
}

#[test]
fn partial_strip_keeps_plain_links() {
    let options = FieldOptions {
        strip_html: false,
        ..defaults()
    };
    let out = sanitize_value(&json!(HOSTILE_MARKUP), &options);
    assert_eq!(out, json!("good<a href=\"\">link</a>stuff"));
}

#[test]
fn url_encoded_script_payload_is_neutralized() {
    let out = sanitize_value(
        &json!("good%3Cscript%3Ealert(1)%3C/script%3Estuff"),
        &defaults(),
    );
    assert_eq!(out, json!("goodstuff"));
}

#[test]
fn url_encoded_mixed_case_payload_decodes_then_strips() {
    // decodes to two spaced-out script blocks, a fragment of quote characters,
    // and a bare iframe open tag
    let bad = "good%3CScRipT%20%3Ealert%28%27test%27%29%3B%3C%2FScRipT%20%3E\
%3CScRipT%20%3Ealert%28%27test%27%29%3B%3C%2FScRipT%20%3E\
%22%3E%27%3E%3CIfRaME%3Estuff";
    let out = sanitize_value(&json!(bad), &defaults());
    assert_eq!(out, json!("good\">'>stuff"));

    // the leftover quote fragment is not markup, so it survives with the
    // clean routine disabled or enabled
    let options = FieldOptions {
        strip_html: false,
        clean: false,
        ..defaults()
    };
    assert_eq!(sanitize_value(&json!(bad), &options), json!("good\">'>stuff"));
}

#[test]
fn encode_flag_entity_encodes_the_leftovers() {
    let bad = "good%22%3E%27%3E%3CIfRaME%3Estuff";
    let options = FieldOptions {
        strip_html: false,
        encode: true,
        ..defaults()
    };
    let out = sanitize_value(&json!(bad), &options);
    assert_eq!(out, json!("good&quot;&gt;&#039;&gt;stuff"));
}

#[test]
fn strip_html_is_idempotent_over_the_pipeline() {
    let once = sanitize_value(&json!(HOSTILE_MARKUP), &defaults());
    let twice = sanitize_value(&once, &defaults());
    assert_eq!(once, twice);
}

#[test]
fn literal_plus_survives_in_place() {
    let out = sanitize_value(&json!("1+1 stays 2"), &defaults());
    assert_eq!(out, json!("1+1 stays 2"));
}

#[test]
fn emptiness_priority_null_over_zero_over_empty_string() {
    let null_and_zero = FieldOptions {
        null_if_empty: true,
        zero_if_empty: true,
        ..defaults()
    };
    assert_eq!(sanitize_value(&json!(""), &null_and_zero), Value::Null);

    let zero_only = FieldOptions {
        zero_if_empty: true,
        ..defaults()
    };
    assert_eq!(sanitize_value(&json!(""), &zero_only), json!(0));

    let empty_string_only = FieldOptions {
        empty_string_if_null: true,
        ..defaults()
    };
    assert_eq!(sanitize_value(&Value::Null, &empty_string_only), json!(""));
}

#[test]
fn numeric_literals_are_not_nulled() {
    let options = FieldOptions {
        null_if_empty: true,
        ..defaults()
    };
    assert_eq!(sanitize_value(&json!("0"), &options), json!("0"));
    assert_eq!(sanitize_value(&json!(false), &options), json!(false));
}

#[test]
fn nested_containers_are_cleaned_recursively() {
    let input = json!({
        "outer": {
            "inner": ["<script>x</script>safe", {"deep": "<iframe>gone</iframe>kept"}]
        }
    });
    let out = sanitize_value(&input, &defaults());
    assert_eq!(
        out,
        json!({"outer": {"inner": ["safe", {"deep": "kept"}]}})
    );
}
