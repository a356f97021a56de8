//! Configuration management for `cleanable-core`.
//!
//! This module defines the per-field sanitization policy (`FieldOptions`), its
//! partial form used for layering (`OptionsPatch`), and the per-entity
//! configuration (`CleanConfig`) with its partial form (`ConfigPatch`).
//!
//! Configuration is layered: built-in defaults, then the configuration
//! registered for an entity alias, then an entity-instance patch, then a
//! per-call patch. Each layer is shallow-merged key by key, except
//! `clean_default`, which is merged flag by flag into the effective default
//! option set.
//!
//! License: MIT

use std::collections::BTreeMap;

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::entity::ColumnType;
use crate::errors::CleanableError;

/// The full set of sanitization policy flags applied to one field's value.
///
/// Field names follow the configuration key names: behavior-level flags are
/// camelCase, the secondary flags passed through to the generic clean routine
/// keep their historical snake_case spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldOptions {
    /// Skip every transformation for this field.
    pub ignore: bool,
    /// Strip every character that is not a digit or minus sign.
    pub numbers_only: bool,
    /// Strip every character that is not a digit, minus sign, or period.
    pub numbers_and_period_only: bool,
    /// Coerce an empty value to null. Does not fire for the literal string
    /// `"0"`, numeric zero, or `false`.
    pub null_if_empty: bool,
    /// Coerce an empty value to 0. Autoset for non-nullable integer/float
    /// columns.
    pub zero_if_empty: bool,
    /// Coerce an empty value to `""`. Autoset when the column is not nullable.
    pub empty_string_if_null: bool,
    /// Collapse redundant whitespace.
    pub strip_whitespace: bool,
    /// Remove script/style blocks, stylesheet links, quoted inline style
    /// fragments, and HTML comments.
    pub strip_scripts: bool,
    /// Remove iframe blocks and bare iframe open tags.
    pub strip_iframes: bool,
    /// Remove image tags, keeping alt text where present.
    pub strip_images: bool,
    /// Remove all remaining tags.
    pub strip_html: bool,
    /// Run the generic clean routine with the secondary flags below.
    pub clean: bool,
    #[serde(rename = "odd_spaces")]
    pub odd_spaces: bool,
    pub dollar: bool,
    pub carriage: bool,
    pub unicode: bool,
    pub escape: bool,
    pub backslash: bool,
    /// Entity-encode the value. Independent of `strip_html`; too destructive
    /// to enable by default.
    pub encode: bool,
    #[serde(rename = "remove_html")]
    pub remove_html: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            ignore: false,
            numbers_only: false,
            numbers_and_period_only: false,
            null_if_empty: false,
            zero_if_empty: false,
            empty_string_if_null: false,
            strip_whitespace: true,
            strip_scripts: true,
            strip_iframes: true,
            strip_images: true,
            strip_html: true,
            clean: true,
            odd_spaces: true,
            dollar: false,
            carriage: false,
            unicode: true,
            escape: false,
            backslash: false,
            encode: false,
            remove_html: false,
        }
    }
}

/// A partial [`FieldOptions`]: only the flags present in a configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsPatch {
    pub ignore: Option<bool>,
    pub numbers_only: Option<bool>,
    pub numbers_and_period_only: Option<bool>,
    pub null_if_empty: Option<bool>,
    pub zero_if_empty: Option<bool>,
    pub empty_string_if_null: Option<bool>,
    pub strip_whitespace: Option<bool>,
    pub strip_scripts: Option<bool>,
    pub strip_iframes: Option<bool>,
    pub strip_images: Option<bool>,
    pub strip_html: Option<bool>,
    pub clean: Option<bool>,
    #[serde(rename = "odd_spaces")]
    pub odd_spaces: Option<bool>,
    pub dollar: Option<bool>,
    pub carriage: Option<bool>,
    pub unicode: Option<bool>,
    pub escape: Option<bool>,
    pub backslash: Option<bool>,
    pub encode: Option<bool>,
    #[serde(rename = "remove_html")]
    pub remove_html: Option<bool>,
}

macro_rules! apply_flag {
    ($target:expr, $patch:expr, $($flag:ident),+ $(,)?) => {
        $(
            if let Some(v) = $patch.$flag {
                $target.$flag = v;
            }
        )+
    };
}

impl FieldOptions {
    /// Shallow-merges a patch over these options; present flags win.
    pub fn apply(&mut self, patch: &OptionsPatch) {
        apply_flag!(
            self, patch,
            ignore, numbers_only, numbers_and_period_only,
            null_if_empty, zero_if_empty, empty_string_if_null,
            strip_whitespace, strip_scripts, strip_iframes, strip_images,
            strip_html, clean, odd_spaces, dollar, carriage, unicode,
            escape, backslash, encode, remove_html,
        );
    }

    /// Returns a copy with the patch applied.
    pub fn patched(&self, patch: &OptionsPatch) -> Self {
        let mut out = self.clone();
        out.apply(patch);
        out
    }
}

impl OptionsPatch {
    /// A patch with a single flag set, convenient for programmatic layering.
    pub fn flag(name: &str, value: bool) -> Self {
        let mut patch = Self::default();
        match name {
            "ignore" => patch.ignore = Some(value),
            "numbersOnly" => patch.numbers_only = Some(value),
            "numbersAndPeriodOnly" => patch.numbers_and_period_only = Some(value),
            "nullIfEmpty" => patch.null_if_empty = Some(value),
            "zeroIfEmpty" => patch.zero_if_empty = Some(value),
            "emptyStringIfNull" => patch.empty_string_if_null = Some(value),
            "stripWhitespace" => patch.strip_whitespace = Some(value),
            "stripScripts" => patch.strip_scripts = Some(value),
            "stripIframes" => patch.strip_iframes = Some(value),
            "stripImages" => patch.strip_images = Some(value),
            "stripHtml" => patch.strip_html = Some(value),
            "clean" => patch.clean = Some(value),
            "odd_spaces" => patch.odd_spaces = Some(value),
            "dollar" => patch.dollar = Some(value),
            "carriage" => patch.carriage = Some(value),
            "unicode" => patch.unicode = Some(value),
            "escape" => patch.escape = Some(value),
            "backslash" => patch.backslash = Some(value),
            "encode" => patch.encode = Some(value),
            "remove_html" => patch.remove_html = Some(value),
            _ => {}
        }
        patch
    }
}

/// The effective per-entity configuration: pipeline toggles, the default
/// option set, and the type-based and field-based override layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanConfig {
    /// Run the recursive value-sanitization step.
    pub do_clean: bool,
    /// Run the record-reshaping step.
    pub do_format: bool,
    /// The baseline option set every field starts from.
    #[serde(rename = "clean_default")]
    pub clean_default: FieldOptions,
    /// Per-column-type option patches (`clean_<type>` in the original keying).
    pub types: BTreeMap<ColumnType, OptionsPatch>,
    /// Per-field-name option patches; highest-priority layer.
    pub fields: BTreeMap<String, OptionsPatch>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        BUILTIN_DEFAULTS.clone()
    }
}

/// The built-in defaults every registered configuration starts from.
///
/// Text-like columns keep their markup, date columns null out when empty, and
/// numeric columns are restricted to digit characters and zero out when empty.
static BUILTIN_DEFAULTS: Lazy<CleanConfig> = Lazy::new(|| {
    let mut types = BTreeMap::new();
    let keep_markup = OptionsPatch {
        strip_images: Some(false),
        strip_html: Some(false),
        ..Default::default()
    };
    types.insert(ColumnType::Text, keep_markup.clone());
    types.insert(ColumnType::Blob, keep_markup.clone());
    types.insert(ColumnType::String, OptionsPatch::default());
    types.insert(ColumnType::Date, OptionsPatch::flag("nullIfEmpty", true));
    types.insert(ColumnType::Datetime, OptionsPatch::flag("nullIfEmpty", true));
    types.insert(
        ColumnType::Integer,
        OptionsPatch {
            numbers_only: Some(true),
            zero_if_empty: Some(true),
            ..Default::default()
        },
    );
    types.insert(
        ColumnType::Float,
        OptionsPatch {
            numbers_and_period_only: Some(true),
            zero_if_empty: Some(true),
            ..Default::default()
        },
    );
    types.insert(ColumnType::Boolean, OptionsPatch::flag("zeroIfEmpty", true));

    let mut fields = BTreeMap::new();
    fields.insert("id".to_string(), OptionsPatch::default());
    fields.insert("html".to_string(), keep_markup.clone());
    fields.insert("body".to_string(), keep_markup);

    CleanConfig {
        do_clean: true,
        do_format: true,
        clean_default: FieldOptions::default(),
        types,
        fields,
    }
});

impl CleanConfig {
    /// Applies a partial configuration over this one.
    ///
    /// `doClean`/`doFormat` are replaced when present, `clean_default` is
    /// merged flag by flag, and each type or field override entry replaces the
    /// existing entry for that key wholesale.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(do_clean) = patch.do_clean {
            self.do_clean = do_clean;
        }
        if let Some(do_format) = patch.do_format {
            self.do_format = do_format;
        }
        if let Some(defaults) = &patch.clean_default {
            self.clean_default.apply(defaults);
        }
        for (column_type, options) in &patch.types {
            self.types.insert(*column_type, options.clone());
        }
        for (field, options) in &patch.fields {
            self.fields.insert(field.clone(), options.clone());
        }
    }

    /// Returns a copy with the patch applied.
    pub fn patched(&self, patch: &ConfigPatch) -> Self {
        let mut out = self.clone();
        out.apply(patch);
        out
    }
}

/// A partial [`CleanConfig`], as supplied at registration time, on an entity
/// instance, or on an individual clean call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPatch {
    pub do_clean: Option<bool>,
    pub do_format: Option<bool>,
    #[serde(rename = "clean_default")]
    pub clean_default: Option<OptionsPatch>,
    pub types: BTreeMap<ColumnType, OptionsPatch>,
    pub fields: BTreeMap<String, OptionsPatch>,
}

impl ConfigPatch {
    /// Parses a configuration patch from a YAML string.
    ///
    /// Configuration is supplied programmatically; this is a convenience for
    /// callers that keep their entity configuration as embedded YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, CleanableError> {
        let patch: ConfigPatch = serde_yml::from_str(text)
            .map_err(|e| CleanableError::ConfigParseError(e.to_string()))?;
        debug!(
            "Parsed config patch: {} type override(s), {} field override(s)",
            patch.types.len(),
            patch.fields.len()
        );
        Ok(patch)
    }

    /// A patch that disables both pipeline stages, the per-entity opt-out.
    pub fn disabled() -> Self {
        Self {
            do_clean: Some(false),
            do_format: Some(false),
            ..Default::default()
        }
    }
}
