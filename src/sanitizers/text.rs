//! text.rs - Pattern-based text sanitization primitives.
//!
//! These are the fixed building blocks the value pipeline composes: whitespace
//! collapsing, image/script/iframe/tag stripping, and the generic clean
//! routine driven by the secondary option flags. All patterns are compiled
//! once into shared statics.
//!
//! License: MIT

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::FieldOptions;

lazy_static! {
    static ref CONTROL_WHITESPACE: Regex = Regex::new(r"[\n\r\t]+").unwrap();
    static ref REDUNDANT_SPACES: Regex = Regex::new(r"\s{2,}").unwrap();
    static ref SPACE_BEFORE_GT: Regex = Regex::new(r"[\s]+>").unwrap();
    static ref LINKED_IMAGE: Regex =
        Regex::new(r#"(?i)(<a[^>]*>)(<img[^>]*alt="([^"]*)"[^>]*>)(</a>)"#).unwrap();
    static ref IMAGE_WITH_ALT: Regex =
        Regex::new(r#"(?i)(<img[^>]+alt="([^"]*)"[^>]*>)"#).unwrap();
    static ref IMAGE_TAG: Regex = Regex::new(r"(?i)<img[^>]*>").unwrap();
    static ref SCRIPT_BLOCKS: Regex = Regex::new(
        r#"(?is)(<link[^>]+rel="[^"]*stylesheet"[^>]*>|<style="[^"]*")|<script[^>]*>.*?</script>|<style[^>]*>.*?</style>|<!--.*?-->"#
    )
    .unwrap();
    static ref IFRAME_BLOCK: Regex = Regex::new(r"(?is)<iframe[^>]*>.*?</iframe>").unwrap();
    static ref IFRAME_OPEN: Regex = Regex::new(r"(?is)<iframe[^>]*>").unwrap();
    static ref PAIRED_TAGS: Regex = Regex::new(r"(?is)<[^>]*?>.*?</[^>]*?>").unwrap();
    static ref LONE_TAG: Regex = Regex::new(r"(?is)<[^>]*?>").unwrap();
    static ref ANY_TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref DOUBLE_ENCODED_ENTITY: Regex = Regex::new(r"(?s)&amp;#([0-9]+);").unwrap();
}

/// Collapses redundant whitespace: control whitespace is removed outright and
/// runs of two or more spaces become a single space.
pub fn strip_whitespace(value: &str) -> String {
    let value = CONTROL_WHITESPACE.replace_all(value, "");
    REDUNDANT_SPACES.replace_all(&value, " ").into_owned()
}

/// Collapses any whitespace immediately preceding a `>` down to a bare `>`.
/// Defangs malformed-tag evasions like `<script >` and `</script\t>`.
pub fn collapse_space_before_gt(value: &str) -> String {
    SPACE_BEFORE_GT.replace_all(value, ">").into_owned()
}

/// Removes image tags. A linked image keeps its link and alt text, an image
/// with alt text keeps the alt text; both gain a `<br />`. Bare images are
/// deleted.
pub fn strip_images(value: &str) -> String {
    let value = LINKED_IMAGE.replace_all(value, "${1}${3}${4}<br />");
    let value = IMAGE_WITH_ALT.replace_all(&value, "${2}<br />");
    IMAGE_TAG.replace_all(&value, "").into_owned()
}

/// Removes script blocks, style blocks, stylesheet links, quoted inline style
/// fragments, and HTML comments. Images are deliberately left alone; they
/// have their own flag.
pub fn strip_scripts_blocks(value: &str) -> String {
    SCRIPT_BLOCKS.replace_all(value, "").into_owned()
}

/// Removes iframe blocks, then any residual bare iframe open tags.
pub fn strip_iframes(value: &str) -> String {
    let value = IFRAME_BLOCK.replace_all(value, "");
    IFRAME_OPEN.replace_all(&value, "").into_owned()
}

/// Removes all remaining markup: paired tags go together with their content,
/// then any unpaired tags are deleted.
pub fn strip_tags(value: &str) -> String {
    let value = PAIRED_TAGS.replace_all(value, "");
    LONE_TAG.replace_all(&value, "").into_owned()
}

/// Entity-encodes the characters that matter for markup injection. With
/// `remove`, any tags still present are deleted first.
pub fn html_encode(value: &str, remove: bool) -> String {
    let value = if remove {
        ANY_TAG.replace_all(value, "").into_owned()
    } else {
        value.to_string()
    };
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Drops backslashes except those protecting an entity prefix.
fn drop_backslashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let chars: Vec<char> = value.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            let rest: String = chars[i + 1..].iter().take(7).collect();
            if rest.starts_with("&amp;#") || rest.starts_with("?#") {
                out.push('\\');
            }
        } else {
            out.push(chars[i]);
        }
        i += 1;
    }
    out
}

/// The generic clean routine, driven by the secondary flags of the option
/// set. Flag order is fixed: odd spaces, encoding, dollar, carriage returns,
/// double-encoded entities, quote escaping, backslashes.
pub fn clean(value: &str, options: &FieldOptions) -> String {
    let mut value = value.to_string();
    if options.odd_spaces {
        // stray 0xCA bytes show up as U+00CA or a non-breaking space
        value = value.replace('\u{00CA}', "").replace('\u{00A0}', " ");
    }
    if options.encode {
        value = html_encode(&value, options.remove_html);
    }
    if options.dollar {
        value = value.replace("\\$", "$");
    }
    if options.carriage {
        value = value.replace('\r', "");
    }
    if options.unicode {
        value = DOUBLE_ENCODED_ENTITY
            .replace_all(&value, "&#${1};")
            .into_owned();
    }
    if options.escape {
        value = value.replace('\'', "''");
    }
    if options.backslash {
        value = drop_backslashes(&value);
    }
    value
}
