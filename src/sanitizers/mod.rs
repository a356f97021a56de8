//! Text-sanitization primitives used by the value pipeline.
//!
//! Everything in here is pattern-based text transformation, not DOM-aware
//! parsing; adversarial or malformed markup may not be fully neutralized.
//! That is a documented limitation of the contract, not a bug.
//!
//! License: MIT

pub mod text;

pub use text::{
    clean, collapse_space_before_gt, html_encode, strip_iframes, strip_images,
    strip_scripts_blocks, strip_tags, strip_whitespace,
};
