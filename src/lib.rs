//! # Cleanable Core Library
//!
//! `cleanable-core` is a data-cleaning and data-reshaping pass applied to
//! structured input records before persistence. It normalizes nested record
//! graphs into a canonical parent/association shape, then sanitizes every
//! scalar leaf value against a per-field policy: strip HTML, scripts,
//! iframes, and images, collapse whitespace, coerce emptiness to
//! null/zero/empty string, or restrict values to numeric characters.
//!
//! The library is pure and synchronous: apart from the explicit registries a
//! caller populates at initialization time, every operation is a
//! deterministic in-memory transform of its inputs, with no I/O and no
//! hidden global state.
//!
//! ## Modules
//!
//! * `config`: per-field option sets and the layered per-entity configuration.
//! * `registry`: the alias-keyed store of merged configurations.
//! * `entity`: entity descriptors, column schemas, and association metadata.
//! * `policy`: resolution of the effective options for one field.
//! * `value`: the recursive value-sanitization pipeline.
//! * `reshape`: structural normalization of raw records.
//! * `engine`: the orchestrating pipeline and the persistence hook seam.
//! * `sanitizers`: the pattern-based text-sanitization primitives.
//!
//! ## Usage Example
//!
//! ```rust
//! use cleanable_core::{
//!     Association, CleanEngine, ColumnSchema, ColumnType, ConfigPatch,
//!     ConfigRegistry, EntityDescriptor, EntityRegistry,
//! };
//! use serde_json::json;
//!
//! fn main() -> Result<(), cleanable_core::CleanableError> {
//!     // 1. Describe the entity and register it.
//!     let mut entities = EntityRegistry::new();
//!     entities.register(
//!         EntityDescriptor::new("Post")
//!             .with_column("title", ColumnSchema::not_null(ColumnType::String))
//!             .with_column("body", ColumnSchema::nullable(ColumnType::Text))
//!             .with_association(Association::join("Tag", "tag_id")),
//!     );
//!
//!     // 2. Register its configuration (built-in defaults plus a patch).
//!     let mut configs = ConfigRegistry::new();
//!     configs.register("Post", &ConfigPatch::default());
//!
//!     // 3. Clean a submitted record.
//!     let engine = CleanEngine::new(configs, entities);
//!     let cleaned = engine.clean(
//!         "Post",
//!         json!({"title": "hello<script>alert(1)</script> world"}),
//!         None,
//!         None,
//!     )?;
//!     assert_eq!(cleaned, json!({"Post": {"title": "hello world"}}));
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! The pipeline is total: absent configuration falls back to built-in
//! defaults, absent schema or association metadata degrades to generic field
//! handling, and unexpected value types pass through untouched. The only
//! errors surfaced are caller contract violations, such as cleaning against
//! an alias with no registered entity descriptor.
//!
//! ## Limitations
//!
//! Sanitization is pattern-based text transformation, not DOM-aware parsing;
//! pathological or malformed markup may not be fully neutralized. Numeric
//! record keys (list entries from plural association data) are skipped by
//! the clean walk. Records are assumed to be finite, acyclic trees of
//! bounded depth.
//!
//! License: MIT

pub mod config;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod policy;
pub mod registry;
pub mod reshape;
pub mod sanitizers;
pub mod value;

/// Re-exports the configuration types and layering primitives.
pub use config::{CleanConfig, ConfigPatch, FieldOptions, OptionsPatch};

/// Re-exports the custom error type for clear error reporting.
pub use errors::CleanableError;

/// Re-exports entity metadata types and the association registry.
pub use entity::{
    Association, Cardinality, ColumnSchema, ColumnType, EntityDescriptor, EntityRegistry,
};

/// Re-exports the per-alias configuration store.
pub use registry::ConfigRegistry;

/// Re-exports the policy resolver.
pub use policy::determine_options;

/// Re-exports the recursive value sanitizer.
pub use value::{is_empty_value, sanitize_value};

/// Re-exports the reshape operation.
pub use reshape::reshape;

/// Re-exports the orchestrating engine and the persistence hook seam.
pub use engine::{CleanEngine, PersistenceHook};
