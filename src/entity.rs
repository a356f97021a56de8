//! Entity descriptors and the association registry.
//!
//! An [`EntityDescriptor`] carries the metadata the pipeline reads about one
//! entity type: its alias, an optional primary-key field name, a column
//! schema, and its declared associations. Descriptors are looked up by alias
//! through an explicit [`EntityRegistry`] rather than any implicit
//! object-graph traversal; an alias with no descriptor is simply "not found".
//!
//! License: MIT

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::CleanableError;

/// The declared column types the policy resolver distinguishes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Blob,
    String,
    Date,
    Datetime,
    Integer,
    Float,
    Boolean,
}

impl ColumnType {
    /// True for the numeric column types that force zero-if-empty coercion.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

/// Schema metadata for one column. The pipeline reads only the declared type
/// and nullability; anything else a schema provider knows stays with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column accepts null. `None` when the schema does not say,
    /// in which case no nullability-based inference applies.
    #[serde(rename = "null", default)]
    pub nullable: Option<bool>,
}

impl ColumnSchema {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: None,
        }
    }

    pub fn nullable(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: Some(true),
        }
    }

    pub fn not_null(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: Some(false),
        }
    }
}

/// Association cardinality: one associated record or a list of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// A declared relationship from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// The alias the associated data is keyed by inside a record.
    pub alias: String,
    pub cardinality: Cardinality,
    /// The foreign-key field linking back to the owning entity.
    pub foreign_key: String,
    /// The alias of the associated entity's own descriptor.
    pub entity_alias: String,
    /// True for many-to-many join associations, which need their join-key
    /// array derived at reshape time.
    pub join: bool,
}

impl Association {
    /// A singular (has-one / belongs-to style) association.
    pub fn one(alias: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            entity_alias: alias.clone(),
            alias,
            cardinality: Cardinality::One,
            foreign_key: foreign_key.into(),
            join: false,
        }
    }

    /// A plural association without join-table semantics.
    pub fn many(alias: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            entity_alias: alias.clone(),
            alias,
            cardinality: Cardinality::Many,
            foreign_key: foreign_key.into(),
            join: false,
        }
    }

    /// A many-to-many join association (hasAndBelongsToMany style).
    pub fn join(alias: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            entity_alias: alias.clone(),
            alias,
            cardinality: Cardinality::Many,
            foreign_key: foreign_key.into(),
            join: true,
        }
    }

    /// Points the association at a descriptor registered under a different
    /// alias than the data key.
    pub fn of_entity(mut self, entity_alias: impl Into<String>) -> Self {
        self.entity_alias = entity_alias.into();
        self
    }
}

/// Everything the pipeline knows about one entity type. Immutable once a
/// record batch begins processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// The canonical name identifying this entity and its data bucket.
    pub alias: String,
    /// The primary-key field name, when the schema provider declares one.
    #[serde(default)]
    pub primary_key: Option<String>,
    /// Field name to column metadata.
    #[serde(default)]
    pub schema: BTreeMap<String, ColumnSchema>,
    /// Declared associations, in declaration order.
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl EntityDescriptor {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            primary_key: None,
            schema: BTreeMap::new(),
            associations: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = Some(field.into());
        self
    }

    pub fn with_column(mut self, field: impl Into<String>, column: ColumnSchema) -> Self {
        self.schema.insert(field.into(), column);
        self
    }

    pub fn with_association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Looks up a declared association by its data-key alias.
    pub fn association(&self, alias: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.alias == alias)
    }

    /// The declared join (many-to-many) associations.
    pub fn join_associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.iter().filter(|a| a.join)
    }
}

/// Alias-keyed store of entity descriptors.
///
/// Descriptors are expected to be registered during application
/// initialization and read thereafter; concurrent registration requires
/// external synchronization.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, EntityDescriptor>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its alias, replacing any previous one.
    pub fn register(&mut self, descriptor: EntityDescriptor) {
        self.entities.insert(descriptor.alias.clone(), descriptor);
    }

    /// Looks up a descriptor, or "not found".
    pub fn get(&self, alias: &str) -> Option<&EntityDescriptor> {
        self.entities.get(alias)
    }

    /// Looks up a descriptor that must exist; a missing descriptor is a
    /// caller contract violation and fails fast.
    pub fn expect(&self, alias: &str) -> Result<&EntityDescriptor, CleanableError> {
        self.entities
            .get(alias)
            .ok_or_else(|| CleanableError::UnknownEntity(alias.to_string()))
    }
}
