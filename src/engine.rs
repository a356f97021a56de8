//! engine.rs - The clean pipeline: reshape, then recursive value cleaning.
//!
//! [`CleanEngine`] binds a [`ConfigRegistry`] and an [`EntityRegistry`] and
//! runs the two-stage pipeline over a record: structural normalization
//! (format) followed by policy-driven sanitization of every field of every
//! nested sub-record (clean). It is wired into the host's persistence flow
//! through the [`PersistenceHook`] trait and must run synchronously to
//! completion before a record is committed.
//!
//! License: MIT

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::config::{CleanConfig, ConfigPatch};
use crate::entity::{EntityDescriptor, EntityRegistry};
use crate::errors::CleanableError;
use crate::policy::determine_options;
use crate::registry::ConfigRegistry;
use crate::reshape;
use crate::value::{sanitize_key, sanitize_value};

/// The host's pre-persist extension point: hand in the pending record, get
/// the cleaned record back, commit that.
pub trait PersistenceHook {
    fn before_save(&self, alias: &str, pending: Value) -> Result<Value, CleanableError>;
}

/// Runs the format and clean stages for registered entities.
#[derive(Debug, Clone, Default)]
pub struct CleanEngine {
    configs: ConfigRegistry,
    entities: EntityRegistry,
}

impl CleanEngine {
    pub fn new(configs: ConfigRegistry, entities: EntityRegistry) -> Self {
        Self { configs, entities }
    }

    pub fn configs(&self) -> &ConfigRegistry {
        &self.configs
    }

    pub fn configs_mut(&mut self) -> &mut ConfigRegistry {
        &mut self.configs
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    /// Cleans one raw record for the entity registered under `alias`.
    ///
    /// Resolves the effective configuration (registered config, then the
    /// entity-instance patch, then the per-call patch), reshapes when
    /// `doFormat` is set, and sanitizes when `doClean` is set. Fails only
    /// when no descriptor is registered for `alias`.
    pub fn clean(
        &self,
        alias: &str,
        raw: Value,
        entity_patch: Option<&ConfigPatch>,
        call_patch: Option<&ConfigPatch>,
    ) -> Result<Value, CleanableError> {
        let entity = self.entities.expect(alias)?;
        let config = self.configs.resolve(alias, entity_patch, call_patch);

        let mut record = raw;
        if config.do_format {
            record = reshape::reshape(entity, &self.entities, record);
        }
        if config.do_clean {
            record = self.clean_values(entity, record, &config);
        }
        Ok(record)
    }

    /// Runs only the reshape (format) stage.
    pub fn reshape_record(&self, alias: &str, raw: Value) -> Result<Value, CleanableError> {
        let entity = self.entities.expect(alias)?;
        Ok(reshape::reshape(entity, &self.entities, raw))
    }

    /// Runs only the recursive value-sanitization (clean) stage.
    ///
    /// Walks the record one level at a time: numeric keys are skipped
    /// entirely (list entries arising from plural associations), the own
    /// alias and known associations recurse with the matching descriptor,
    /// nested mappings are cleaned as flat field/value sets, list values are
    /// cleaned element-wise, and bare scalars are cleaned as fields of the
    /// owning record.
    pub fn clean_values(
        &self,
        entity: &EntityDescriptor,
        data: Value,
        config: &CleanConfig,
    ) -> Value {
        let entries = match data {
            Value::Object(entries) => entries,
            other => return other,
        };
        if entries.is_empty() {
            return Value::Object(entries);
        }

        let mut out = Map::new();
        let mut saw_scalar_field = false;
        for (key, val) in entries {
            if is_numeric_key(&key) {
                // list entries from plural association data are not cleaned
                out.insert(key, val);
                continue;
            }
            if key == entity.alias {
                let cleaned = self.clean_values(entity, val, config);
                out.insert(key, cleaned);
                continue;
            }
            if val.is_object() || val.is_array() {
                if let Some(associated) = self.associated_descriptor(entity, &key) {
                    let cleaned = self.clean_values(associated, val, config);
                    out.insert(key, cleaned);
                    continue;
                }
            }
            match val {
                Value::Array(items) => {
                    // list-shaped data under an unknown key: each element is
                    // cleaned under the options its index resolves to
                    let cleaned = items
                        .into_iter()
                        .enumerate()
                        .map(|(index, item)| {
                            let options =
                                determine_options(&index.to_string(), config, &entity.schema);
                            sanitize_value(&item, &options)
                        })
                        .collect();
                    out.insert(key, Value::Array(cleaned));
                }
                Value::Object(fields) => {
                    let mut cleaned = Map::new();
                    for (field, value) in fields {
                        let options = determine_options(&field, config, &entity.schema);
                        let field = sanitize_key(&field, &config.clean_default);
                        cleaned.insert(field, sanitize_value(&value, &options));
                    }
                    out.insert(key, Value::Object(cleaned));
                }
                scalar => {
                    saw_scalar_field = true;
                    let options = determine_options(&key, config, &entity.schema);
                    let key = sanitize_key(&key, &config.clean_default);
                    out.insert(key, sanitize_value(&scalar, &options));
                }
            }
        }

        if saw_scalar_field {
            // stray indices left behind by the reshape step
            out.retain(|key, _| !is_numeric_key(key) && !key.is_empty());
        }
        Value::Object(out)
    }

    /// Resolves a declared association of `entity` to its registered
    /// descriptor, or "not found" when either side is missing.
    fn associated_descriptor(
        &self,
        entity: &EntityDescriptor,
        key: &str,
    ) -> Option<&EntityDescriptor> {
        let association = entity.association(key)?;
        match self.entities.get(&association.entity_alias) {
            Some(descriptor) => Some(descriptor),
            None => {
                warn!(
                    "Association '{}' of '{}' names unregistered entity '{}'; cleaning as plain fields",
                    key, entity.alias, association.entity_alias
                );
                None
            }
        }
    }
}

impl PersistenceHook for CleanEngine {
    /// Cleans the pending record with no extra configuration layers. Entity
    /// opt-out is expressed through the registered configuration
    /// (`ConfigPatch::disabled()`).
    fn before_save(&self, alias: &str, pending: Value) -> Result<Value, CleanableError> {
        debug!("before_save cleaning record for entity '{}'", alias);
        self.clean(alias, pending, None, None)
    }
}

/// Array-index-like keys denote list elements and are skipped by the clean
/// walk.
fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
