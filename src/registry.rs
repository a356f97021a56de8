//! registry.rs - Per-entity-alias configuration store.
//!
//! One [`ConfigRegistry`] holds the merged configuration for every entity
//! alias. Entries are established at entity-registration time (repeated
//! registration progressively merges, never resets) and read on every clean
//! invocation. The registry is an explicit object handed to the pipeline, not
//! a process-wide singleton; if the host is multi-threaded, registration must
//! finish before concurrent cleaning begins.
//!
//! License: MIT

use std::collections::HashMap;

use log::debug;

use crate::config::{CleanConfig, ConfigPatch};

/// Alias-keyed store of merged clean configurations.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: HashMap<String, CleanConfig>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `patch` onto the configuration registered for `alias`, creating
    /// the entry from the built-in defaults when absent. Missing keys simply
    /// inherit; there are no error conditions.
    pub fn register(&mut self, alias: impl Into<String>, patch: &ConfigPatch) {
        let alias = alias.into();
        let entry = self
            .configs
            .entry(alias.clone())
            .or_insert_with(CleanConfig::default);
        entry.apply(patch);
        debug!("Registered clean config for entity alias '{}'", alias);
    }

    /// Returns the registered configuration for `alias`, or the built-in
    /// defaults when the alias was never registered.
    pub fn get(&self, alias: &str) -> CleanConfig {
        self.configs.get(alias).cloned().unwrap_or_default()
    }

    /// Resolves the effective configuration for one clean call.
    ///
    /// Layering, later wins: built-in defaults, the registered configuration,
    /// the entity-instance patch (ad hoc config carried on the entity), and
    /// the per-call patch.
    pub fn resolve(
        &self,
        alias: &str,
        entity_patch: Option<&ConfigPatch>,
        call_patch: Option<&ConfigPatch>,
    ) -> CleanConfig {
        let mut config = self.get(alias);
        if let Some(patch) = entity_patch {
            config.apply(patch);
        }
        if let Some(patch) = call_patch {
            config.apply(patch);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionsPatch;

    #[test]
    fn unregistered_alias_resolves_to_builtin_defaults() {
        let registry = ConfigRegistry::new();
        let config = registry.resolve("Ghost", None, None);
        assert_eq!(config, CleanConfig::default());
    }

    #[test]
    fn repeated_registration_progressively_merges() {
        let mut registry = ConfigRegistry::new();
        registry.register(
            "Util",
            &ConfigPatch {
                do_format: Some(false),
                ..Default::default()
            },
        );
        registry.register(
            "Util",
            &ConfigPatch {
                clean_default: Some(OptionsPatch::flag("stripHtml", false)),
                ..Default::default()
            },
        );
        let config = registry.get("Util");
        // both patches survive
        assert!(!config.do_format);
        assert!(!config.clean_default.strip_html);
        assert!(config.do_clean);
    }

    #[test]
    fn per_call_patch_outranks_entity_patch() {
        let mut registry = ConfigRegistry::new();
        registry.register("Util", &ConfigPatch::default());
        let entity_patch = ConfigPatch {
            do_clean: Some(false),
            ..Default::default()
        };
        let call_patch = ConfigPatch {
            do_clean: Some(true),
            ..Default::default()
        };
        let config = registry.resolve("Util", Some(&entity_patch), Some(&call_patch));
        assert!(config.do_clean);
    }
}
