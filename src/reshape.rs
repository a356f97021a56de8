//! reshape.rs - Structural normalization of a raw record.
//!
//! A submitted record may arrive flat, wrapped under the entity's alias, or
//! as a mix of own fields and embedded association data. [`reshape`] settles
//! it into the canonical `{ownAlias: {...}, associationAlias: {...}}` shape
//! and derives the flat join-key arrays many-to-many associations need to
//! persist. Absent data at any step degrades to empty structures; there are
//! no failure modes.
//!
//! License: MIT

use log::debug;
use serde_json::{Map, Value};

use crate::entity::{Association, EntityDescriptor, EntityRegistry};

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Normalizes `raw` into the alias-keyed record shape for `entity`.
pub fn reshape(entity: &EntityDescriptor, entities: &EntityRegistry, raw: Value) -> Value {
    let mut record = match raw {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let alias_was_present = record.contains_key(&entity.alias);
    let mut core_data = match record.remove(&entity.alias) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if record.values().all(|v| !is_container(v)) {
        // a flat record with no alias wrapper: everything is own data
        let remaining = std::mem::take(&mut record);
        for (key, value) in remaining {
            core_data.entry(key).or_insert(value);
        }
    } else if !alias_was_present {
        for (key, value) in record.iter() {
            if !is_container(value) {
                core_data.insert(key.clone(), value.clone());
            }
        }
    }
    record.insert(entity.alias.clone(), Value::Object(core_data));

    for association in entity.join_associations() {
        derive_join_keys(&mut record, association, entities);
    }

    Value::Object(record)
}

/// Rewrites many-to-many association data into the self-keyed join-array
/// shape, unless the caller already supplied one.
fn derive_join_keys(
    record: &mut Map<String, Value>,
    association: &Association,
    entities: &EntityRegistry,
) {
    let Some(nested) = record.get(&association.alias) else {
        return;
    };
    // already in join shape
    if nested
        .as_object()
        .is_some_and(|m| m.contains_key(&association.alias))
    {
        return;
    }

    let key_field = entities
        .get(&association.entity_alias)
        .and_then(|d| d.primary_key.clone())
        .unwrap_or_else(|| association.foreign_key.clone());

    let mut ids = extract_field(nested, &key_field);
    if ids.is_empty() && key_field != "id" {
        ids = extract_field(nested, "id");
    }
    debug!(
        "Derived {} join key(s) for association '{}'",
        ids.len(),
        association.alias
    );

    // lists become numerically keyed mappings so the join array can sit
    // alongside the rows under the association's own alias
    let mut shaped = match record.remove(&association.alias) {
        Some(Value::Object(map)) => map,
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        _ => Map::new(),
    };
    shaped.insert(association.alias.clone(), Value::Array(ids));
    record.insert(association.alias.clone(), Value::Object(shaped));
}

/// Pulls `field` out of every element of a list (or numerically keyed
/// mapping) of sub-records.
fn extract_field(nested: &Value, field: &str) -> Vec<Value> {
    let elements: Vec<&Value> = match nested {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };
    elements
        .into_iter()
        .filter_map(|element| element.get(field).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity() -> EntityDescriptor {
        EntityDescriptor::new("Util")
            .with_association(Association::join("UtilHasAndBelongsToMany1", "id"))
    }

    #[test]
    fn flat_input_is_wrapped_under_the_alias() {
        let data = json!({"id": "1234", "key": "test", "val": "testing un-nested input"});
        let reshaped = reshape(&entity(), &EntityRegistry::new(), data.clone());
        assert_eq!(reshaped, json!({"Util": data}));
    }

    #[test]
    fn wrapped_and_unwrapped_flat_input_converge() {
        let flat = json!({"id": "1", "key": "k"});
        let registry = EntityRegistry::new();
        let from_flat = reshape(&entity(), &registry, flat.clone());
        let from_wrapped = reshape(&entity(), &registry, json!({ "Util": flat }));
        assert_eq!(from_flat, from_wrapped);
    }

    #[test]
    fn stray_scalars_join_core_data_when_alias_missing() {
        let data = json!({
            "id": "9",
            "Other": [{"id": "a"}]
        });
        let reshaped = reshape(&entity(), &EntityRegistry::new(), data);
        assert_eq!(reshaped["Util"]["id"], json!("9"));
        // the nested candidate association data is left in place
        assert_eq!(reshaped["Other"], json!([{"id": "a"}]));
    }

    #[test]
    fn empty_input_degrades_to_empty_core_record() {
        let reshaped = reshape(&entity(), &EntityRegistry::new(), Value::Null);
        assert_eq!(reshaped, json!({"Util": {}}));
    }

    #[test]
    fn join_keys_derive_from_the_id_fallback() {
        let data = json!({
            "Util": {"id": "12345", "val": "testing nested reformatting"},
            "UtilHasAndBelongsToMany1": [
                {"id": "a", "val": "habtm1"},
                {"id": "b", "val": "habtm2"}
            ]
        });
        let reshaped = reshape(&entity(), &EntityRegistry::new(), data);
        assert_eq!(
            reshaped["UtilHasAndBelongsToMany1"]["UtilHasAndBelongsToMany1"],
            json!(["a", "b"])
        );
        // rows survive under their numeric keys
        assert_eq!(
            reshaped["UtilHasAndBelongsToMany1"]["0"],
            json!({"id": "a", "val": "habtm1"})
        );
    }

    #[test]
    fn join_keys_prefer_the_associated_primary_key() {
        let mut registry = EntityRegistry::new();
        registry.register(EntityDescriptor::new("Tag").with_primary_key("uuid"));
        let entity = EntityDescriptor::new("Post")
            .with_association(Association::join("Tags", "tag_id").of_entity("Tag"));
        let data = json!({
            "Post": {"title": "t"},
            "Tags": [{"uuid": "u1", "id": "x"}, {"uuid": "u2"}]
        });
        let reshaped = reshape(&entity, &registry, data);
        assert_eq!(reshaped["Tags"]["Tags"], json!(["u1", "u2"]));
    }

    #[test]
    fn existing_join_shape_is_left_alone() {
        let data = json!({
            "Post": {"title": "t"},
            "Tag": {"Tag": ["a", "b"]}
        });
        let entity = EntityDescriptor::new("Post")
            .with_association(Association::join("Tag", "tag_id"));
        let reshaped = reshape(&entity, &EntityRegistry::new(), data.clone());
        assert_eq!(reshaped["Tag"], data["Tag"]);
    }
}
