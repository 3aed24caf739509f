//! Schema migration for workspace documents.
//!
//! Version 1.0.0 is the legacy editor state: layouts hold `divisions` whose
//! media and durations live in two parallel arrays (`imageSrcs`,
//! `durations`), ids are millisecond timestamps and the resolution is stored
//! as `deviceResolution`. Version 2.0.0 stores one `{mediaRef,
//! durationSeconds}` entry per item and UUID ids.

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::{MosaicError, Result};
use crate::layout::DEFAULT_ITEM_SECONDS;

/// Current schema version for workspace documents.
pub const CURRENT_SCHEMA_VERSION: &str = "2.0.0";

/// Version assumed for documents without a `schema_version` field.
const LEGACY_SCHEMA_VERSION: &str = "1.0.0";

type MigrationFn = fn(Value) -> Result<Value>;

fn get_migration_registry() -> HashMap<(&'static str, &'static str), MigrationFn> {
    let mut registry: HashMap<(&'static str, &'static str), MigrationFn> = HashMap::new();
    registry.insert(("1.0.0", "2.0.0"), migrate_1_0_0_to_2_0_0);
    registry
}

/// All known schema versions in order.
fn get_version_order() -> [&'static str; 2] {
    ["1.0.0", "2.0.0"]
}

/// Upgrade a document to [`CURRENT_SCHEMA_VERSION`].
pub fn migrate_document(mut data: Value) -> Result<Value> {
    let current_version = data
        .get("schema_version")
        .and_then(|v| v.as_str())
        .unwrap_or(LEGACY_SCHEMA_VERSION)
        .to_string();

    let versions = get_version_order();
    let Some(from_idx) = versions.iter().position(|v| *v == current_version) else {
        return Err(MosaicError::InvalidSchemaVersion {
            version: current_version,
        });
    };

    let registry = get_migration_registry();
    for window in versions[from_idx..].windows(2) {
        let (from, to) = (window[0], window[1]);
        let migration_fn = registry
            .get(&(from, to))
            .ok_or_else(|| MosaicError::MigrationError {
                from: from.to_string(),
                to: to.to_string(),
                reason: "Migration function not found in registry".to_string(),
            })?;

        data = migration_fn(data).map_err(|e| MosaicError::MigrationError {
            from: from.to_string(),
            to: to.to_string(),
            reason: e.to_string(),
        })?;

        log::info!("[MIGRATION] Upgraded workspace from {} to {}", from, to);
    }

    if let Some(obj) = data.as_object_mut() {
        obj.insert(
            "schema_version".to_string(),
            Value::String(CURRENT_SCHEMA_VERSION.to_string()),
        );
    }

    Ok(data)
}

fn legacy_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Map a legacy id to a UUID, reusing the mapping for repeated ids.
fn remap_id(ids: &mut HashMap<String, String>, legacy: Option<&Value>) -> Value {
    match legacy.and_then(legacy_key) {
        Some(key) => Value::String(
            ids.entry(key)
                .or_insert_with(|| Uuid::new_v4().to_string())
                .clone(),
        ),
        None => Value::Null,
    }
}

fn migrate_division(division: &Value, ids: &mut HashMap<String, String>) -> Result<Value> {
    let sources = division
        .get("imageSrcs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let durations = division
        .get("durations")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    // Pair by position; a missing duration takes the default
    let items: Vec<Value> = sources
        .iter()
        .enumerate()
        .filter_map(|(i, src)| {
            let media = src.as_str()?;
            let seconds = durations
                .get(i)
                .and_then(Value::as_f64)
                .filter(|s| *s > 0.0)
                .unwrap_or(DEFAULT_ITEM_SECONDS);
            Some(json!({ "mediaRef": media, "durationSeconds": seconds }))
        })
        .collect();

    let number = |key: &str| -> Result<Value> {
        division
            .get(key)
            .and_then(Value::as_f64)
            .map(Value::from)
            .ok_or_else(|| MosaicError::MigrationError {
                from: "1.0.0".to_string(),
                to: "2.0.0".to_string(),
                reason: format!("division is missing numeric '{}'", key),
            })
    };

    // Zones always need an id, even when the legacy record had none
    let id = match remap_id(ids, division.get("id")) {
        Value::Null => Value::String(Uuid::new_v4().to_string()),
        id => id,
    };

    Ok(json!({
        "id": id,
        "x": number("x")?,
        "y": number("y")?,
        "width": number("width")?,
        "height": number("height")?,
        "items": items,
    }))
}

fn migrate_layout(layout: &Value, ids: &mut HashMap<String, String>) -> Result<Value> {
    let zones = layout
        .get("divisions")
        .and_then(Value::as_array)
        .map(|divs| {
            divs.iter()
                .map(|d| migrate_division(d, ids))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let resolution = layout
        .get("deviceResolution")
        .cloned()
        .unwrap_or_else(|| Value::String("Full HD 1080P".to_string()));

    Ok(json!({
        "id": remap_id(ids, layout.get("id")),
        "name": layout.get("name").cloned().unwrap_or_else(|| Value::String(String::new())),
        "resolution": resolution,
        "zones": zones,
    }))
}

/// Legacy editor state to single-entry items and UUID ids.
fn migrate_1_0_0_to_2_0_0(data: Value) -> Result<Value> {
    let mut ids: HashMap<String, String> = HashMap::new();

    let layouts = data
        .get("layouts")
        .and_then(Value::as_array)
        .map(|ls| {
            ls.iter()
                .map(|l| migrate_layout(l, &mut ids))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    // Migrated after the collection so a loaded buffer keeps its saved id
    let current = match data.get("currentLayout") {
        Some(layout) => migrate_layout(layout, &mut ids)?,
        None => json!({ "id": null, "name": "", "zones": [] }),
    };

    let mut out = Map::new();
    out.insert("current_layout".to_string(), current);
    out.insert("layouts".to_string(), Value::Array(layouts));
    out.insert(
        "modified_at".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    Ok(Value::Object(out))
}
