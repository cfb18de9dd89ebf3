//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use serde_json::Value;

use gridline_core::{Entity, FieldValue, ID_FIELD};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal on stdin the prompt cannot be answered, so `--yes`
/// becomes mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` / `--file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("invalid JSON in {}: {e}", path.display()),
    })
}

/// Build a record from a JSON object keyed by domain field names.
pub fn entity_from_json(value: &Value) -> Result<Entity, CliError> {
    let Value::Object(obj) = value else {
        return Err(CliError::Validation {
            field: "record".into(),
            reason: "expected a JSON object".into(),
        });
    };
    let mut entity = Entity::default();
    for (key, value) in obj {
        entity.set(key.as_str(), FieldValue::from_json(value));
    }
    Ok(entity)
}

/// Apply `field=value` assignments. Values are parsed as literals:
/// numbers stay numbers, `null` clears the field.
pub fn apply_assignments(entity: &mut Entity, assignments: &[String]) -> Result<(), CliError> {
    for raw in assignments {
        let (field, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
            field: "set".into(),
            reason: format!("expected FIELD=VALUE, got '{raw}'"),
        })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(CliError::Validation {
                field: "set".into(),
                reason: format!("missing field name in '{raw}'"),
            });
        }
        if field == ID_FIELD {
            // Ids are always strings on the wire.
            entity.set(field, value.trim());
        } else {
            entity.set(field, FieldValue::parse_literal(value));
        }
    }
    Ok(())
}
