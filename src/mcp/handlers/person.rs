//! Person record tool handlers.
//!
//! Implements the 6 person tools:
//! - `add_person`       -- validate and store a new record
//! - `get_person`       -- look up one record by exact name
//! - `search_persons`   -- fuzzy name search (literal + pinyin)
//! - `list_all_persons` -- every record in insertion order
//! - `update_person`    -- partial update of an existing record
//! - `delete_person`    -- remove a record
//!
//! Every handler answers with a [`ToolOutcome`]; store errors become
//! `success: false` payloads rather than protocol errors.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{McpToolResult, ToolOutcome};
use crate::matcher::Romanizer;
use crate::store::{NewPerson, PersonStore, PersonUpdate, StoreError, ValidationError};

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T, StoreError> {
    T::deserialize(args).map_err(|e| ValidationError::InvalidArguments(e.to_string()).into())
}

fn required_name(args: &Value) -> Result<&str, StoreError> {
    match args.get("name").and_then(|v| v.as_str()) {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ValidationError::MissingName.into()),
    }
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value)
        .map_err(|e| ValidationError::InvalidArguments(format!("unencodable value: {}", e)).into())
}

fn respond(result: Result<ToolOutcome, StoreError>) -> McpToolResult {
    match result {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            debug!("[Person] Tool failed: {}", e);
            ToolOutcome::failed(e).into()
        }
    }
}

// ---------------------------------------------------------------------------
// Tool handlers
// ---------------------------------------------------------------------------

/// `add_person` -- Store a new person.
pub fn handle_add_person(args: &Value, store: &mut PersonStore) -> McpToolResult {
    respond(add_person(args, store))
}

fn add_person(args: &Value, store: &mut PersonStore) -> Result<ToolOutcome, StoreError> {
    let new: NewPerson = parse_args(args)?;
    let person = store.add(new)?;
    Ok(ToolOutcome::ok(to_data(&person)?).with_message(format!("Added '{}'", person.name)))
}

/// `get_person` -- Look up a person by exact name.
pub fn handle_get_person(args: &Value, store: &PersonStore) -> McpToolResult {
    respond(get_person(args, store))
}

fn get_person(args: &Value, store: &PersonStore) -> Result<ToolOutcome, StoreError> {
    let person = store.get(required_name(args)?)?;
    Ok(ToolOutcome::ok(to_data(&person)?))
}

/// `search_persons` -- Fuzzy search by name.
pub fn handle_search_persons(
    args: &Value,
    store: &PersonStore,
    romanizer: &dyn Romanizer,
) -> McpToolResult {
    respond(search_persons(args, store, romanizer))
}

fn search_persons(
    args: &Value,
    store: &PersonStore,
    romanizer: &dyn Romanizer,
) -> Result<ToolOutcome, StoreError> {
    let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("");
    let hits = store.search(query, romanizer)?;
    let count = hits.len();
    Ok(ToolOutcome::ok(to_data(&hits)?)
        .with_count(count)
        .with_message(format!(
            "Found {} matching record(s) for '{}'",
            count,
            query.trim()
        )))
}

/// `list_all_persons` -- Every stored person.
pub fn handle_list_all_persons(_args: &Value, store: &PersonStore) -> McpToolResult {
    respond(list_all_persons(store))
}

fn list_all_persons(store: &PersonStore) -> Result<ToolOutcome, StoreError> {
    let persons = store.list();
    if persons.is_empty() {
        return Ok(ToolOutcome::ok(json!([])).with_message("No records stored"));
    }
    let count = persons.len();
    Ok(ToolOutcome::ok(to_data(&persons)?)
        .with_count(count)
        .with_message(format!("{} record(s) found", count)))
}

/// `update_person` -- Change selected fields of an existing person.
pub fn handle_update_person(args: &Value, store: &mut PersonStore) -> McpToolResult {
    respond(update_person(args, store))
}

fn update_person(args: &Value, store: &mut PersonStore) -> Result<ToolOutcome, StoreError> {
    let name = required_name(args)?;
    let update: PersonUpdate = parse_args(args)?;
    let person = store.update(name, &update)?;
    Ok(ToolOutcome::ok(to_data(&person)?).with_message(format!("Updated '{}'", name)))
}

/// `delete_person` -- Remove a person.
pub fn handle_delete_person(args: &Value, store: &mut PersonStore) -> McpToolResult {
    respond(delete_person(args, store))
}

fn delete_person(args: &Value, store: &mut PersonStore) -> Result<ToolOutcome, StoreError> {
    let name = required_name(args)?;
    let removed = store.delete(name)?;
    Ok(ToolOutcome::ok(to_data(&removed)?).with_message(format!("Deleted '{}'", name)))
}
