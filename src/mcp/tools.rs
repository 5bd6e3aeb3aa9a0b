//! Tool definitions advertised through `tools/list`.

use serde::Serialize;
use serde_json::{json, Value};

/// One tool as it appears in the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Names of every tool this server answers.
pub const TOOL_NAMES: [&str; 6] = [
    "add_person",
    "get_person",
    "search_persons",
    "list_all_persons",
    "update_person",
    "delete_person",
];

/// Birth and location properties shared by add and update.
fn record_properties(optional: bool) -> serde_json::Map<String, Value> {
    let opt = |desc: &str| {
        if optional {
            format!("{} (optional)", desc)
        } else {
            desc.to_string()
        }
    };
    let props = json!({
        "birth_year": { "type": "integer", "description": opt("Birth year") },
        "birth_month": { "type": "integer", "description": opt("Birth month (1-12)") },
        "birth_day": { "type": "integer", "description": opt("Birth day (1-31)") },
        "birth_hour": { "type": "integer", "description": opt("Birth hour (0-23)") },
        "birth_minute": { "type": "integer", "description": opt("Birth minute (0-59)") },
        "city": { "type": "string", "description": opt("Birth city") },
        "latitude": { "type": "number", "description": opt("Latitude (-90 to 90)") },
        "longitude": { "type": "number", "description": opt("Longitude (-180 to 180)") },
        "gender": { "type": "string", "description": "Gender (optional)" },
        "timezone": {
            "type": "string",
            "description": "Timezone (optional, e.g. Asia/Shanghai, UTC+8)"
        }
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn name_only_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": description }
        },
        "required": ["name"]
    })
}

/// Definitions for all person tools, in `TOOL_NAMES` order.
pub fn person_tools() -> Vec<ToolDefinition> {
    let mut add_props = record_properties(false);
    add_props.insert("name".into(), json!({ "type": "string", "description": "Name" }));

    let mut update_props = record_properties(true);
    update_props.insert(
        "name".into(),
        json!({ "type": "string", "description": "Name of the record to update" }),
    );

    vec![
        ToolDefinition {
            name: "add_person",
            description: "Add a person: name, birth date/time, birth place, optional gender and timezone",
            input_schema: json!({
                "type": "object",
                "properties": add_props,
                "required": [
                    "name", "birth_year", "birth_month", "birth_day", "birth_hour",
                    "birth_minute", "city", "latitude", "longitude"
                ]
            }),
        },
        ToolDefinition {
            name: "get_person",
            description: "Look up a person by exact name",
            input_schema: name_only_schema("Name to look up"),
        },
        ToolDefinition {
            name: "search_persons",
            description: "Fuzzy search by name (prefix, suffix, substring, and pinyin for Chinese names)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Name or part of a name, at least 2 characters"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "list_all_persons",
            description: "List every stored person",
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
        ToolDefinition {
            name: "update_person",
            description: "Update selected fields of a person",
            input_schema: json!({
                "type": "object",
                "properties": update_props,
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: "delete_person",
            description: "Delete a person by name",
            input_schema: name_only_schema("Name to delete"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_match_names() {
        let names: Vec<&str> = person_tools().iter().map(|t| t.name).collect();
        assert_eq!(names, TOOL_NAMES.to_vec());
    }

    #[test]
    fn test_add_requires_all_record_fields() {
        let tools = person_tools();
        let add = &tools[0].input_schema;
        assert_eq!(add["required"].as_array().unwrap().len(), 9);
        assert_eq!(add["properties"].as_object().unwrap().len(), 11);
        assert_eq!(add["properties"]["latitude"]["type"], "number");
    }

    #[test]
    fn test_update_requires_only_name() {
        let tools = person_tools();
        let update = &tools[4].input_schema;
        assert_eq!(update["required"], json!(["name"]));
        assert!(update["properties"]["birth_year"]["description"]
            .as_str()
            .unwrap()
            .ends_with("(optional)"));
    }

    #[test]
    fn test_definition_serializes_input_schema_key() {
        let json = serde_json::to_value(&person_tools()[1]).unwrap();
        assert!(json.get("inputSchema").is_some());
    }
}
