//! Response schema parsing.
//!
//! A schema is given either as a JSON object in the Gemini schema dialect or
//! in the compact form `name:type:description|name:type|...`. The compact
//! form yields an object whose fields are all required.

use gen_common::ConfigError;
use serde_json::{json, Map, Value};

const COMPACT_TYPES: [&str; 4] = ["string", "number", "integer", "boolean"];

/// Parse a schema definition. Empty input means no schema.
pub fn parse(definition: &str) -> Result<Option<Value>, ConfigError> {
    let definition = definition.trim();
    if definition.is_empty() {
        return Ok(None);
    }

    if definition.starts_with('{') {
        let value: Value = serde_json::from_str(definition)
            .map_err(|e| ConfigError::ValidationError(format!("invalid schema json: {e}")))?;
        return Ok(Some(value));
    }

    parse_compact(definition).map(Some)
}

fn parse_compact(definition: &str) -> Result<Value, ConfigError> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in definition.split('|').map(str::trim).filter(|f| !f.is_empty()) {
        let mut parts = field.splitn(3, ':');
        let name = parts.next().unwrap_or_default().trim();
        let kind = parts.next().map(str::trim).unwrap_or("string").to_lowercase();
        let description = parts.next().map(str::trim).unwrap_or_default();

        if name.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "schema field '{field}' has no name"
            )));
        }
        if !COMPACT_TYPES.contains(&kind.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "schema field '{name}' has unsupported type '{kind}'; expected one of {}",
                COMPACT_TYPES.join(", ")
            )));
        }
        if properties.contains_key(name) {
            return Err(ConfigError::ValidationError(format!(
                "schema field '{name}' is defined more than once"
            )));
        }

        let mut property = json!({ "type": kind.to_uppercase() });
        if !description.is_empty() {
            property["description"] = Value::String(description.to_string());
        }
        properties.insert(name.to_string(), property);
        required.push(Value::String(name.to_string()));
    }

    Ok(json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_none() {
        assert_eq!(parse("  ").unwrap(), None);
    }

    #[test]
    fn json_passes_through() {
        let schema = parse(r#"{"type":"OBJECT","properties":{"a":{"type":"STRING"}}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(schema["properties"]["a"]["type"], "STRING");
    }

    #[test]
    fn invalid_json_rejected() {
        assert!(parse("{not json").is_err());
    }

    #[test]
    fn compact_form() {
        let schema = parse("city:string:the city name|population:integer")
            .unwrap()
            .unwrap();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["city"]["type"], "STRING");
        assert_eq!(schema["properties"]["city"]["description"], "the city name");
        assert_eq!(schema["properties"]["population"]["type"], "INTEGER");
        assert_eq!(schema["required"], json!(["city", "population"]));
    }

    #[test]
    fn compact_rejects_unknown_type_and_duplicates() {
        assert!(parse("a:date").is_err());
        assert!(parse("a:string|a:number").is_err());
        assert!(parse(":string").is_err());
    }
}
