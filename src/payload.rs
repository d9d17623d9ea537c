//! Request bodies for create and update calls

use serde_json::{Map, Value};

use crate::client::Generator;
use crate::error::{Error, Result};
use crate::models::{PropertyType, ResourceDescriptor};

/// A resource representation: string-keyed property map
pub type Payload = Map<String, Value>;

/// Server-managed fields that are never sent in a request body
const SYSTEM_FIELDS: &[&str] = &[
    "id",
    "name",
    "path",
    "createTime",
    "updateTime",
    "deleteTime",
    "uid",
    "etag",
];

pub fn is_system_field(name: &str) -> bool {
    SYSTEM_FIELDS.contains(&name)
}

/// Build a create (or update) body from the resource schema.
///
/// System fields and read-only properties are skipped. Nested objects and
/// arrays are sent empty.
pub fn generate_create_payload(
    resource: &ResourceDescriptor,
    generator: &mut Generator,
) -> Result<Payload> {
    let schema = resource
        .schema
        .as_ref()
        .ok_or_else(|| Error::SchemaMissing(resource.singular.clone()))?;

    let mut payload = Payload::new();
    for (name, property) in &schema.properties {
        if is_system_field(name) || property.read_only {
            continue;
        }
        let value = match property.kind {
            PropertyType::String => Value::from(generator.next_string()),
            PropertyType::Integer => Value::from(generator.next_integer()),
            PropertyType::Number => Value::from(generator.next_number()),
            PropertyType::Boolean => Value::Bool(true),
            PropertyType::Object => Value::Object(Map::new()),
            PropertyType::Array => Value::Array(Vec::new()),
            PropertyType::Other => continue,
        };
        payload.insert(name.clone(), value);
    }

    Ok(payload)
}

/// Identifying field of a representation: `name`, falling back to `path`.
pub fn identifier_of(payload: &Payload) -> Option<&str> {
    ["name", "path"]
        .iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

/// Last segment of a resource name (`books/123` -> `123`).
pub fn id_from_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
