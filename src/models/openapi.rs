//! OpenAPI document loading and resource discovery
//!
//! Resources are the component schemas carrying an `x-aep-resource`
//! extension. Their standard methods are read from the operations declared on
//! the collection path (`/books`) and the resource path (`/books/{book_id}`).

use log::debug;
use serde_json::{Map, Value};

use super::resource::{
    ApiModel, CreateMethod, Methods, Property, PropertyType, ResourceDescriptor, Schema,
};
use crate::error::{ConfigError, Result};

/// Maximum `$ref` hops followed before giving up on a reference chain
const MAX_REF_DEPTH: usize = 8;

/// Fetch an OpenAPI document from a file path or an http(s) URL.
///
/// Both JSON and YAML documents are accepted.
pub async fn fetch_document(source: &str) -> Result<Value> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        debug!("Fetching API description from {}", source);
        let response = reqwest::get(source)
            .await
            .map_err(|e| ConfigError::ApiDocument(format!("{}: {}", source, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(
                ConfigError::ApiDocument(format!("{} returned status {}", source, status)).into(),
            );
        }
        response
            .text()
            .await
            .map_err(|e| ConfigError::ApiDocument(format!("{}: {}", source, e)))?
    } else {
        debug!("Reading API description from {}", source);
        std::fs::read_to_string(source)
            .map_err(|e| ConfigError::ApiDocument(format!("{}: {}", source, e)))?
    };

    parse_document(&text)
}

/// Parse document text as JSON, falling back to YAML.
pub fn parse_document(text: &str) -> Result<Value> {
    if text.trim_start().starts_with('{') {
        serde_json::from_str(text).map_err(|e| ConfigError::ApiDocument(e.to_string()).into())
    } else {
        serde_yaml::from_str(text).map_err(|e| ConfigError::ApiDocument(e.to_string()).into())
    }
}

/// Build the API model from a parsed OpenAPI document.
///
/// `server_override` replaces the document's first server URL.
pub fn parse_api(doc: &Value, server_override: Option<&str>) -> Result<ApiModel> {
    let server_url = server_override
        .map(str::to_string)
        .or_else(|| {
            doc.pointer("/servers/0/url")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            ConfigError::ApiDocument(
                "document declares no server URL; pass --server-url".to_string(),
            )
        })?;

    let empty = Map::new();
    let schemas = doc
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut resources = Vec::new();
    for (schema_name, schema) in schemas {
        let Some(ext) = schema.get("x-aep-resource") else {
            continue;
        };
        let resource = parse_resource(doc, &server_url, schema_name, schema, ext);
        debug!(
            "Discovered resource {} (parents: {:?})",
            resource.plural, resource.parents
        );
        resources.push(resource);
    }

    if resources.is_empty() {
        return Err(ConfigError::ApiDocument(
            "no schemas with an x-aep-resource extension".to_string(),
        )
        .into());
    }

    Ok(ApiModel {
        server_url,
        resources,
    })
}

fn parse_resource(
    doc: &Value,
    server_url: &str,
    schema_name: &str,
    schema: &Value,
    ext: &Value,
) -> ResourceDescriptor {
    let singular = ext
        .get("singular")
        .and_then(Value::as_str)
        .unwrap_or(schema_name)
        .to_string();
    let plural = ext
        .get("plural")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}s", singular));
    let parents = ext
        .get("parents")
        .and_then(Value::as_array)
        .map(|ps| {
            ps.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let pattern = ext
        .pointer("/patterns/0")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/{{{}_id}}", plural, singular));

    let resource_path = format!("/{}", pattern.trim_start_matches('/'));
    let collection_path = resource_path
        .rsplit_once('/')
        .map(|(collection, _)| collection.to_string())
        .unwrap_or_default();

    let collection_ops = find_path(doc, &collection_path);
    let resource_ops = find_path(doc, &resource_path);

    let create = collection_ops
        .and_then(|ops| ops.get("post"))
        .map(|op| CreateMethod {
            supports_user_settable_create: has_query_param(doc, op, "id"),
        });
    let list_op = collection_ops.and_then(|ops| ops.get("get"));
    let methods = Methods {
        create,
        list: list_op.is_some(),
        get: resource_ops.and_then(|ops| ops.get("get")).is_some(),
        update: resource_ops.and_then(|ops| ops.get("patch")).is_some(),
        delete: resource_ops.and_then(|ops| ops.get("delete")).is_some(),
    };

    let list_items_field = list_op
        .and_then(|op| list_items_field(doc, op))
        .unwrap_or_else(|| plural.clone());

    ResourceDescriptor {
        singular,
        plural,
        server_url: server_url.to_string(),
        schema: parse_schema(doc, schema),
        parents,
        methods,
        list_items_field,
    }
}

fn parse_schema(doc: &Value, schema: &Value) -> Option<Schema> {
    let schema = resolve(doc, schema);
    let props = schema.get("properties")?.as_object()?;
    let properties = props
        .iter()
        .map(|(name, prop)| {
            let read_only = prop
                .get("readOnly")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let prop = resolve(doc, prop);
            let kind = PropertyType::from_type_name(prop.get("type").and_then(Value::as_str));
            let read_only =
                read_only || prop.get("readOnly").and_then(Value::as_bool).unwrap_or(false);
            (name.clone(), Property { kind, read_only })
        })
        .collect();
    Some(Schema { properties })
}

/// Follow `$ref` pointers into the same document.
fn resolve<'a>(doc: &'a Value, node: &'a Value) -> &'a Value {
    let mut current = node;
    for _ in 0..MAX_REF_DEPTH {
        let Some(target) = current
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix('#'))
            .and_then(|pointer| doc.pointer(pointer))
        else {
            break;
        };
        current = target;
    }
    current
}

/// Path templates compare equal regardless of variable names.
fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_var = false;
    for c in path.trim_end_matches('/').chars() {
        match c {
            '{' => {
                in_var = true;
                out.push_str("{}");
            }
            '}' => in_var = false,
            _ if !in_var => out.push(c),
            _ => {}
        }
    }
    out
}

fn find_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
    let wanted = normalize_path(path);
    doc.get("paths")?
        .as_object()?
        .iter()
        .find(|(p, _)| normalize_path(p) == wanted)
        .and_then(|(_, ops)| ops.as_object())
}

fn has_query_param(doc: &Value, op: &Value, name: &str) -> bool {
    op.get("parameters")
        .and_then(Value::as_array)
        .is_some_and(|params| {
            params.iter().map(|p| resolve(doc, p)).any(|p| {
                p.get("name").and_then(Value::as_str) == Some(name)
                    && p.get("in").and_then(Value::as_str) == Some("query")
            })
        })
}

/// Name of the array property in a list operation's 200 response, when the
/// response schema declares exactly one.
fn list_items_field(doc: &Value, op: &Value) -> Option<String> {
    let schema = op.pointer("/responses/200/content/application~1json/schema")?;
    let props = resolve(doc, schema).get("properties")?.as_object()?;
    let arrays: Vec<&String> = props
        .iter()
        .filter(|(_, prop)| resolve(doc, prop).get("type").and_then(Value::as_str) == Some("array"))
        .map(|(name, _)| name)
        .collect();
    match arrays.as_slice() {
        [only] => Some((*only).clone()),
        _ => None,
    }
}
