//! Resource descriptors resolved from the API description

use std::collections::BTreeMap;

use serde::Serialize;

/// Declared JSON type of a schema property
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    /// Anything else (missing type, `$ref` without a resolvable type, ...)
    Other,
}

impl PropertyType {
    pub fn from_type_name(name: Option<&str>) -> Self {
        match name {
            Some("string") => PropertyType::String,
            Some("integer") => PropertyType::Integer,
            Some("number") => PropertyType::Number,
            Some("boolean") => PropertyType::Boolean,
            Some("object") => PropertyType::Object,
            Some("array") => PropertyType::Array,
            _ => PropertyType::Other,
        }
    }
}

/// A single property of a resource schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: PropertyType,

    #[serde(rename = "readOnly")]
    pub read_only: bool,
}

impl Property {
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Top-level properties of a resource schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub properties: BTreeMap<String, Property>,
}

impl Schema {
    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.insert(name.into(), property);
        self
    }
}

/// Create method capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateMethod {
    /// Whether callers may choose the identifier via the `id` query parameter
    pub supports_user_settable_create: bool,
}

/// Standard methods the API declares for a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Methods {
    pub create: Option<CreateMethod>,
    pub get: bool,
    pub list: bool,
    pub update: bool,
    pub delete: bool,
}

impl Methods {
    /// All standard methods, server-assigned identifiers only.
    pub fn all() -> Self {
        Self {
            create: Some(CreateMethod::default()),
            get: true,
            list: true,
            update: true,
            delete: true,
        }
    }
}

/// Immutable description of one resource collection.
///
/// Built once per run by the API model provider and never modified by the
/// validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    /// Singular resource name (e.g. `book`)
    pub singular: String,

    /// Plural resource name, also the collection path segment (e.g. `books`)
    pub plural: String,

    /// Base URL of the server under test
    pub server_url: String,

    /// Schema of the resource representation, if the API declares one
    pub schema: Option<Schema>,

    /// Parent resource singular names; empty for top-level resources
    pub parents: Vec<String>,

    pub methods: Methods,

    /// Name of the array field holding items in a list response
    pub list_items_field: String,
}

impl ResourceDescriptor {
    /// Create a top-level descriptor with every standard method declared.
    pub fn new(
        singular: impl Into<String>,
        plural: impl Into<String>,
        server_url: impl Into<String>,
    ) -> Self {
        let plural = plural.into();
        Self {
            singular: singular.into(),
            list_items_field: plural.clone(),
            plural,
            server_url: server_url.into(),
            schema: None,
            parents: Vec::new(),
            methods: Methods::all(),
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_methods(mut self, methods: Methods) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_user_settable_create(mut self) -> Self {
        self.methods.create = Some(CreateMethod {
            supports_user_settable_create: true,
        });
        self
    }

    pub fn with_list_items_field(mut self, field: impl Into<String>) -> Self {
        self.list_items_field = field.into();
        self
    }

    /// Collection URL: `<server_url>/<plural>`.
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.server_url.trim_end_matches('/'), self.plural)
    }

    /// URL of an individual resource given its relative name (`books/123`).
    pub fn resource_url(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            name.trim_start_matches('/')
        )
    }

    pub fn is_top_level(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn supports_user_settable_create(&self) -> bool {
        self.methods
            .create
            .as_ref()
            .is_some_and(|c| c.supports_user_settable_create)
    }
}

/// The set of resources an API exposes
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiModel {
    pub server_url: String,
    pub resources: Vec<ResourceDescriptor>,
}

impl ApiModel {
    /// Find a resource by its plural name.
    pub fn find(&self, plural: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.plural == plural)
    }

    /// Resources without parents, in declaration order.
    pub fn top_level(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter().filter(|r| r.is_top_level())
    }
}
