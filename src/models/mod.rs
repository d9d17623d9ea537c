//! Resource model consumed by the validator
//!
//! - [`resource`] - Resource descriptors and the API model
//! - [`openapi`] - Loading descriptors from an OpenAPI document

pub mod openapi;
pub mod resource;

pub use resource::{ApiModel, Methods, Property, PropertyType, ResourceDescriptor, Schema};
