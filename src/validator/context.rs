//! Per-resource validation context

use crate::client::ListResponse;
use crate::error::{Error, Result};
use crate::models::ResourceDescriptor;
use crate::output::Progress;
use crate::payload::{Payload, identifier_of};

/// Mutable state shared by the test cases run against one resource.
///
/// `resources` holds what the cases created and have not yet deleted, oldest
/// first. Setup appends, teardown removes; a case that passes leaves it as it
/// found it.
#[derive(Debug)]
pub struct ValidationContext {
    pub resource: ResourceDescriptor,
    pub collection_url: String,
    pub resources: Vec<Payload>,
    /// Most recent list page, for cases that continue a listing
    pub last_list: Option<ListResponse>,
    progress: Progress,
}

impl ValidationContext {
    pub fn new(resource: &ResourceDescriptor, progress: Progress) -> Self {
        Self {
            collection_url: resource.collection_url(),
            resource: resource.clone(),
            resources: Vec::new(),
            last_list: None,
            progress,
        }
    }

    /// Record a created resource. It must carry a name or path so teardown
    /// can find it again.
    pub fn record_created(&mut self, created: Payload) -> Result<()> {
        let name = identifier_of(&created)
            .ok_or_else(|| Error::assertion("created resource has no name or path"))?
            .to_string();
        self.detail(&format!("Created {}", name));
        self.resources.push(created);
        Ok(())
    }

    pub fn oldest(&self) -> Option<&Payload> {
        self.resources.first()
    }

    /// Identifier of the oldest created resource.
    pub fn oldest_name(&self) -> Result<&str> {
        let oldest = self
            .oldest()
            .ok_or_else(|| Error::assertion("no resource has been created"))?;
        identifier_of(oldest)
            .ok_or_else(|| Error::assertion("created resource has no name or path"))
    }

    /// URL of the oldest created resource.
    pub fn oldest_url(&self) -> Result<String> {
        Ok(self.resource.resource_url(self.oldest_name()?))
    }

    pub fn remove_oldest(&mut self) -> Option<Payload> {
        if self.resources.is_empty() {
            None
        } else {
            Some(self.resources.remove(0))
        }
    }

    pub fn detail(&self, message: &str) {
        self.progress.detail(message);
    }
}
