use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use santaops_common::models::{Claim, Resolution};
use santaops_common::traits::repository_traits::ResolutionRepository;

use crate::Error;

#[derive(Default)]
pub struct MemoryResolutionRepository {
    resolutions: DashMap<Uuid, Resolution>,
}

impl MemoryResolutionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResolutionRepository for MemoryResolutionRepository {
    async fn try_claim(&self, resolution: &Resolution) -> Result<Claim, Error> {
        match self.resolutions.entry(resolution.artifact_id) {
            Entry::Occupied(existing) => Ok(Claim::Lost(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(resolution.clone());
                Ok(Claim::Won(resolution.clone()))
            }
        }
    }

    async fn complete(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error> {
        match self.resolutions.get_mut(&artifact_id) {
            Some(mut r) if r.resolved_by == resolved_by => {
                r.completed = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, artifact_id: Uuid, resolved_by: &str) -> Result<bool, Error> {
        Ok(self
            .resolutions
            .remove_if(&artifact_id, |_, r| r.resolved_by == resolved_by && !r.completed)
            .is_some())
    }

    async fn get(&self, artifact_id: Uuid) -> Result<Option<Resolution>, Error> {
        Ok(self.resolutions.get(&artifact_id).map(|r| r.value().clone()))
    }
}
