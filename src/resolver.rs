// Resolves the family of a loanable resource: itself, its loanable parent
// and its loanable children.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::atal::{filter, Resource, ResourceKind};
use crate::error::GatewayResult;
use crate::facility_api::{decode, FacilityApi};

#[derive(Clone)]
pub struct ResourceResolver {
    api: Arc<dyn FacilityApi>,
}

impl ResourceResolver {
    pub fn new(api: Arc<dyn FacilityApi>) -> Self {
        Self { api }
    }

    pub async fn resource(&self, kind: ResourceKind, resource_id: i64) -> GatewayResult<Resource> {
        let path = kind.resource_path(resource_id);
        let value = self.api.get(&path, &[]).await?;
        decode(&path, value)
    }

    /// All loanable resources of `kind`, optionally narrowed by an extra
    /// OData condition.
    pub async fn loanable(
        &self,
        kind: ResourceKind,
        condition: Option<String>,
    ) -> GatewayResult<Vec<Resource>> {
        let path = kind.resources_path();
        let filter = condition.unwrap_or_else(filter::loanable);
        let value = self.api.get(path, &[("$filter", filter)]).await?;
        decode(path, value)
    }

    pub async fn resolve_family(
        &self,
        kind: ResourceKind,
        resource_id: i64,
    ) -> GatewayResult<BTreeSet<i64>> {
        let mut family = BTreeSet::from([resource_id]);

        let resource = self.resource(kind, resource_id).await?;
        if let Some(parent_id) = resource.parent_id {
            let parents = self
                .loanable(kind, Some(filter::loanable_with_id(parent_id)))
                .await?;
            if parents.iter().any(|parent| parent.id == parent_id) {
                family.insert(parent_id);
            }
        }

        let children = self
            .loanable(kind, Some(filter::loanable_children_of(resource_id)))
            .await?;
        family.extend(children.into_iter().map(|child| child.id));

        debug!(resource_id, family = ?family, "Resolved resource family");
        Ok(family)
    }
}
