// Thematic (nature) taxonomy as offered to the front office

use std::sync::Arc;

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::atal::Thematic;
use crate::error::GatewayResult;
use crate::facility_api::{decode, FacilityApi};

pub const THEMATICS_PATH: &str = "/api/Thematics";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThematicFilter {
    pub primary_only: bool,
    pub secondary_only: bool,
    pub parent_id: Option<i64>,
}

pub struct ThematicNormalizer {
    api: Arc<dyn FacilityApi>,
}

impl ThematicNormalizer {
    pub fn new(api: Arc<dyn FacilityApi>) -> Self {
        Self { api }
    }

    pub async fn list_thematics(&self, filter: ThematicFilter) -> GatewayResult<Vec<Thematic>> {
        let value = self.api.get(THEMATICS_PATH, &[]).await?;
        let thematics: Vec<Thematic> = decode(THEMATICS_PATH, value)?;
        let total = thematics.len();
        let selected = normalize(thematics, filter);
        debug!(total, selected = selected.len(), "Filtered thematics");
        Ok(selected)
    }
}

/// Drops archived entries, applies every requested filter in turn and sorts
/// by the NFC form of the complete label.
///
/// `primary_only` and `secondary_only` are applied independently, so asking
/// for both yields nothing.
pub fn normalize(thematics: Vec<Thematic>, filter: ThematicFilter) -> Vec<Thematic> {
    let mut selected: Vec<Thematic> = thematics
        .into_iter()
        .filter(|thematic| !thematic.is_archived)
        .filter(|thematic| !filter.primary_only || thematic.parent_id.is_none())
        .filter(|thematic| !filter.secondary_only || thematic.parent_id.is_some())
        .filter(|thematic| {
            filter
                .parent_id
                .map_or(true, |parent_id| thematic.parent_id == Some(parent_id))
        })
        .collect();
    selected.sort_by_cached_key(|thematic| sort_key(&thematic.complete_label));
    selected
}

pub fn sort_key(label: &str) -> String {
    label.nfc().collect()
}
