// The immutable set of services shared by every request

use std::sync::Arc;

use serde_json::Value;

use crate::atal::filter;
use crate::availability::AvailabilityCalculator;
use crate::booking::BookingWriter;
use crate::config::SlotConfig;
use crate::error::GatewayResult;
use crate::facility_api::FacilityApi;
use crate::resolver::ResourceResolver;
use crate::thematic::ThematicNormalizer;
use crate::work_request::WorkRequestService;

pub const THIRD_PARTIES_PATH: &str = "/api/ThirdParties";
pub const PROBE_PATH: &str = "/api/Test";

pub struct Connector {
    api: Arc<dyn FacilityApi>,
    pub resolver: ResourceResolver,
    pub availability: AvailabilityCalculator,
    pub bookings: BookingWriter,
    pub thematics: ThematicNormalizer,
    pub work_requests: WorkRequestService,
}

impl Connector {
    pub fn new(api: Arc<dyn FacilityApi>, slots: SlotConfig) -> Self {
        let resolver = ResourceResolver::new(api.clone());
        Self {
            availability: AvailabilityCalculator::new(api.clone(), resolver.clone(), slots),
            bookings: BookingWriter::new(api.clone()),
            thematics: ThematicNormalizer::new(api.clone()),
            work_requests: WorkRequestService::new(api.clone()),
            resolver,
            api,
        }
    }

    /// Probes ATAL; reports `"<status> - <body>"` whatever the status.
    pub async fn test_connection(&self) -> GatewayResult<String> {
        let (status, text) = self.api.get_text(PROBE_PATH).await?;
        Ok(format!("{} - {}", status, text))
    }

    pub async fn third_parties(&self, email: Option<&str>) -> GatewayResult<Value> {
        let query: Vec<(&str, String)> = email
            .map(|email| vec![("$filter", filter::email(email))])
            .unwrap_or_default();
        self.api.get(THIRD_PARTIES_PATH, &query).await
    }
}
