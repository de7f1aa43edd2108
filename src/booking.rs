// Writes merged intervals to ATAL as loan requests, one call per interval.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::atal::{LoanCreation, LoanPricing, LoanTarget, ResourceKind};
use crate::error::{GatewayError, GatewayResult};
use crate::facility_api::FacilityApi;
use crate::model::MergedInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingParty {
    pub people_planned: i64,
    pub people_actual: i64,
    pub third_party_id: i64,
}

pub struct BookingWriter {
    api: Arc<dyn FacilityApi>,
}

impl BookingWriter {
    pub fn new(api: Arc<dyn FacilityApi>) -> Self {
        Self { api }
    }

    /// Creates one loan per interval, sequentially and in input order. The
    /// first failure aborts the run; loans created before it are kept.
    pub async fn book(
        &self,
        kind: ResourceKind,
        resource_id: i64,
        intervals: &[MergedInterval],
        party: BookingParty,
    ) -> GatewayResult<Vec<Value>> {
        let path = kind.loans_path();
        let mut created = Vec::with_capacity(intervals.len());

        for interval in intervals {
            let payload = LoanCreation {
                target: LoanTarget::new(kind, resource_id),
                start_date: interval.start,
                end_date: interval.end,
                planned_people_number: party.people_planned,
                real_people_number: party.people_actual,
                requester_id: party.third_party_id,
                pricing: LoanPricing::default(),
            };
            let body = serde_json::to_value(&payload)
                .map_err(|e| GatewayError::encoding("loan request", e))?;

            match self.api.post(path, &body).await {
                Ok(result) => created.push(result),
                Err(error) => {
                    warn!(
                        resource_id,
                        created = created.len(),
                        requested = intervals.len(),
                        error.message = %error,
                        "Loan creation aborted"
                    );
                    return Err(error);
                }
            }
        }

        info!(resource_id, loans = created.len(), "Loans created");
        Ok(created)
    }
}
