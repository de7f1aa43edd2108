// Works requests submitted from the front office to ATAL

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{GatewayError, GatewayResult};
use crate::facility_api::FacilityApi;

pub const WORKS_REQUESTS_PATH: &str = "/api/WorksRequests";

// Field names as posted by the form
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkRequestForm {
    pub atal_requester_id: i64,
    pub atal_object: String,
    pub atal_description: String,
    pub atal_recipient_id: i64,
    pub atal_requesting_department_id: i64,
    pub atal_request_type: i64,
    pub atal_localization: String,
    pub atal_longitude: f64,
    pub atal_latitude: f64,
    #[serde(default)]
    pub atal_operator: Option<String>,
    #[serde(default)]
    pub atal_desired_date: Option<String>,
    #[serde(default)]
    pub atal_request_date: Option<String>,
    #[serde(default)]
    pub atal_patrimony_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AtalWorkRequest {
    pub requester_id: i64,
    pub object: String,
    pub description: String,
    pub recipient_id: i64,
    pub requesting_department_id: i64,
    pub request_type: i64,
    pub localization: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patrimony_id: Option<i64>,
}

impl From<WorkRequestForm> for AtalWorkRequest {
    fn from(form: WorkRequestForm) -> Self {
        Self {
            requester_id: form.atal_requester_id,
            object: form.atal_object,
            description: form.atal_description,
            recipient_id: form.atal_recipient_id,
            requesting_department_id: form.atal_requesting_department_id,
            request_type: form.atal_request_type,
            localization: form.atal_localization,
            longitude: form.atal_longitude,
            latitude: form.atal_latitude,
            operator: form.atal_operator,
            desired_date: form.atal_desired_date,
            request_date: form.atal_request_date,
            patrimony_id: form.atal_patrimony_id,
        }
    }
}

impl WorkRequestForm {
    pub fn from_body(body: &Value) -> GatewayResult<Self> {
        Self::deserialize(body)
            .map_err(|e| GatewayError::validation(format!("invalid works request: {}", e)))
    }
}

pub struct WorkRequestService {
    api: Arc<dyn FacilityApi>,
}

impl WorkRequestService {
    pub fn new(api: Arc<dyn FacilityApi>) -> Self {
        Self { api }
    }

    pub async fn create(&self, body: &Value) -> GatewayResult<Value> {
        let request = AtalWorkRequest::from(WorkRequestForm::from_body(body)?);
        let payload = serde_json::to_value(&request)
            .map_err(|e| GatewayError::encoding("works request", e))?;
        let created = self.api.post(WORKS_REQUESTS_PATH, &payload).await?;
        info!(requester_id = request.requester_id, "Works request created");
        Ok(created)
    }
}
