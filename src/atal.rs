// Data structures for the ATAL REST API (PascalCase JSON)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Collection pair a loanable resource lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceKind {
    #[default]
    Room,
    Material,
}

impl ResourceKind {
    pub fn resources_path(self) -> &'static str {
        match self {
            ResourceKind::Room => "/api/Rooms",
            ResourceKind::Material => "/api/Materials",
        }
    }

    pub fn resource_path(self, id: i64) -> String {
        format!("{}/{}", self.resources_path(), id)
    }

    pub fn loans_path(self) -> &'static str {
        match self {
            ResourceKind::Room => "/api/RoomLoans",
            ResourceKind::Material => "/api/MaterialLoans",
        }
    }

    // Field holding the resource id on a loan
    pub fn loan_field(self) -> &'static str {
        match self {
            ResourceKind::Room => "RoomId",
            ResourceKind::Material => "MaterialId",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "room" | "rooms" | "salle" => Some(ResourceKind::Room),
            "material" | "materials" | "materiel" => Some(ResourceKind::Material),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub is_loanable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RequestState {
    Pending,
    Accepted,
    Refused,
    Cancelled,
}

/// A room or material loan as stored by ATAL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    pub id: i64,
    #[serde(alias = "RoomId", alias = "MaterialId")]
    pub resource_id: i64,
    #[serde(with = "atal_datetime")]
    pub start_date: NaiveDateTime,
    #[serde(with = "atal_datetime")]
    pub end_date: NaiveDateTime,
    #[serde(default)]
    pub request_state: Option<RequestState>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thematic {
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub complete_label: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub is_archived: bool,
}

/// Loan creation payload posted to `RoomLoans` / `MaterialLoans`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoanCreation {
    #[serde(flatten)]
    pub target: LoanTarget,
    #[serde(with = "atal_datetime")]
    pub start_date: NaiveDateTime,
    #[serde(with = "atal_datetime")]
    pub end_date: NaiveDateTime,
    pub planned_people_number: i64,
    pub real_people_number: i64,
    pub requester_id: i64,
    pub pricing: LoanPricing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoanTarget {
    RoomId(i64),
    MaterialId(i64),
}

impl LoanTarget {
    pub fn new(kind: ResourceKind, id: i64) -> Self {
        match kind {
            ResourceKind::Room => LoanTarget::RoomId(id),
            ResourceKind::Material => LoanTarget::MaterialId(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoanPricing {
    pub amount: f64,
    pub deposit: f64,
    pub discount: f64,
    pub vat_rate: f64,
}

// OData filter fragments understood by ATAL
pub mod filter {
    use chrono::NaiveDate;

    pub fn loanable() -> String {
        "IsLoanable eq true".to_string()
    }

    pub fn loanable_with_id(id: i64) -> String {
        format!("Id eq {} and {}", id, loanable())
    }

    pub fn loanable_children_of(parent_id: i64) -> String {
        format!("ParentId eq {} and {}", parent_id, loanable())
    }

    pub fn loans_from(field: &str, ids: &[i64], from: NaiveDate) -> String {
        let ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{} in ({}) and StartDate ge {}",
            field,
            ids,
            from.format("%Y-%m-%dT00:00:00")
        )
    }

    pub fn email(email: &str) -> String {
        format!("Email eq '{}'", email.replace('\'', "''"))
    }
}

// ATAL sends local wall-clock times, sometimes suffixed with an offset.
pub mod atal_datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        raw.parse::<NaiveDateTime>()
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_local()))
            .map_err(|e| format!("invalid ATAL date-time {:?}: {}", raw, e))
    }
}
