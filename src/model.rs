// Gateway-facing data structures returned to (or received from) the front office

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::atal::{self, RequestState, Reservation, Resource, Thematic};
use crate::error::{GatewayError, GatewayResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Hour,
}

/// One booking request line as entered in the form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BookingInterval {
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
}

impl BookingInterval {
    pub fn new(start_date: &str, start_time: &str, end_date: &str, end_time: &str) -> Self {
        Self {
            start_date: start_date.to_string(),
            start_time: start_time.to_string(),
            end_date: end_date.to_string(),
            end_time: end_time.to_string(),
        }
    }

    pub fn start(&self) -> GatewayResult<NaiveDateTime> {
        parse_instant(&self.start_date, &self.start_time)
    }

    pub fn end(&self) -> GatewayResult<NaiveDateTime> {
        parse_instant(&self.end_date, &self.end_time)
    }
}

/// A booking interval after absorbing the contiguous ones that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergedInterval {
    #[serde(with = "atal::atal_datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "atal::atal_datetime")]
    pub end: NaiveDateTime,
}

impl TryFrom<&BookingInterval> for MergedInterval {
    type Error = GatewayError;

    fn try_from(interval: &BookingInterval) -> Result<Self, Self::Error> {
        let start = interval.start()?;
        let end = interval.end()?;
        if end < start {
            return Err(GatewayError::validation(format!(
                "booking interval ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySlot {
    pub id: String,
    pub text: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub disabled: bool,
}

impl AvailabilitySlot {
    pub fn day(date: NaiveDate, disabled: bool) -> Self {
        let date_id = date.format(DATE_FORMAT).to_string();
        Self {
            id: date_id.clone(),
            text: date.format("%d/%m/%Y").to_string(),
            start_date: date_id.clone(),
            start_time: "00:00".to_string(),
            end_date: date_id,
            end_time: "23:59".to_string(),
            disabled,
        }
    }

    pub fn hour(date: NaiveDate, hour: u32, disabled: bool) -> Self {
        let date_id = date.format(DATE_FORMAT).to_string();
        let start_time = format!("{:02}:00", hour);
        let end_time = format!("{:02}:59", hour);
        Self {
            id: format!("{} {}", date_id, start_time),
            text: format!("{} {}-{}", date.format("%d/%m/%Y"), start_time, end_time),
            start_date: date_id.clone(),
            start_time,
            end_date: date_id,
            end_time,
            disabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub id: i64,
    pub text: String,
    pub parent_id: Option<i64>,
}

impl From<Resource> for ResourceEntry {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id,
            text: resource.name,
            parent_id: resource.parent_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationEntry {
    pub id: i64,
    pub resource_id: i64,
    #[serde(with = "atal::atal_datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "atal::atal_datetime")]
    pub end: NaiveDateTime,
    pub request_state: Option<RequestState>,
}

impl From<Reservation> for ReservationEntry {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            resource_id: reservation.resource_id,
            start: reservation.start_date,
            end: reservation.end_date,
            request_state: reservation.request_state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThematicEntry {
    pub id: i64,
    pub text: String,
    pub label: String,
    pub complete_label: String,
    pub parent_id: Option<i64>,
}

impl From<Thematic> for ThematicEntry {
    fn from(thematic: Thematic) -> Self {
        Self {
            id: thematic.id,
            text: thematic.complete_label.clone(),
            label: thematic.label,
            complete_label: thematic.complete_label,
            parent_id: thematic.parent_id,
        }
    }
}

fn parse_instant(date: &str, time: &str) -> GatewayResult<NaiveDateTime> {
    let date = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date.trim(), format).ok())
        .ok_or_else(|| GatewayError::validation(format!("invalid date: {:?}", date)))?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time.trim(), format).ok())
        .ok_or_else(|| GatewayError::validation(format!("invalid time: {:?}", time)))?;
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test_case("2024-01-01", "10:00", at(2024, 1, 1, 10, 0); "iso date")]
    #[test_case("01/01/2024", "10:00", at(2024, 1, 1, 10, 0); "french date")]
    #[test_case("2024-01-01", "10:30:00", at(2024, 1, 1, 10, 30); "time with seconds")]
    fn test_interval_start_parsing(date: &str, time: &str, expected: NaiveDateTime) {
        let interval = BookingInterval::new(date, time, date, "23:59");
        assert_eq!(interval.start().unwrap(), expected);
    }

    #[test_case("2024-13-01", "10:00"; "bad month")]
    #[test_case("2024-01-01", "25:00"; "bad hour")]
    #[test_case("", "10:00"; "empty date")]
    fn test_invalid_interval_is_a_validation_error(date: &str, time: &str) {
        let interval = BookingInterval::new(date, time, "2024-01-01", "23:59");
        assert!(matches!(interval.start(), Err(GatewayError::Validation(_))));
    }

    #[test]
    fn test_inverted_interval_is_rejected() {
        let interval = BookingInterval::new("2024-01-01", "11:00", "2024-01-01", "10:00");
        assert!(matches!(
            MergedInterval::try_from(&interval),
            Err(GatewayError::Validation(_))
        ));
    }

    #[test]
    fn test_hour_slot_fields_are_reusable_as_booking_interval() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let slot = AvailabilitySlot::hour(date, 9, false);
        assert_eq!(slot.id, "2024-02-29 09:00");
        assert_eq!(slot.text, "29/02/2024 09:00-09:59");

        let interval =
            BookingInterval::new(&slot.start_date, &slot.start_time, &slot.end_date, &slot.end_time);
        let merged = MergedInterval::try_from(&interval).unwrap();
        assert_eq!(merged.start, at(2024, 2, 29, 9, 0));
        assert_eq!(merged.end, at(2024, 2, 29, 9, 59));
    }

    #[test]
    fn test_thematic_entry_uses_complete_label_as_text() {
        let entry = ThematicEntry::from(Thematic {
            id: 3,
            label: "Voirie".to_string(),
            complete_label: "Travaux > Voirie".to_string(),
            parent_id: Some(1),
            is_archived: false,
        });
        assert_eq!(entry.text, "Travaux > Voirie");
        assert_eq!(entry.label, "Voirie");
        assert_eq!(entry.parent_id, Some(1));
    }
}
