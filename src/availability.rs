// Free/busy computation for a resource family over a window of days.
//
// Known limitations kept for compatibility with existing forms:
// - only loans starting on or after the window's first day are fetched, so
//   a loan that started earlier and runs into the window is not seen;
// - hour slots compare the loan's dates and its hours-of-day separately,
//   not as one date-time range.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Timelike};
use tracing::{debug, info};

use crate::atal::{filter, Reservation, ResourceKind};
use crate::config::SlotConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::facility_api::{decode, FacilityApi};
use crate::model::{AvailabilitySlot, Granularity};
use crate::resolver::ResourceResolver;

pub struct AvailabilityCalculator {
    api: Arc<dyn FacilityApi>,
    resolver: ResourceResolver,
    slots: SlotConfig,
}

impl AvailabilityCalculator {
    pub fn new(api: Arc<dyn FacilityApi>, resolver: ResourceResolver, slots: SlotConfig) -> Self {
        Self {
            api,
            resolver,
            slots,
        }
    }

    /// Loans of the resource family starting on or after today + `delay_days`.
    pub async fn upcoming_reservations(
        &self,
        kind: ResourceKind,
        resource_id: i64,
        delay_days: i64,
    ) -> GatewayResult<Vec<Reservation>> {
        let from = offset_day(today(), delay_days)?;
        self.family_reservations(kind, resource_id, from).await
    }

    pub async fn compute_free_slots(
        &self,
        kind: ResourceKind,
        resource_id: i64,
        start_offset: i64,
        end_offset: i64,
        granularity: Granularity,
    ) -> GatewayResult<Vec<AvailabilitySlot>> {
        self.compute_free_slots_from(today(), kind, resource_id, start_offset, end_offset, granularity)
            .await
    }

    // Same as compute_free_slots with an explicit "today"
    pub async fn compute_free_slots_from(
        &self,
        today: NaiveDate,
        kind: ResourceKind,
        resource_id: i64,
        start_offset: i64,
        end_offset: i64,
        granularity: Granularity,
    ) -> GatewayResult<Vec<AvailabilitySlot>> {
        check_window(start_offset, end_offset, &self.slots)?;
        let from = offset_day(today, start_offset)?;
        let reservations = self.family_reservations(kind, resource_id, from).await?;
        let slots = build_slots(
            &reservations,
            today,
            start_offset,
            end_offset,
            granularity,
            &self.slots,
        )?;

        info!(
            resource_id,
            reservations = reservations.len(),
            slots = slots.len(),
            disabled = slots.iter().filter(|slot| slot.disabled).count(),
            "Computed availability"
        );
        Ok(slots)
    }

    async fn family_reservations(
        &self,
        kind: ResourceKind,
        resource_id: i64,
        from: NaiveDate,
    ) -> GatewayResult<Vec<Reservation>> {
        let family: Vec<i64> = self
            .resolver
            .resolve_family(kind, resource_id)
            .await?
            .into_iter()
            .collect();

        let path = kind.loans_path();
        let condition = filter::loans_from(kind.loan_field(), &family, from);
        debug!(path, filter = %condition, "Fetching loans");
        let value = self.api.get(path, &[("$filter", condition)]).await?;
        decode(path, value)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn check_window(start_offset: i64, end_offset: i64, config: &SlotConfig) -> GatewayResult<()> {
    let span = end_offset.saturating_sub(start_offset);
    if span > config.max_window_days {
        return Err(GatewayError::validation(format!(
            "availability window spans {} days, at most {} allowed",
            span, config.max_window_days
        )));
    }
    Ok(())
}

fn offset_day(today: NaiveDate, offset: i64) -> GatewayResult<NaiveDate> {
    Duration::try_days(offset)
        .and_then(|delta| today.checked_add_signed(delta))
        .ok_or_else(|| GatewayError::validation(format!("day offset out of range: {}", offset)))
}

/// Builds one slot per day (or per opening hour of each day) in
/// `[today + start_offset, today + end_offset]`, in chronological order.
pub fn build_slots(
    reservations: &[Reservation],
    today: NaiveDate,
    start_offset: i64,
    end_offset: i64,
    granularity: Granularity,
    config: &SlotConfig,
) -> GatewayResult<Vec<AvailabilitySlot>> {
    check_window(start_offset, end_offset, config)?;
    let first = offset_day(today, start_offset)?;
    let last = offset_day(today, end_offset)?;

    let mut slots = Vec::new();
    for date in first.iter_days().take_while(|date| *date <= last) {
        match granularity {
            Granularity::Day => {
                slots.push(AvailabilitySlot::day(date, day_is_taken(reservations, date)));
            }
            Granularity::Hour => {
                for hour in config.first_hour..config.last_hour.min(24) {
                    slots.push(AvailabilitySlot::hour(
                        date,
                        hour,
                        hour_is_taken(reservations, date, hour),
                    ));
                }
            }
        }
    }
    Ok(slots)
}

fn covers_date(reservation: &Reservation, date: NaiveDate) -> bool {
    reservation.start_date.date() <= date && date <= reservation.end_date.date()
}

pub fn day_is_taken(reservations: &[Reservation], date: NaiveDate) -> bool {
    reservations
        .iter()
        .any(|reservation| covers_date(reservation, date))
}

pub fn hour_is_taken(reservations: &[Reservation], date: NaiveDate, hour: u32) -> bool {
    reservations.iter().any(|reservation| {
        covers_date(reservation, date)
            && reservation.start_date.hour() <= hour
            && hour <= reservation.end_date.hour()
    })
}
