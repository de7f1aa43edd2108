use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use atal_gateway::{build_slots, merge, BookingInterval, Granularity, Reservation, SlotConfig};

// Hour-long requests, every other one contiguous with the previous
fn booking_requests(count: usize) -> Vec<BookingInterval> {
    let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    (0..count)
        .map(|i| {
            let date = (day + Duration::days((i / 10) as i64)).format("%Y-%m-%d").to_string();
            let hour = 8 + (i % 10) as u32;
            let gap = if i % 2 == 0 { 0 } else { 1 };
            BookingInterval::new(
                &date,
                &format!("{:02}:00", hour),
                &date,
                &format!("{:02}:{:02}", hour, 59 - gap),
            )
        })
        .collect()
}

fn reservations(count: usize) -> Vec<Reservation> {
    let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    (0..count)
        .map(|i| {
            let date = day + Duration::days(i as i64 * 3);
            Reservation {
                id: i as i64,
                resource_id: 12,
                start_date: date.and_hms_opt(9, 0, 0).unwrap(),
                end_date: date.and_hms_opt(11, 59, 0).unwrap(),
                request_state: None,
            }
        })
        .collect()
}

pub fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_intervals");

    for count in [10, 100, 1000].iter() {
        let requests = booking_requests(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &requests, |b, requests| {
            b.iter(|| merge(black_box(requests)).unwrap());
        });
    }

    group.finish();
}

pub fn slot_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_slots");
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let config = SlotConfig::default();
    let loans = reservations(50);

    for (name, granularity) in [("day", Granularity::Day), ("hour", Granularity::Hour)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                build_slots(black_box(&loans), today, 0, 180, granularity, &config).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, merge_benchmark, slot_benchmark);
criterion_main!(benches);
