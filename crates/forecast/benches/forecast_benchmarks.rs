use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Days, NaiveDate};
use stockcast_forecast::{
    ConsumptionEvent, DemandForecaster, FeatureBuilder, aggregate_daily, forecast_consumption,
};

/// History of `days` days with a weekly pattern and a few same-day repeats.
fn synthetic_history(days: u64) -> Vec<ConsumptionEvent> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut events = Vec::new();
    for offset in 0..days {
        let date = start.checked_add_days(Days::new(offset)).unwrap();
        let qty = [4, 2, 2, 3, 5, 1, 0][(offset % 7) as usize];
        if qty == 0 {
            continue;
        }
        events.push(ConsumptionEvent::new(format!("{date}T09:00:00"), qty));
        if offset % 3 == 0 {
            events.push(ConsumptionEvent::new(format!("{date} 16:30:00"), 1));
        }
    }
    events
}

fn bench_aggregate_and_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_and_features");

    for days in [30u64, 180, 730].iter() {
        let events = synthetic_history(*days);
        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(BenchmarkId::new("days", days), &events, |b, events| {
            let builder = FeatureBuilder::new(7, 7);
            b.iter(|| {
                let series = aggregate_daily(black_box(events)).series.unwrap();
                black_box(builder.build(&series).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_full_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_forecast");
    group.sample_size(10);

    for days in [30u64, 90, 365].iter() {
        let events = synthetic_history(*days);
        group.bench_with_input(BenchmarkId::new("history_days", days), &events, |b, events| {
            b.iter(|| black_box(forecast_consumption(black_box(events), 7)));
        });
    }

    group.finish();
}

fn bench_horizon_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("horizon_length");
    group.sample_size(10);

    let events = synthetic_history(120);
    let forecaster = DemandForecaster::default();
    for horizon in [1u32, 7, 30].iter() {
        group.bench_with_input(BenchmarkId::new("horizon", horizon), horizon, |b, &h| {
            b.iter(|| black_box(forecaster.forecast(&events, h)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_aggregate_and_features,
    bench_full_forecast,
    bench_horizon_length
);
criterion_main!(benches);
