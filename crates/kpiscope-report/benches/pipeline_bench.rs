//! Criterion benchmarks for kpiscope-report: aggregation plus the full analysis run.

use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use kpiscope_report::{AnalysisConfig, AnalysisRequest, analyze_batch};
use kpiscope_series::{AggregateConfig, AggregationMode, Granularity, NormalizedRow};

fn make_rows(days: u64, rows_per_day: usize, seed: u64) -> Vec<NormalizedRow> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let base = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let regions = ["north", "south", "east", "west"];
    let channels = ["web", "app", "store", "partner", "phone"];
    (0..days)
        .flat_map(|d| (0..rows_per_day).map(move |_| d))
        .map(|d| {
            NormalizedRow::plain(base + Days::new(d), rng.gen_range(0.0..500.0))
                .unwrap()
                .with_dimension("region", regions[rng.gen_range(0..regions.len())])
                .with_dimension("channel", channels[rng.gen_range(0..channels.len())])
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for &days in &[90u64, 365, 730] {
        let rows = make_rows(days, 20, days);
        for granularity in [Granularity::Day, Granularity::Week] {
            let config = AggregateConfig::new(granularity, AggregationMode::Sum);
            let id = BenchmarkId::new(format!("days{days}"), granularity.as_str());
            group.bench_with_input(id, &rows, |bencher, rows| {
                bencher.iter(|| config.aggregate(rows).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let rows = make_rows(365, 20, 1);
    let config = AnalysisConfig::new(Granularity::Day, 28, AggregationMode::Sum).unwrap();

    c.bench_function("analysis_run_365d_x20_w28", |b| {
        b.iter(|| config.run(&rows).unwrap());
    });
}

fn bench_batch(c: &mut Criterion) {
    let inputs: Vec<Vec<NormalizedRow>> = (0..8).map(|i| make_rows(365, 10, i)).collect();
    let config = AnalysisConfig::new(Granularity::Week, 8, AggregationMode::Mean).unwrap();
    let requests: Vec<AnalysisRequest<'_>> = inputs
        .iter()
        .map(|rows| AnalysisRequest { config: &config, rows })
        .collect();

    c.bench_function("analyze_batch_8x365d_w8", |b| {
        b.iter(|| analyze_batch(&requests));
    });
}

criterion_group!(benches, bench_aggregate, bench_run, bench_batch);
criterion_main!(benches);
