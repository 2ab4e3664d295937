//! End-to-end attribution over aggregated tables.

use chrono::{Days, NaiveDate};
use kpiscope_drivers::DriverConfig;
use kpiscope_score::stats::mean;
use kpiscope_series::{AggregateConfig, AggregationMode, Granularity, NormalizedRow, PeriodTable, WindowPair};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];
const CHANNELS: [&str; 3] = ["web", "app", "store"];

fn random_rows(rng: &mut ChaCha8Rng, days: u64) -> Vec<NormalizedRow> {
    let base = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let mut rows = Vec::new();
    for d in 0..days {
        for _ in 0..rng.gen_range(1..6) {
            // Some segments skip days so absences are exercised.
            let region = REGIONS[rng.gen_range(0..REGIONS.len())];
            let channel = CHANNELS[rng.gen_range(0..CHANNELS.len())];
            let value = rng.gen_range(-20.0..200.0);
            rows.push(
                NormalizedRow::plain(base + Days::new(d), value)
                    .unwrap()
                    .with_dimension("region", region)
                    .with_dimension("channel", channel),
            );
        }
    }
    rows
}

fn total_change(windows: &WindowPair) -> f64 {
    mean(&windows.current.values()) - mean(&windows.previous.values())
}

fn prepare(rows: &[NormalizedRow], granularity: Granularity, n: usize) -> (PeriodTable, WindowPair) {
    let table = AggregateConfig::new(granularity, AggregationMode::Sum)
        .aggregate(rows)
        .unwrap();
    let windows = table.split(n).unwrap();
    (table, windows)
}

#[test]
fn sum_mode_contributions_reconcile_per_dimension() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let config = DriverConfig::new();

    for _ in 0..25 {
        let days = rng.gen_range(8..40);
        let rows = random_rows(&mut rng, days);
        let (table, windows) = prepare(&rows, Granularity::Day, 4);
        let total = total_change(&windows);
        let report = config.attribute(&table, &windows, total);

        for breakdown in report.breakdowns() {
            let sum: f64 = breakdown.categories.iter().map(|c| c.delta).sum();
            let tolerance = 1e-9 * total.abs().max(1.0);
            assert!(
                (sum - total).abs() <= tolerance,
                "{}: {sum} != {total}",
                breakdown.dimension
            );
            assert!(breakdown.residual.abs() <= tolerance);
        }
    }
}

#[test]
fn weekly_table_reconciles_and_ranks_by_magnitude() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let rows = random_rows(&mut rng, 70);
    let (table, windows) = prepare(&rows, Granularity::Week, 4);
    let total = total_change(&windows);
    let report = DriverConfig::new().attribute(&table, &windows, total);

    assert_eq!(report.breakdowns().len(), 2);
    let magnitudes: Vec<f64> = report.entries().iter().map(|e| e.impact_pct.abs()).collect();
    assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]));
    for entry in report.entries() {
        assert!(entry.volume_share >= 0.01);
        assert!(entry.previous_agg.is_finite() && entry.current_agg.is_finite());
    }
}

#[test]
fn attribution_is_deterministic() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let rows = random_rows(&mut rng, 20);
    let (table, windows) = prepare(&rows, Granularity::Day, 5);
    let total = total_change(&windows);
    let config = DriverConfig::new();
    assert_eq!(
        config.attribute(&table, &windows, total),
        config.attribute(&table, &windows, total)
    );
}

#[test]
fn raising_min_volume_share_only_removes_entries() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let rows = random_rows(&mut rng, 30);
    let (table, windows) = prepare(&rows, Granularity::Day, 6);
    let total = total_change(&windows);

    let loose = DriverConfig::new().with_min_volume_share(0.0).unwrap();
    let strict = DriverConfig::new().with_min_volume_share(0.3).unwrap();
    let all = loose.attribute(&table, &windows, total);
    let kept = strict.attribute(&table, &windows, total);

    assert_eq!(all.entries().len(), REGIONS.len() + CHANNELS.len());
    assert!(kept.entries().len() <= all.entries().len());
    for entry in kept.entries() {
        assert!(all.entries().contains(entry));
    }
    assert_eq!(all.breakdowns(), kept.breakdowns());
}
