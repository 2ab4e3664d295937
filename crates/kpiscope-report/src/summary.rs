//! Plain-language summaries of a scored change and its drivers.

use kpiscope_drivers::DriverEntry;
use kpiscope_score::{ChangeMetrics, Direction, StrengthLabel};

/// Drivers listed per side of the change.
const DRIVERS_PER_SIDE: usize = 2;

/// Two sentences describing one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// What changed and how reliable it looks.
    pub change: String,
    /// Which segments moved the metric.
    pub drivers: String,
}

/// Describe `metrics` and the ranked `drivers` in plain text.
///
/// Pure and deterministic: equal inputs always give equal strings.
/// `drivers` is expected in ranked order, as returned by
/// [`DriverReport::entries`](kpiscope_drivers::DriverReport::entries).
#[must_use]
pub fn summarize(metric_name: &str, metrics: &ChangeMetrics, drivers: &[DriverEntry]) -> Summary {
    Summary {
        change: change_text(metric_name, metrics),
        drivers: driver_text(drivers),
    }
}

fn change_text(metric_name: &str, metrics: &ChangeMetrics) -> String {
    let mut text = match metrics.direction {
        Direction::Flat => format!(
            "{metric_name} was essentially flat ({:.2} vs {:.2}).",
            metrics.current_mean, metrics.previous_mean
        ),
        direction => {
            let relative = metrics
                .rel_delta
                .map_or_else(|| "relative change undefined".to_string(), |r| format!("{:+.1}%", 100.0 * r));
            format!(
                "{metric_name} moved {direction} from {:.2} to {:.2} ({relative}).",
                metrics.previous_mean, metrics.current_mean
            )
        }
    };

    if metrics.any_change_detected {
        let mut parts = Vec::new();
        if metrics.level_label != StrengthLabel::None {
            parts.push(format!(
                "a {} level change ({})",
                metrics.level_label, metrics.direction
            ));
        }
        if metrics.trend_label != StrengthLabel::None {
            parts.push(format!("a {} trend change", metrics.trend_label));
        }
        if parts.is_empty() {
            parts.push("a detectable but weak change".to_string());
        }
        text.push_str(&format!(" The data shows {}.", parts.join(" and ")));
    } else {
        text.push_str(" No meaningful change detected.");
    }

    text.push(' ');
    text.push_str(&metrics.reliability_note);
    text
}

fn driver_text(drivers: &[DriverEntry]) -> String {
    if drivers.is_empty() {
        return "No individual segments stand out as major drivers in the data.".to_string();
    }

    let positive: Vec<&DriverEntry> = drivers
        .iter()
        .filter(|d| d.abs_contribution > 0.0)
        .take(DRIVERS_PER_SIDE)
        .collect();
    let negative: Vec<&DriverEntry> = drivers
        .iter()
        .filter(|d| d.abs_contribution < 0.0)
        .take(DRIVERS_PER_SIDE)
        .collect();

    let mut lines = Vec::new();
    for (heading, side) in [("positive", &positive), ("negative", &negative)] {
        if side.is_empty() {
            continue;
        }
        lines.push(format!("The largest {heading} contributions come from:"));
        lines.extend(side.iter().map(|d| {
            format!(
                "- {} / {} ({:+.2}, ~{:.1}% of the total change, {}).",
                d.dimension, d.category, d.abs_contribution, d.impact_pct, d.strength
            )
        }));
    }

    if lines.is_empty() {
        return "The change is spread across many small segments rather than a few dominant ones."
            .to_string();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use kpiscope_score::EffectSize;

    use super::*;

    fn metrics() -> ChangeMetrics {
        ChangeMetrics {
            current_mean: 150.0,
            previous_mean: 100.0,
            abs_delta: 50.0,
            rel_delta: Some(0.5),
            direction: Direction::Up,
            level_score: EffectSize::Unbounded { positive: true },
            trend_score: EffectSize::Finite(0.0),
            level_label: StrengthLabel::Strong,
            trend_label: StrengthLabel::None,
            previous_slope: 0.0,
            current_slope: 0.0,
            slope_delta: 0.0,
            slope_direction_changed: false,
            current_cv: Some(0.0),
            trustworthy: true,
            reliability_note: "Reliable.".to_string(),
            any_change_detected: true,
            notes: Vec::new(),
        }
    }

    fn entry(category: &str, contribution: f64, impact_pct: f64) -> DriverEntry {
        DriverEntry {
            dimension: "segment".to_string(),
            category: category.to_string(),
            impact_pct,
            abs_contribution: contribution,
            direction: if contribution > 0.0 { Direction::Up } else { Direction::Down },
            strength: StrengthLabel::Moderate,
            previous_agg: 10.0,
            current_agg: 10.0 + contribution,
            volume_share: 0.25,
            effect_size: EffectSize::Finite(0.6),
        }
    }

    #[test]
    fn change_text_names_direction_and_labels() {
        let summary = summarize("revenue", &metrics(), &[]);
        assert_eq!(
            summary.change,
            "revenue moved up from 100.00 to 150.00 (+50.0%). \
             The data shows a strong level change (up). Reliable."
        );
    }

    #[test]
    fn zero_baseline_is_described() {
        let mut m = metrics();
        m.previous_mean = 0.0;
        m.rel_delta = None;
        let summary = summarize("signups", &m, &[]);
        assert!(summary.change.contains("relative change undefined"));
    }

    #[test]
    fn no_change_and_no_drivers() {
        let mut m = metrics();
        m.direction = Direction::Flat;
        m.level_label = StrengthLabel::None;
        m.any_change_detected = false;
        let summary = summarize("orders", &m, &[]);
        assert!(summary.change.starts_with("orders was essentially flat"));
        assert!(summary.change.contains("No meaningful change detected."));
        assert_eq!(
            summary.drivers,
            "No individual segments stand out as major drivers in the data."
        );
    }

    #[test]
    fn lists_two_drivers_per_side() {
        let drivers = vec![
            entry("A", 40.0, 80.0),
            entry("B", 20.0, 40.0),
            entry("C", -8.0, -16.0),
            entry("D", 5.0, 10.0),
        ];
        let text = summarize("revenue", &metrics(), &drivers).drivers;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "The largest positive contributions come from:");
        assert!(lines[1].starts_with("- segment / A (+40.00, ~80.0%"));
        assert!(lines[2].contains("/ B "));
        assert_eq!(lines[3], "The largest negative contributions come from:");
        assert!(lines[4].contains("/ C (-8.00, ~-16.0%"));
        assert!(!text.contains("/ D "));
    }

    #[test]
    fn zero_contributions_fall_back_to_spread_sentence() {
        let text = summarize("revenue", &metrics(), &[entry("A", 0.0, 0.0)]).drivers;
        assert!(text.contains("many small segments"));
    }

    #[test]
    fn is_deterministic() {
        let drivers = vec![entry("A", 3.0, 60.0), entry("B", -1.0, -20.0)];
        assert_eq!(
            summarize("m", &metrics(), &drivers),
            summarize("m", &metrics(), &drivers)
        );
    }
}
