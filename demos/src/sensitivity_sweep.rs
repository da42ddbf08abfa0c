//! Sensitivity sweep example.
//!
//! Selects the columns once and re-runs detection across the recommended
//! threshold range, the way an interactive slider would.
//!
//! Run with:
//! ```bash
//! cargo run --example sensitivity_sweep
//! ```

use anomaly_watch::analyzers::{
    AnomalyType, SensitivityLevel, RECOMMENDED_MAX_THRESHOLD, RECOMMENDED_MIN_THRESHOLD,
};
use anomaly_watch::prelude::*;
use anomaly_watch::sources::parse_csv;
use anomaly_watch_demos::sample_series;

fn main() -> Result<()> {
    let mut session = AnalysisSession::new(parse_csv(&sample_series()));
    session.select_columns("order_date", "total_revenue")?;

    if let Some(stats) = session.statistics() {
        println!(
            "{} points, mean {:.2}, std dev {:.2}\n",
            stats.count, stats.mean, stats.std_dev
        );
    }

    println!("{:>9}  {:<10}  {:>6}  {:>4}", "threshold", "level", "spikes", "dips");
    let mut threshold = RECOMMENDED_MIN_THRESHOLD;
    while threshold <= RECOMMENDED_MAX_THRESHOLD + f64::EPSILON {
        let points = session.detect(threshold)?;
        let count = |kind: AnomalyType| points.iter().filter(|p| p.anomaly_type() == kind).count();
        println!(
            "{threshold:>9.2}  {:<10}  {:>6}  {:>4}",
            SensitivityLevel::from_threshold(threshold).label(),
            count(AnomalyType::Spike),
            count(AnomalyType::Dip)
        );
        threshold += 0.25;
    }

    let report = session.report(2.5)?;
    println!("\n{}", report.insights.narrative);
    Ok(())
}
