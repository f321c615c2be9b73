//! Replay a few toolbar events against a small dataset and print each snapshot

use seasonal_dash::{DashboardController, RawPoint, SeasonTag};
use std::sync::Arc;

fn main() {
    let raw = vec![
        RawPoint::new("2024-03-21", "spring", 14.0),
        RawPoint::new("2024-06-21", "summer", 27.5),
        RawPoint::new("2024-09-22", "autumn", 16.0),
        RawPoint::new("2024-12-21", "winter", 3.5),
        RawPoint::new("2025-03-20", "spring", 15.5),
    ];

    let mut controller = DashboardController::new();
    controller.subscribe(|view: &Arc<seasonal_dash::ViewModel>| {
        let active: Vec<&str> = view.active_seasons.iter().map(|s| s.as_str()).collect();
        println!(
            "rev {} [{}] points={} mean={:.2}",
            view.revision,
            active.join(","),
            view.kpis_overall.count,
            view.kpis_overall.mean
        );
    });

    if let Err(e) = controller.load(&raw) {
        eprintln!("Error: {e}");
        return;
    }

    controller.toggle(SeasonTag::Winter);
    controller.set_all(false);
    controller.toggle(SeasonTag::Spring);
}
