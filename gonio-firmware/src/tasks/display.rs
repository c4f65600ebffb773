//! Snapshot consumer
//!
//! The renderer is not part of this firmware; this task is its stand-in
//! and reports every changed snapshot over the log.

use defmt::*;

use gonio_core::battery::BatteryLevel;
use gonio_core::controller::Snapshot;

use crate::channels::SNAPSHOT;

#[embassy_executor::task]
pub async fn display_task() {
    info!("Display task started");

    let mut last: Option<Snapshot> = None;

    loop {
        let snapshot = SNAPSHOT.wait().await;
        if last.as_ref() == Some(&snapshot) {
            continue;
        }

        info!(
            "{} | {} {} | {} deg | L {} R {} | battery {}% ({})",
            snapshot.state,
            snapshot.display_length(),
            snapshot.unit.symbol(),
            snapshot.angle_deg,
            snapshot.left.enabled,
            snapshot.right.enabled,
            snapshot.battery_percent,
            BatteryLevel::from_percent(snapshot.battery_percent),
        );
        if let Some(fault) = snapshot.fault {
            warn!("fault: {}", fault);
        }

        last = Some(snapshot);
    }
}
