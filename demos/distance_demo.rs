//! Demonstration of distance cycles against mock platform services

use gps_distance::core::constants::FINE_LOCATION_PERMISSION;
use gps_distance::platform::GrantResult;
use gps_distance::{
    AppConfig, DistanceTracker, GeoPosition, MockLocationGateway, MockPermissionGate,
    PermissionResponse, PermissionState, RecordingHost,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== GPS Distance Tracker - Demo ===\n");

    let store_dir = tempfile::tempdir()?;
    let config = AppConfig {
        store_dir: store_dir.path().to_path_buf(),
        ..Default::default()
    };

    let location = MockLocationGateway::new();
    let permission = MockPermissionGate::new(PermissionState::NotDetermined);
    let host = RecordingHost::new();
    let tracker = DistanceTracker::open(
        &config,
        Box::new(location.clone()),
        Box::new(permission.clone()),
        Arc::new(host.clone()),
    )?;

    println!("1. First fix (permission prompt answered with Granted):");
    permission.queue_response(PermissionResponse::single(
        FINE_LOCATION_PERMISSION,
        GrantResult::Granted,
    ));
    location.queue_fix(GeoPosition::new(52.520008, 13.404954)?);
    tracker.trigger();
    print_last_dialog(&host);

    println!("2. Second fix in Paris:");
    location.queue_fix(GeoPosition::new(48.856613, 2.352222)?);
    tracker.trigger();
    print_last_dialog(&host);

    println!("3. Fix request that never answers:");
    tracker.trigger();
    println!("   Busy: {}", host.is_busy());
    tracker.poll_timeout_at(std::time::Instant::now() + config.fix_timeout());
    print_last_dialog(&host);

    if let Some(position) = tracker.stored_position()? {
        println!("Stored fix: {}", position);
    }
    println!("Formatter check: {}", tracker.formatter().format(1_234_567));

    Ok(())
}

fn print_last_dialog(host: &RecordingHost) {
    if let Some(dialog) = host.last_dialog() {
        println!("   [{}] {} ({})\n", dialog.title(), dialog.message, dialog.ack_label());
    }
}
