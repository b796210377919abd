use beacon_finder::domain::settings::SettingsService;
use beacon_finder::domain::sink::DisplaySink;
use beacon_finder::infrastructure::beacon::spawn_tracker;
use beacon_finder::infrastructure::logging::init_logger;
use beacon_finder::presentation::app::BeaconFinderApp;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    let settings = SettingsService::new()?;

    let _logging_guard = init_logger(&settings.get().log_settings)
        .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
        .ok();

    tracing::info!("Starting Beacon Finder");

    let (display, display_rx) = DisplaySink::channel();
    let tracker = spawn_tracker(settings.get(), display)?;
    let tracker_tx = tracker.commands();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 640.0])
            .with_title("Where Are You"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Beacon Finder",
        options,
        Box::new(move |cc| Ok(Box::new(BeaconFinderApp::new(cc, tracker_tx, display_rx)))),
    );

    tracker.shutdown();
    result.map_err(|e| anyhow::anyhow!("UI error: {}", e))
}
