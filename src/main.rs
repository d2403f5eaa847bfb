use eframe::egui;
use log::{error, info};

mod backend;
mod ui;

use ui::DiaryApp;

fn main() -> Result<(), eframe::Error> {
    // Initialize logging for debugging
    env_logger::init();
    info!("Starting diary application");

    // Create window options sized for a single column of entries
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 760.0])
            .with_min_inner_size([380.0, 480.0])
            .with_title("My Diary")
            .with_resizable(true),
        ..Default::default()
    };

    info!("Launching egui window");
    eframe::run_native(
        "My Diary",
        options,
        Box::new(|cc| {
            let app = DiaryApp::new(cc);

            // A failed storage probe is not fatal for the process: the app
            // still opens and shows a fixed error view instead of the diary.
            if let Some(message) = &app.startup_error {
                error!("Starting without storage: {}", message);
            }

            Ok(Box::new(app))
        }),
    )
}
