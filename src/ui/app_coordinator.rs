//! # App Coordinator Module
//!
//! The frame loop: drains background photo reads, runs the one-time startup
//! load, renders the entry list with its fixed control row, and applies the
//! actions the rows emitted. When the startup storage probe failed, a fixed
//! error view replaces the whole diary and nothing else runs.

use eframe::egui;
use log::info;

use crate::ui::app_state::{DiaryApp, EntryAction};
use crate::ui::components;

impl eframe::App for DiaryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        components::apply_diary_style(ctx);

        if self.startup_error.is_some() {
            self.render_storage_error(ctx);
            return;
        }

        // Completions from photo reads started on earlier frames
        self.poll_photo_reads();

        // Populate the view from the store once, at startup
        if !self.loaded {
            self.load_all();
        }

        let mut actions: Vec<EntryAction> = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("📖 My Diary");
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (index, entry) in self.entries.iter_mut().enumerate() {
                        components::entry_row(ui, index, entry, &mut actions);
                    }

                    ui.add_space(8.0);

                    // Fixed control row, always after the last entry
                    ui.horizontal(|ui| {
                        if ui.button("➕ Add entry").clicked() {
                            actions.push(EntryAction::AddText);
                        }
                        if ui.button("📷 Add photo").clicked() {
                            actions.push(EntryAction::PickPhoto);
                        }
                    });
                });
        });

        let wants_photo = actions.contains(&EntryAction::PickPhoto);
        self.apply_frame_actions(&actions);
        if wants_photo {
            self.pick_photo();
        }
    }
}

impl DiaryApp {
    /// Open the native file picker and start reading the chosen photo.
    fn pick_photo(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
            .pick_file();

        match picked {
            Some(path) => self.request_photo_entry(path),
            None => info!("Photo selection cancelled"),
        }
    }

    /// Fixed full-window error view shown when storage is unavailable.
    /// There is no retry; the session simply runs without persistence.
    fn render_storage_error(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.heading("Error: local storage is not available!");
                ui.add_space(12.0);
                if let Some(message) = &self.startup_error {
                    ui.label(message);
                }
                ui.label("Diary entries cannot be saved or loaded in this session.");
            });
        });
    }
}
