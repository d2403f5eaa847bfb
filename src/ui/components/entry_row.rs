//! # Entry Row
//!
//! Renders one diary entry: an editable text surface or an inline photo,
//! plus the delete button. Rows never touch the store; whatever the user did
//! is pushed onto the frame's action list and applied after the render pass.

use eframe::egui;

use crate::ui::app_state::{EntryAction, EntryContent, EntryViewState};

const DELETE_COLUMN_WIDTH: f32 = 40.0;

/// Render one diary row and record whatever the user did to it.
pub fn entry_row(
    ui: &mut egui::Ui,
    index: usize,
    entry: &mut EntryViewState,
    actions: &mut Vec<EntryAction>,
) {
    ui.group(|ui| {
        ui.horizontal_top(|ui| {
            let content_width = ui.available_width() - DELETE_COLUMN_WIDTH;

            match &mut entry.content {
                EntryContent::Text {
                    buffer,
                    dirty,
                    request_focus,
                } => {
                    let response = ui.add(
                        egui::TextEdit::multiline(buffer)
                            .desired_rows(5)
                            .desired_width(content_width)
                            .hint_text("(new entry)"),
                    );

                    // New entries get the keyboard to encourage typing
                    if *request_focus {
                        response.request_focus();
                        *request_focus = false;
                    }

                    if response.changed() {
                        *dirty = true;
                    }

                    // Commit on focus loss, and only when something changed,
                    // so an abandoned empty entry never reaches the store
                    if response.lost_focus() && *dirty {
                        actions.push(EntryAction::CommitText(index));
                    }
                }
                EntryContent::Image { bytes } => {
                    let uri = format!("bytes://{}", entry.key);
                    ui.add(
                        egui::Image::from_bytes(uri, egui::load::Bytes::Shared(bytes.clone()))
                            .max_width(content_width)
                            .max_height(320.0),
                    );
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                let delete_button = ui
                    .button(egui::RichText::new("✕").size(16.0))
                    .on_hover_text("Delete entry");
                if delete_button.clicked() {
                    actions.push(EntryAction::Delete(index));
                }
            });
        });
    });
}
