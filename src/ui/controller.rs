//! # Entry Lifecycle
//!
//! The operations behind the UI: creating text and photo entries, committing
//! text edits, deleting entries, and loading everything stored at startup.
//! All of it is egui-free so the whole lifecycle is unit-testable.
//!
//! A text entry starts unsaved: its key is allocated immediately but nothing
//! reaches the store until the first commit, so an abandoned entry leaves no
//! record. Photo entries persist atomically when their file read completes.

use std::path::{Path, PathBuf};
use std::thread;

use anyhow::Context;
use log::{error, info, warn};

use crate::backend::domain::{self, DiaryItem, ItemKind};
use crate::ui::app_state::{
    DiaryApp, EntryAction, EntryContent, EntryViewState, PhotoPayload, PhotoReadResult,
};

impl DiaryApp {
    /// Apply the actions one render pass collected: commits first (row
    /// indices are still valid), then deletes from the highest index down,
    /// then additions. `PickPhoto` is not handled here; it needs the native
    /// file dialog, which the frame loop owns.
    pub fn apply_frame_actions(&mut self, actions: &[EntryAction]) {
        for action in actions {
            if let EntryAction::CommitText(index) = action {
                self.commit_text_entry(*index);
            }
        }

        let mut deletions: Vec<usize> = actions
            .iter()
            .filter_map(|action| match action {
                EntryAction::Delete(index) => Some(*index),
                _ => None,
            })
            .collect();
        deletions.sort_unstable_by(|a, b| b.cmp(a));
        deletions.dedup();
        for index in deletions {
            self.delete_entry(index);
        }

        for action in actions {
            if let EntryAction::AddText = action {
                self.create_text_entry();
            }
        }
    }

    /// Append a fresh, empty, focused text entry at the end of the list.
    /// The store is not touched until the entry's first commit.
    pub fn create_text_entry(&mut self) {
        if self.backend.is_none() {
            return;
        }
        let key = domain::allocate_entry_key();
        info!("📝 New text entry {}", key);
        self.entries
            .push(EntryViewState::new_text(key, String::new(), true));
    }

    /// Persist a text entry's current buffer under its key, overwriting any
    /// previous value. Does nothing unless the buffer changed since the last
    /// write.
    pub fn commit_text_entry(&mut self, index: usize) {
        let Some(backend) = &self.backend else { return };
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        let EntryViewState { key, content } = entry;
        let EntryContent::Text { buffer, dirty, .. } = content else {
            return;
        };
        if !*dirty {
            return;
        }

        let serialized = domain::encode_item(ItemKind::Text, buffer);
        match backend.store().set(key, &serialized) {
            Ok(()) => {
                *dirty = false;
                info!("Saved entry {}", key);
            }
            Err(e) => error!("Failed to save entry {}: {:#}", key, e),
        }
    }

    /// Start reading a picked photo file on a worker thread. The UI stays
    /// responsive; the completion arrives through the channel and is picked
    /// up by [`DiaryApp::poll_photo_reads`].
    pub fn request_photo_entry(&mut self, path: PathBuf) {
        if self.backend.is_none() {
            return;
        }

        let token = self.next_read_token;
        self.next_read_token += 1;
        self.pending_reads.insert(token);

        info!("📷 Reading photo {} (read #{})", path.display(), token);
        let sender = self.photo_tx.clone();
        thread::spawn(move || {
            let outcome = read_photo_file(&path);
            // If the app is shutting down the channel is gone; nothing to do.
            let _ = sender.send(PhotoReadResult { token, outcome });
        });
    }

    /// Drain completed photo reads. Called once per frame.
    pub fn poll_photo_reads(&mut self) {
        let completed: Vec<PhotoReadResult> = self.photo_rx.try_iter().collect();
        for result in completed {
            self.finish_photo_entry(result);
        }
    }

    /// Handle one completed photo read: allocate a key, persist the entry
    /// immediately (photos have no later commit step), then show it.
    pub fn finish_photo_entry(&mut self, result: PhotoReadResult) {
        if !self.pending_reads.remove(&result.token) {
            warn!("Ignoring stale photo read #{}", result.token);
            return;
        }
        let Some(backend) = &self.backend else { return };

        let payload = match result.outcome {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to read photo: {:#}", e);
                return;
            }
        };

        let key = domain::allocate_entry_key();
        let data_url = domain::encode_data_url(payload.mime, &payload.bytes);
        let serialized = domain::encode_item(ItemKind::Image, &data_url);
        if let Err(e) = backend.store().set(&key, &serialized) {
            // Not stored, so not shown either; view and store stay in step
            error!("Failed to save photo entry {}: {:#}", key, e);
            return;
        }

        info!("Saved photo entry {} ({} bytes)", key, payload.bytes.len());
        self.entries
            .push(EntryViewState::new_image(key, payload.bytes.into()));
    }

    /// Remove an entry's row and its store record. Removing a key the store
    /// no longer has is a no-op, so a repeated delete cannot fail.
    pub fn delete_entry(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        let entry = self.entries.remove(index);
        info!("🗑 Deleting entry {}", entry.key);

        if let Some(backend) = &self.backend {
            if let Err(e) = backend.store().remove(&entry.key) {
                error!("Failed to remove entry {}: {:#}", entry.key, e);
            }
        }
    }

    /// Load every stored entry into the view, in creation order.
    ///
    /// Keys outside the diary namespace are ignored. A record that fails to
    /// decode is logged and skipped; the rest of the load continues and the
    /// record is left in place untouched.
    pub fn load_all(&mut self) {
        self.loaded = true;
        let Some(backend) = &self.backend else { return };

        let mut keys = match backend.store().keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!("Failed to enumerate stored entries: {:#}", e);
                return;
            }
        };
        keys.retain(|key| domain::is_entry_key(key));
        domain::sort_entry_keys(&mut keys);
        info!("Loading {} stored entries", keys.len());

        let mut loaded = Vec::new();
        for key in keys {
            let serialized = match backend.store().get(&key) {
                Ok(Some(serialized)) => serialized,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping entry {}: {:#}", key, e);
                    continue;
                }
            };
            match domain::decode_item(&serialized) {
                Ok(DiaryItem {
                    kind: ItemKind::Text,
                    payload,
                }) => loaded.push(EntryViewState::new_text(key, payload, false)),
                Ok(DiaryItem {
                    kind: ItemKind::Image,
                    payload,
                }) => match domain::decode_data_url(&payload) {
                    Some(bytes) => loaded.push(EntryViewState::new_image(key, bytes.into())),
                    None => warn!("Skipping entry {}: image payload is not a data URL", key),
                },
                Err(e) => warn!("Skipping entry {}: {}", key, e),
            }
        }
        self.entries = loaded;
    }
}

fn read_photo_file(path: &Path) -> anyhow::Result<PhotoPayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(PhotoPayload {
        mime: domain::photo_mime_type(path),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::DiaryConnection;
    use crate::backend::Backend;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_app() -> DiaryApp {
        DiaryApp::with_backend(Ok(Backend::in_memory()))
    }

    /// Simulate the user typing into a text entry's surface.
    fn type_into(app: &mut DiaryApp, index: usize, text: &str) {
        match &mut app.entries[index].content {
            EntryContent::Text { buffer, dirty, .. } => {
                *buffer = text.to_string();
                *dirty = true;
            }
            EntryContent::Image { .. } => panic!("entry {} is not a text entry", index),
        }
    }

    fn stored_keys(app: &DiaryApp) -> Vec<String> {
        app.backend.as_ref().unwrap().store().keys().unwrap()
    }

    #[test]
    fn test_abandoned_new_entry_leaves_no_record() {
        let mut app = test_app();

        app.create_text_entry();
        assert_eq!(app.entries.len(), 1);

        // Focus lost without any edit: the commit path rejects clean buffers
        app.commit_text_entry(0);
        assert!(stored_keys(&app).is_empty());
    }

    #[test]
    fn test_commit_writes_one_record_with_latest_payload() {
        let mut app = test_app();
        app.create_text_entry();

        type_into(&mut app, 0, "first draft");
        app.commit_text_entry(0);

        type_into(&mut app, 0, "second draft");
        app.commit_text_entry(0);

        let keys = stored_keys(&app);
        assert_eq!(keys.len(), 1);

        let serialized = app
            .backend
            .as_ref()
            .unwrap()
            .store()
            .get(&keys[0])
            .unwrap()
            .unwrap();
        let item = domain::decode_item(&serialized).unwrap();
        assert_eq!(item.kind, ItemKind::Text);
        assert_eq!(item.payload, "second draft");
    }

    #[test]
    fn test_commit_without_edits_is_a_no_op() {
        let mut app = test_app();
        app.create_text_entry();
        type_into(&mut app, 0, "hello");
        app.commit_text_entry(0);

        // A second blur without changes must not rewrite the record
        app.commit_text_entry(0);
        assert_eq!(stored_keys(&app).len(), 1);
    }

    #[test]
    fn test_delete_removes_view_and_record() {
        let mut app = test_app();
        app.create_text_entry();
        type_into(&mut app, 0, "to be deleted");
        app.commit_text_entry(0);
        assert_eq!(stored_keys(&app).len(), 1);

        app.delete_entry(0);
        assert!(app.entries.is_empty());
        assert!(stored_keys(&app).is_empty());

        // Deleting again is a no-op, not a panic
        app.delete_entry(0);
    }

    #[test]
    fn test_commit_and_delete_in_same_frame() {
        // Clicking delete blurs the textarea, so one frame can carry both a
        // commit and a delete for the same row. The delete must win.
        let mut app = test_app();
        app.create_text_entry();
        type_into(&mut app, 0, "last words");

        app.apply_frame_actions(&[EntryAction::CommitText(0), EntryAction::Delete(0)]);
        assert!(app.entries.is_empty());
        assert!(stored_keys(&app).is_empty());
    }

    #[test]
    fn test_duplicate_delete_actions_remove_one_entry() {
        let mut app = test_app();
        app.create_text_entry();
        app.create_text_entry();
        type_into(&mut app, 0, "keep me");
        app.commit_text_entry(0);

        app.apply_frame_actions(&[EntryAction::Delete(1), EntryAction::Delete(1)]);
        assert_eq!(app.entries.len(), 1);
        assert_eq!(stored_keys(&app).len(), 1);
    }

    #[test]
    fn test_load_all_orders_keys_numerically() {
        let mut app = test_app();
        {
            let store = app.backend.as_ref().unwrap().store();
            // Inserted out of order on purpose; lexical sort would misorder
            store
                .set("diary20", &domain::encode_item(ItemKind::Text, "second"))
                .unwrap();
            store
                .set("diary3", &domain::encode_item(ItemKind::Text, "first"))
                .unwrap();
            store
                .set("diary100", &domain::encode_item(ItemKind::Text, "third"))
                .unwrap();
        }

        app.load_all();
        let keys: Vec<&str> = app.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["diary3", "diary20", "diary100"]);
    }

    #[test]
    fn test_load_all_skips_bad_records_and_foreign_keys() {
        let mut app = test_app();
        {
            let store = app.backend.as_ref().unwrap().store();
            store
                .set("diary1", &domain::encode_item(ItemKind::Text, "good"))
                .unwrap();
            store.set("diary2", "{ not json").unwrap();
            store
                .set("diary3", r#"{"type":"audio","data":"x"}"#)
                .unwrap();
            store.set("settings", "unrelated app data").unwrap();
        }

        app.load_all();

        // Only the well-formed diary record renders; the bad ones are
        // skipped but stay in the store untouched
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.entries[0].key, "diary1");
        assert_eq!(stored_keys(&app).len(), 4);
    }

    #[test]
    fn test_end_to_end_commit_survives_reload() {
        let temp_dir = TempDir::new().unwrap();

        {
            let connection = DiaryConnection::new(temp_dir.path()).unwrap();
            let mut app = DiaryApp::with_backend(Ok(Backend::with_connection(connection)));
            app.load_all();
            assert!(app.entries.is_empty());

            app.create_text_entry();
            type_into(&mut app, 0, "hello");
            app.commit_text_entry(0);
        }

        // Fresh app over the same directory, as after a restart
        let connection = DiaryConnection::new(temp_dir.path()).unwrap();
        let mut app = DiaryApp::with_backend(Ok(Backend::with_connection(connection)));
        app.load_all();

        assert_eq!(app.entries.len(), 1);
        match &app.entries[0].content {
            EntryContent::Text { buffer, .. } => assert_eq!(buffer, "hello"),
            EntryContent::Image { .. } => panic!("expected a text entry"),
        }
    }

    #[test]
    fn test_photo_read_persists_and_renders() {
        let temp_dir = TempDir::new().unwrap();
        let photo_path = temp_dir.path().join("shot.png");
        std::fs::write(&photo_path, [0x89, 0x50, 0x4e, 0x47]).unwrap();

        let mut app = test_app();
        app.request_photo_entry(photo_path);

        // The worker thread sends the completion; the frame loop would
        // normally drain it via poll_photo_reads
        let result = app.photo_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.finish_photo_entry(result);

        assert_eq!(app.entries.len(), 1);
        let keys = stored_keys(&app);
        assert_eq!(keys.len(), 1);

        let serialized = app
            .backend
            .as_ref()
            .unwrap()
            .store()
            .get(&keys[0])
            .unwrap()
            .unwrap();
        let item = domain::decode_item(&serialized).unwrap();
        assert_eq!(item.kind, ItemKind::Image);
        assert_eq!(
            domain::decode_data_url(&item.payload).unwrap(),
            vec![0x89, 0x50, 0x4e, 0x47]
        );
    }

    #[test]
    fn test_stale_photo_completion_is_dropped() {
        let mut app = test_app();

        // Token 42 was never handed out, so this completion is stale
        app.finish_photo_entry(PhotoReadResult {
            token: 42,
            outcome: Ok(PhotoPayload {
                mime: "image/png",
                bytes: vec![1, 2, 3],
            }),
        });

        assert!(app.entries.is_empty());
        assert!(stored_keys(&app).is_empty());
    }

    #[test]
    fn test_failed_photo_read_leaves_no_entry() {
        let mut app = test_app();
        app.request_photo_entry(PathBuf::from("/definitely/not/a/real/file.png"));

        let result = app.photo_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.finish_photo_entry(result);

        assert!(app.entries.is_empty());
        assert!(stored_keys(&app).is_empty());
    }

    #[test]
    fn test_no_storage_calls_without_backend() {
        use crate::backend::storage::StorageError;

        let mut app = DiaryApp::with_backend(Err(StorageError::Unavailable {
            reason: "probe failed".to_string(),
        }));
        assert!(app.startup_error.is_some());

        // None of these may panic or create entries
        app.create_text_entry();
        app.request_photo_entry(PathBuf::from("x.png"));
        app.load_all();
        assert!(app.entries.is_empty());
    }
}
