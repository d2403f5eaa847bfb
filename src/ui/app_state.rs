//! # App State Module
//!
//! Central state for the diary app.
//!
//! ## Key Types:
//! - `DiaryApp` - main application state struct
//! - `EntryViewState` - one explicit state object per visible entry row
//! - `EntryAction` - what a rendered row asked the app to do this frame
//!
//! ## State Management:
//! Every entry row owns an `EntryViewState` holding its store key and its
//! kind-specific state, instead of event handlers closing over loose
//! variables. Rows never mutate the store themselves; they emit
//! `EntryAction`s that the frame loop applies after the render pass.

use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use log::{error, info};

use crate::backend::storage::StorageError;
use crate::backend::Backend;

/// What a single diary row is showing.
pub enum EntryContent {
    /// Editable multi-line text surface.
    Text {
        /// Live contents of the text surface.
        buffer: String,
        /// Set when the buffer changed since the last store write.
        dirty: bool,
        /// Move keyboard focus to this surface on its next frame.
        request_focus: bool,
    },
    /// Static photo surface; the raw image bytes feed the texture loader.
    Image { bytes: Arc<[u8]> },
}

/// Per-entry state object, bound to exactly one store key.
///
/// Created when an entry is loaded or newly added, dropped when the user
/// deletes it. A brand-new text entry exists here before anything is written
/// to the store; that is the only moment view and store may disagree.
pub struct EntryViewState {
    pub key: String,
    pub content: EntryContent,
}

impl EntryViewState {
    pub fn new_text(key: String, initial_text: String, is_new_entry: bool) -> Self {
        Self {
            key,
            content: EntryContent::Text {
                buffer: initial_text,
                dirty: false,
                request_focus: is_new_entry,
            },
        }
    }

    pub fn new_image(key: String, bytes: Arc<[u8]>) -> Self {
        Self {
            key,
            content: EntryContent::Image { bytes },
        }
    }
}

/// Raw photo bytes plus the MIME type guessed from the file name.
pub struct PhotoPayload {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Result of one background photo-file read.
pub struct PhotoReadResult {
    /// Token handed out when the read was started; completions whose token
    /// is no longer pending are stale and get dropped.
    pub token: u64,
    pub outcome: anyhow::Result<PhotoPayload>,
}

/// Actions collected during a render pass and applied afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    /// "Add entry" button: append a fresh, focused, unsaved text entry.
    AddText,
    /// "Add photo" button: open the native file picker.
    PickPhoto,
    /// A text surface lost focus with unsaved edits.
    CommitText(usize),
    /// A row's delete button was activated.
    Delete(usize),
}

/// Main application struct for the egui diary
pub struct DiaryApp {
    /// Present when the startup capability probe succeeded.
    pub backend: Option<Backend>,
    /// Fatal startup message; when set the app only renders the error view.
    pub startup_error: Option<String>,

    // Entry list state
    pub entries: Vec<EntryViewState>,
    pub loaded: bool,

    // In-flight photo reads
    pub pending_reads: HashSet<u64>,
    pub(crate) next_read_token: u64,
    pub(crate) photo_tx: Sender<PhotoReadResult>,
    pub(crate) photo_rx: Receiver<PhotoReadResult>,
}

impl DiaryApp {
    /// Create the app, probing storage once.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        info!("🚀 Initializing diary app");

        // Image loaders for photo entries
        egui_extras::install_image_loaders(&cc.egui_ctx);

        Self::with_backend(Backend::new())
    }

    /// Build app state around a probe result. Separate from `new` so tests
    /// can run the whole entry lifecycle without an egui context.
    pub fn with_backend(backend: Result<Backend, StorageError>) -> Self {
        let (backend, startup_error) = match backend {
            Ok(backend) => (Some(backend), None),
            Err(e) => {
                error!("Storage capability probe failed: {}", e);
                (None, Some(e.to_string()))
            }
        };

        let (photo_tx, photo_rx) = channel();
        Self {
            backend,
            startup_error,
            entries: Vec::new(),
            loaded: false,
            pending_reads: HashSet::new(),
            next_read_token: 0,
            photo_tx,
            photo_rx,
        }
    }
}
