//! FILENAME: app/demolens/src/lib.rs
// PURPOSE: Backend library entry point for the DemoLens extension.
// CONTEXT: The browser extension talks to this process over native messaging.
// State lives in `AppState`; library mutations are persisted through the
// background sync queue.

use skeleton_store::{JsonStorage, SkeletonLibrary, SyncQueue};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub mod api_types;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod messaging;

pub use api_types::{
    CapturedQuery, DashboardRef, InflatedQuery, PlaybackResult, Request, Response,
};
pub use config::DemoLensConfig;
pub use error::AppError;
pub use messaging::{dispatch, read_message, run_host, write_message};

// ============================================================================
// APPLICATION STATE
// ============================================================================

pub struct AppState {
    /// Skeletons and scenarios
    pub library: Mutex<SkeletonLibrary>,
    /// Background writer for the library file
    pub sync: SyncQueue,
    /// Dashboard reported by the content script, if any
    pub current_dashboard: Mutex<Option<DashboardRef>>,
    /// Signalled whenever `current_dashboard` is set
    pub dashboard_changed: Condvar,
    pub config: DemoLensConfig,
}

impl AppState {
    /// Locks the library, ignoring poisoning: every mutation is one library call.
    pub fn lock_library(&self) -> MutexGuard<'_, SkeletonLibrary> {
        self.library.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lock_dashboard(&self) -> MutexGuard<'_, Option<DashboardRef>> {
        self.current_dashboard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues the library's current snapshot for writing.
    pub fn persist(&self, library: &SkeletonLibrary) {
        self.sync.submit(library.snapshot().clone());
    }
}

/// Loads the library from `config.storage_path` and starts the sync queue.
pub fn create_app_state(config: DemoLensConfig) -> Result<AppState, AppError> {
    log_info!("STORE", "Creating AppState storage={:?}", config.storage_path);

    let storage = JsonStorage::new(config.storage_path.clone());
    let snapshot = storage.load()?;
    log_info!(
        "STORE",
        "Loaded {} skeletons, {} scenarios",
        snapshot.skeletons.len(),
        snapshot.scenarios.len()
    );

    let sync = SyncQueue::spawn(storage)?;

    Ok(AppState {
        library: Mutex::new(SkeletonLibrary::from_snapshot(snapshot)),
        sync,
        current_dashboard: Mutex::new(None),
        dashboard_changed: Condvar::new(),
        config,
    })
}

/// Runs the native-messaging host on stdin/stdout until the extension
/// disconnects.
pub fn run(config: DemoLensConfig) -> Result<(), AppError> {
    if let Some(path) = &config.log_path {
        if let Err(e) = logging::init_log_file(path) {
            eprintln!("[LOG_INIT] {}", e);
        }
    }

    let state = create_app_state(config)?;
    let result = run_host(&state, std::io::stdin().lock(), std::io::stdout());

    state.sync.flush();
    if let Some(e) = state.sync.last_error() {
        log_error!("STORE", "Last library write failed: {}", e);
    }
    result
}
