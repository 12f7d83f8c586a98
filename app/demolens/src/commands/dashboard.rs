//! FILENAME: app/demolens/src/commands/dashboard.rs
// PURPOSE: Tracks which dashboard the content script is showing.

use crate::api_types::DashboardRef;
use crate::error::AppError;
use crate::{log_debug, log_warn, AppState};
use chrono::Utc;
use std::sync::PoisonError;
use std::time::Duration;

/// Records (or clears, with `None`) the current dashboard.
pub fn set_current_dashboard(state: &AppState, dashboard: Option<DashboardRef>) {
    let dashboard = dashboard.map(|mut d| {
        d.seen_at.get_or_insert_with(Utc::now);
        d
    });
    log_debug!(
        "MSG",
        "set_current_dashboard {:?}",
        dashboard.as_ref().map(|d| d.dashboard_id.as_str())
    );
    *state.lock_dashboard() = dashboard;
    state.dashboard_changed.notify_all();
}

pub fn get_current_dashboard(state: &AppState) -> Option<DashboardRef> {
    state.lock_dashboard().clone()
}

/// Waits until a dashboard is current. Checks again whenever one is set,
/// or every `poll_interval_ms`, giving up after `poll_max_attempts` checks.
/// Blocks the calling thread; the host runs it off its read loop.
pub fn wait_for_current_dashboard(state: &AppState) -> Result<DashboardRef, AppError> {
    let attempts = state.config.poll_max_attempts.max(1);
    let interval = Duration::from_millis(state.config.poll_interval_ms);

    let mut current = state.lock_dashboard();
    for attempt in 1..=attempts {
        if let Some(dashboard) = current.as_ref() {
            return Ok(dashboard.clone());
        }
        if attempt < attempts {
            current = state
                .dashboard_changed
                .wait_timeout(current, interval)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    log_warn!("MSG", "no current dashboard after {} attempts", attempts);
    Err(AppError::Timeout { attempts })
}
