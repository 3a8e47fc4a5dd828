//! Progress reporting for downloads and multi-year runs.
//!
//! Downloads report bytes and multi-year runs report one step per year.
//! The terminal rendering lives in `drug_nme_cli_utils`.

/// Receives progress from a download or a multi-step run.
pub trait ProgressCallback: Send + Sync {
    /// Total bytes or steps expected. May arrive after work has started.
    fn set_total(&self, total: u64);

    fn inc(&self, delta: u64);

    fn set_message(&self, msg: String);

    /// Ends the run, leaving `msg` on screen.
    fn finish(&self, msg: String);

    /// Ends the run and removes the indicator.
    fn finish_and_clear(&self);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}
