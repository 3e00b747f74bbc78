//! Engine error types.

use thiserror::Error;

/// Errors returned by [`crate::engine::AuditEngine::run`].
///
/// Per-phase failures are never surfaced here — a failing phase degrades to
/// an unavailable score inside the result. Only caller errors and
/// cancellation abort a run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The caller supplied an empty inventory. Auditing nothing would
    /// produce a misleading empty result, so this fails fast.
    #[error("inventory is empty: nothing to audit")]
    EmptyInventory,

    /// A phase weight is outside the accepted 0–50 range.
    #[error("invalid weight for phase {phase}: {value} (allowed 0–50)")]
    InvalidWeights { phase: String, value: u32 },

    /// The run was cancelled cooperatively. Not a failure: partial results
    /// are discarded and no `SiteAuditResult` is produced.
    #[error("audit run was cancelled")]
    Cancelled,
}
