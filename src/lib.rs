//! Meridian audit engine — score a topical map's pages against
//! content-authority criteria, detect overlap and cannibalization across
//! the corpus, and synthesize a prioritized remediation roadmap.
//!
//! The engine is a pure in-process computation: callers supply the
//! inventory, topic hierarchy, semantic triples, and a weight map, and
//! receive an immutable [`result::SiteAuditResult`] plus a stream of
//! [`progress::AuditProgress`] events. It never crawls, never persists,
//! and produces byte-identical results for identical inputs.

pub mod aggregate;
pub mod classify;
pub mod engine;
pub mod error;
pub mod model;
pub mod overlap;
pub mod phases;
pub mod progress;
pub mod result;
pub mod roadmap;
pub mod weights;

pub use engine::{AuditConfig, AuditEngine, AuditRequest, CancelHandle};
pub use error::AuditError;
pub use progress::{progress_stream, AuditProgress, ProgressPhase, ProgressSender};
pub use result::{PageUpdate, SiteAuditResult};
pub use weights::{AuditWeights, PhaseKey, WeightBalance, WeightsCheck};
