//! Field parsers.
//!
//! One module per sub-tree of the session record. Every parser follows the
//! same contract: `parse` normalizes one raw sub-tree into its canonical
//! shape and is total over well-formed input (absent optional fields become
//! defaults, never errors); `diff` parses both sides and derives a struct of
//! named update flags via explicit comparison rules. Callers need the *name*
//! of what changed, so there is deliberately no generic deep-equality pass.
//!
//! Parsers are pure. All event emission happens in the orchestrator, driven
//! by the update flags returned here.

pub mod controls;
pub mod embedded_apps;
pub mod full_state;
pub mod host;
pub mod info;
pub mod media_shares;
pub mod self_state;

/// Result of diffing one sub-tree of the session record.
///
/// `previous` is `None` the first time a sub-tree is seen. `updates` is the
/// parser-specific struct of named change flags.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff<P, U> {
    pub previous: Option<P>,
    pub current: P,
    pub updates: U,
}
