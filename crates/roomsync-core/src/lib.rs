//! Core data model for the Roomsync workspace.
//!
//! Holds the raw wire types for server-pushed session records, the pure field
//! parsers that normalize and diff them, the change-event surface, and the
//! shared error type. Everything here is synchronous and free of I/O; the
//! sequencing and orchestration live in `roomsync-engine`.

pub mod error;
pub mod event;
pub mod participant;
pub mod parse;
pub mod record;

pub use error::{Result, RoomsyncError};
pub use event::{ChangeEvent, ChangeNotifier, RemovalReason};
pub use participant::{compute_participant_deltas, find_partner, DeltaParticipant};
pub use parse::FieldDiff;
pub use record::{SessionRecord, SessionState, SessionType};
