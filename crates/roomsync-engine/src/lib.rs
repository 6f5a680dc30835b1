//! Synchronization engine for the Roomsync workspace.
//!
//! Keeps a client-side mirror of a server-authoritative session record in
//! step with the server: delta records are ordered by the
//! [`sequencer`], applied and diffed by the [`orchestrator`], and gaps are
//! closed by refetching through the [`transport`] seam. Consumers observe
//! the mirror through [`ChannelNotifier`](notifier::ChannelNotifier) events
//! and the [`MirrorSink`](mirror::MirrorSink) callback.

pub mod cache;
pub mod http;
pub mod mirror;
pub mod notifier;
pub mod orchestrator;
pub mod sequencer;
pub mod telemetry;
pub mod transport;

pub use cache::{merge_records, MainSessionCache};
pub use http::HttpRecordFetcher;
pub use mirror::{MirrorSink, MirrorUpdate};
pub use notifier::ChannelNotifier;
pub use orchestrator::SyncOrchestrator;
pub use sequencer::{DeltaSequencer, Disposition};
pub use telemetry::{NoopTelemetry, TelemetryReport, TelemetrySink};
pub use transport::{PushEvent, PushEventKind, RecordFetcher};
