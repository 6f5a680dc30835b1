//! Delta sequencing against the working copy.
//!
//! The sequencer owns the working copy of the session record and decides, for
//! every incoming delta, whether it applies now, is stale, must wait for a
//! missing predecessor, or proves the mirror has diverged. It also carries
//! the paused queue used while a resync is in flight.

use roomsync_core::SessionRecord;
use std::collections::{BTreeMap, VecDeque};

/// Outcome of classifying one incoming delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Applies cleanly on top of the working copy
    UseIncoming,
    /// Stale or duplicate; the working copy stays
    UseCurrent,
    /// A predecessor is missing; buffered until it arrives
    Wait,
    /// The mirror has diverged and must be resynchronized
    Desync,
    /// The record points at a different session url
    UrlChanged,
}

/// Run state of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Working,
    /// A resync is in flight; arrivals are queued, not classified
    Paused,
}

/// Deltas buffered in [`Disposition::Wait`] beyond this count force a
/// desync instead; a gap that old will not close on its own.
const MAX_PENDING: usize = 32;

#[derive(Debug, Default)]
pub struct DeltaSequencer {
    working_copy: Option<SessionRecord>,
    sync_url: Option<String>,
    state: RunState,
    /// Out-of-order deltas keyed by their base sequence
    pending: BTreeMap<u64, SessionRecord>,
    paused_queue: VecDeque<SessionRecord>,
}

impl DeltaSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_copy(&self) -> Option<&SessionRecord> {
        self.working_copy.as_ref()
    }

    pub fn sync_url(&self) -> Option<&str> {
        self.sync_url.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    /// Decides what to do with one incoming delta. Pure with respect to the
    /// sequencer state; buffering happens in [`buffer`](Self::buffer).
    pub fn classify(&self, incoming: &SessionRecord) -> Disposition {
        let Some(working) = &self.working_copy else {
            return Disposition::UseIncoming;
        };

        if let (Some(working_url), Some(incoming_url)) = (&working.url, &incoming.url) {
            if working_url != incoming_url {
                return Disposition::UrlChanged;
            }
        }

        let working_seq = working.sequence.unwrap_or(0);
        let Some(incoming_seq) = incoming.sequence else {
            // a delta without a sequence cannot be ordered; keep what we have
            return Disposition::UseCurrent;
        };
        if incoming_seq <= working_seq {
            return Disposition::UseCurrent;
        }

        match incoming.base_sequence {
            None => Disposition::UseIncoming,
            Some(base) if base == working_seq => Disposition::UseIncoming,
            Some(base) if base > working_seq => {
                if self.pending.len() >= MAX_PENDING {
                    Disposition::Desync
                } else {
                    Disposition::Wait
                }
            }
            // base < working < incoming: the delta overlaps applied state
            Some(_) => Disposition::Desync,
        }
    }

    /// Buffers a [`Disposition::Wait`] delta until its predecessor arrives.
    pub fn buffer(&mut self, record: SessionRecord) {
        if let Some(base) = record.base_sequence {
            self.pending.insert(base, record);
        }
    }

    /// Moves the working copy forward after a record was applied, dropping
    /// buffered deltas the new position has made stale.
    pub fn advance(&mut self, record: SessionRecord) {
        if let Some(sync_url) = &record.sync_url {
            self.sync_url = Some(sync_url.clone());
        }
        let sequence = record.sequence.unwrap_or(0);
        self.pending.retain(|base, _| *base >= sequence);
        self.working_copy = Some(record);
        if self.state == RunState::Idle {
            self.state = RunState::Working;
        }
    }

    /// Takes the buffered delta that has become contiguous with the working
    /// copy, if any.
    pub fn take_ready(&mut self) -> Option<SessionRecord> {
        let working_seq = self.working_copy.as_ref()?.sequence?;
        self.pending.remove(&working_seq)
    }

    /// Stops classification while a resync is in flight; arrivals go to the
    /// paused queue via [`enqueue_paused`](Self::enqueue_paused).
    pub fn pause(&mut self) {
        self.state = RunState::Paused;
    }

    pub fn enqueue_paused(&mut self, record: SessionRecord) {
        self.paused_queue.push_back(record);
    }

    /// Ends the pause and hands back everything that arrived during it, in
    /// arrival order. Entries superseded by the resync result will classify
    /// as [`Disposition::UseCurrent`] when replayed.
    pub fn resume(&mut self) -> Vec<SessionRecord> {
        self.state = RunState::Working;
        self.paused_queue.drain(..).collect()
    }

    /// Freshness gate for full records. A record without a sequence cannot
    /// be ordered against an existing working copy, so it only passes when
    /// there is nothing to compare it with.
    pub fn is_newer_full_record(&self, incoming: &SessionRecord) -> bool {
        match (&self.working_copy, incoming.sequence) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(working), Some(incoming_seq)) => {
                incoming_seq > working.sequence.unwrap_or(0)
            }
        }
    }

    /// Drops all sequencing state. Used when the session url changes and the
    /// history before the change no longer orders the history after it.
    pub fn reset(&mut self) {
        self.working_copy = None;
        self.sync_url = None;
        self.pending.clear();
        self.paused_queue.clear();
        self.state = RunState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(url: &str, seq: u64) -> SessionRecord {
        SessionRecord {
            url: Some(url.into()),
            sequence: Some(seq),
            ..Default::default()
        }
    }

    fn delta(url: &str, seq: u64, base: u64) -> SessionRecord {
        SessionRecord {
            url: Some(url.into()),
            sequence: Some(seq),
            base_sequence: Some(base),
            ..Default::default()
        }
    }

    const URL: &str = "https://locus.example.com/session/1";

    fn sequencer_at(seq: u64) -> DeltaSequencer {
        let mut sequencer = DeltaSequencer::new();
        sequencer.advance(full(URL, seq));
        sequencer
    }

    #[test]
    fn test_first_record_is_always_used() {
        let sequencer = DeltaSequencer::new();
        assert_eq!(
            sequencer.classify(&delta(URL, 2, 1)),
            Disposition::UseIncoming
        );
    }

    #[test]
    fn test_contiguous_delta_is_used_and_stale_is_not() {
        let sequencer = sequencer_at(5);
        assert_eq!(
            sequencer.classify(&delta(URL, 6, 5)),
            Disposition::UseIncoming
        );
        assert_eq!(sequencer.classify(&delta(URL, 5, 4)), Disposition::UseCurrent);
        assert_eq!(sequencer.classify(&delta(URL, 3, 2)), Disposition::UseCurrent);
    }

    #[test]
    fn test_gap_waits_then_drains_when_contiguous() {
        let mut sequencer = sequencer_at(2);

        // sequence 3 is missing: 4 must wait
        let four = delta(URL, 4, 3);
        assert_eq!(sequencer.classify(&four), Disposition::Wait);
        sequencer.buffer(four.clone());
        assert!(sequencer.take_ready().is_none());

        // 3 arrives and applies; 4 becomes ready
        let three = delta(URL, 3, 2);
        assert_eq!(sequencer.classify(&three), Disposition::UseIncoming);
        sequencer.advance(three);
        let ready = sequencer.take_ready().unwrap();
        assert_eq!(ready.sequence, Some(4));
        assert!(sequencer.take_ready().is_none());
    }

    #[test]
    fn test_overlapping_delta_is_a_desync() {
        let sequencer = sequencer_at(5);
        // base 3 < working 5 < sequence 7: applied state overlaps the delta
        assert_eq!(sequencer.classify(&delta(URL, 7, 3)), Disposition::Desync);
    }

    #[test]
    fn test_url_change_is_flagged_before_sequence_comparison() {
        let sequencer = sequencer_at(5);
        let moved = delta("https://locus.example.com/session/2", 1, 0);
        assert_eq!(sequencer.classify(&moved), Disposition::UrlChanged);
    }

    #[test]
    fn test_pending_overflow_forces_desync() {
        let mut sequencer = sequencer_at(1);
        for i in 0..MAX_PENDING as u64 {
            let waiting = delta(URL, 100 + i, 99 + i);
            assert_eq!(sequencer.classify(&waiting), Disposition::Wait);
            sequencer.buffer(waiting);
        }
        assert_eq!(
            sequencer.classify(&delta(URL, 200, 199)),
            Disposition::Desync
        );
    }

    #[test]
    fn test_paused_queue_replays_in_arrival_order() {
        let mut sequencer = sequencer_at(5);
        sequencer.pause();
        assert!(sequencer.is_paused());
        sequencer.enqueue_paused(delta(URL, 6, 5));
        sequencer.enqueue_paused(delta(URL, 7, 6));

        // the resync landed us on sequence 6; the first queued delta is now
        // stale, the second applies
        sequencer.advance(full(URL, 6));
        let replayed = sequencer.resume();
        assert!(!sequencer.is_paused());
        assert_eq!(replayed.len(), 2);
        assert_eq!(sequencer.classify(&replayed[0]), Disposition::UseCurrent);
        assert_eq!(sequencer.classify(&replayed[1]), Disposition::UseIncoming);
    }

    #[test]
    fn test_full_record_freshness_gate() {
        let sequencer = sequencer_at(10);
        assert!(sequencer.is_newer_full_record(&full(URL, 11)));
        assert!(!sequencer.is_newer_full_record(&full(URL, 10)));
        assert!(!sequencer.is_newer_full_record(&full(URL, 4)));

        // unordered records are only fresh against an empty mirror;
        // accepting one later would re-apply state that was already seen
        let unsequenced = SessionRecord {
            url: Some(URL.into()),
            ..Default::default()
        };
        assert!(!sequencer.is_newer_full_record(&unsequenced));

        // no working copy yet: anything is fresh
        assert!(DeltaSequencer::new().is_newer_full_record(&full(URL, 1)));
        assert!(DeltaSequencer::new().is_newer_full_record(&unsequenced));
    }

    #[test]
    fn test_advance_drops_stale_pending_entries() {
        let mut sequencer = sequencer_at(2);
        sequencer.buffer(delta(URL, 4, 3));
        sequencer.advance(full(URL, 10));
        assert!(sequencer.take_ready().is_none());
    }
}
