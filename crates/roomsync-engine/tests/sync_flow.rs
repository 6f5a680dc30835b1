//! End-to-end flows: push events in, change events and mirror updates out.

use async_trait::async_trait;
use roomsync_core::record::{
    BreakoutControl, ParticipantState, RawControls, RawFullState, RawParticipant, RawPerson,
    RecordControl, BREAKOUT_SESSION_TYPE_MAIN,
};
use roomsync_core::{
    ChangeEvent, ChangeNotifier, RemovalReason, Result, RoomsyncError, SessionRecord,
    SessionState, SessionType,
};
use roomsync_core::parse::controls::RecordingState;
use roomsync_engine::{
    MirrorSink, MirrorUpdate, PushEvent, PushEventKind, RecordFetcher, SyncOrchestrator,
    TelemetryReport, TelemetrySink,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingNotifier {
    events: Mutex<Vec<ChangeEvent>>,
}

impl ChangeNotifier for CollectingNotifier {
    fn publish(&self, event: ChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl CollectingNotifier {
    fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct CollectingMirror {
    updates: Mutex<Vec<MirrorUpdate>>,
}

impl MirrorSink for CollectingMirror {
    fn apply(&self, update: MirrorUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

#[derive(Default)]
struct CollectingTelemetry {
    reports: Mutex<Vec<TelemetryReport>>,
}

impl TelemetrySink for CollectingTelemetry {
    fn report(&self, report: TelemetryReport) {
        self.reports.lock().unwrap().push(report);
    }
}

#[derive(Default)]
struct ScriptedFetcher {
    full: Mutex<VecDeque<Result<SessionRecord>>>,
    catch_up: Mutex<VecDeque<Result<Option<SessionRecord>>>>,
}

#[async_trait]
impl RecordFetcher for ScriptedFetcher {
    async fn fetch_full(&self, _url: &str) -> Result<SessionRecord> {
        self.full
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RoomsyncError::fetch("unscripted full fetch", None)))
    }

    async fn fetch_delta_catch_up(&self, _sync_url: &str) -> Result<Option<SessionRecord>> {
        self.catch_up
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RoomsyncError::fetch("unscripted catch-up", None)))
    }
}

struct Rig {
    notifier: Arc<CollectingNotifier>,
    mirror: Arc<CollectingMirror>,
    telemetry: Arc<CollectingTelemetry>,
    fetcher: Arc<ScriptedFetcher>,
    orchestrator: SyncOrchestrator,
}

fn rig() -> Rig {
    let notifier = Arc::new(CollectingNotifier::default());
    let mirror = Arc::new(CollectingMirror::default());
    let telemetry = Arc::new(CollectingTelemetry::default());
    let fetcher = Arc::new(ScriptedFetcher::default());
    let orchestrator = SyncOrchestrator::new(
        notifier.clone(),
        telemetry.clone(),
        mirror.clone(),
        fetcher.clone(),
    );
    Rig {
        notifier,
        mirror,
        telemetry,
        fetcher,
        orchestrator,
    }
}

const URL: &str = "https://locus.example.com/session/42";

fn participant(id: &str, state: ParticipantState) -> RawParticipant {
    RawParticipant {
        id: Some(id.into()),
        person: Some(RawPerson {
            id: Some(format!("person-{id}")),
            ..Default::default()
        }),
        state: Some(state),
        ..Default::default()
    }
}

fn meeting(seq: u64) -> SessionRecord {
    SessionRecord {
        url: Some(URL.into()),
        sequence: Some(seq),
        sync_url: Some(format!("{URL}/sync")),
        full_state: Some(RawFullState {
            state: Some(SessionState::Active),
            session_type: Some(SessionType::Meeting),
            active: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn delta(seq: u64, base: u64) -> SessionRecord {
    SessionRecord {
        url: Some(URL.into()),
        sequence: Some(seq),
        base_sequence: Some(base),
        ..Default::default()
    }
}

fn breakout_controls(group: &str, session: &str) -> RawControls {
    RawControls {
        breakout: Some(BreakoutControl {
            session_type: Some("BREAKOUT".into()),
            group_id: Some(group.into()),
            session_id: Some(session.into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn main_controls() -> RawControls {
    RawControls {
        breakout: Some(BreakoutControl {
            session_type: Some(BREAKOUT_SESSION_TYPE_MAIN.into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn deltas_apply_in_order_and_gaps_wait_for_the_missing_link() {
    let mut r = rig();
    r.orchestrator.apply_full(meeting(1), None);

    r.orchestrator.apply_delta(delta(2, 1)).await.unwrap();
    assert_eq!(r.orchestrator.working_copy().unwrap().sequence, Some(2));

    // 3 is missing: 4 waits without touching the mirror
    r.orchestrator.apply_delta(delta(4, 3)).await.unwrap();
    assert_eq!(r.orchestrator.working_copy().unwrap().sequence, Some(2));

    r.orchestrator.apply_delta(delta(3, 2)).await.unwrap();
    assert_eq!(r.orchestrator.working_copy().unwrap().sequence, Some(4));
}

#[tokio::test]
async fn stale_and_duplicate_deltas_are_discarded_silently() {
    let mut r = rig();
    r.orchestrator.apply_full(meeting(5), None);
    let baseline = r.notifier.events().len();

    r.orchestrator.apply_delta(delta(5, 4)).await.unwrap();
    r.orchestrator.apply_delta(delta(3, 2)).await.unwrap();

    assert_eq!(r.orchestrator.working_copy().unwrap().sequence, Some(5));
    assert_eq!(r.notifier.events().len(), baseline);
}

#[tokio::test]
async fn recording_pause_and_stop_produce_distinct_states() {
    let mut r = rig();
    let mut start = meeting(1);
    start.controls = Some(RawControls {
        record: Some(RecordControl {
            recording: Some(true),
            paused: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    });
    r.orchestrator.apply_full(start, None);

    let mut paused = delta(2, 1);
    paused.controls = Some(RawControls {
        record: Some(RecordControl {
            recording: Some(true),
            paused: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    });
    r.orchestrator.apply_delta(paused).await.unwrap();

    let mut stopped = delta(3, 2);
    stopped.controls = Some(RawControls {
        record: Some(RecordControl {
            recording: Some(false),
            paused: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    });
    r.orchestrator.apply_delta(stopped).await.unwrap();

    let states: Vec<_> = r
        .notifier
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ChangeEvent::RecordingUpdated { state, .. } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            RecordingState::Recording,
            RecordingState::Paused,
            RecordingState::Idle
        ]
    );
}

#[tokio::test]
async fn returning_to_main_session_restores_the_cached_roster() {
    let mut r = rig();
    let mut main = meeting(1);
    main.controls = Some(main_controls());
    main.participants = Some(vec![
        participant("a", ParticipantState::Joined),
        participant("b", ParticipantState::Joined),
    ]);
    r.orchestrator.apply_full(main, None);

    // move into a breakout
    let mut enter = delta(2, 1);
    enter.controls = Some(breakout_controls("g1", "s1"));
    r.orchestrator.apply_delta(enter).await.unwrap();

    // return to main; the delta only knows that b has left
    let mut back = delta(3, 2);
    back.controls = Some(main_controls());
    back.participants = Some(vec![participant("b", ParticipantState::Left)]);
    r.orchestrator.apply_delta(back).await.unwrap();

    let rosters: Vec<Vec<RawParticipant>> = r
        .mirror
        .updates
        .lock()
        .unwrap()
        .iter()
        .filter_map(|u| match u {
            MirrorUpdate::Participants(roster) => Some(roster.clone()),
            _ => None,
        })
        .collect();
    let final_roster = rosters.last().unwrap();
    assert_eq!(final_roster.len(), 2);
    assert_eq!(final_roster[0].id.as_deref(), Some("a"));
    assert_eq!(final_roster[0].state, Some(ParticipantState::Joined));
    assert_eq!(final_roster[1].id.as_deref(), Some("b"));
    assert_eq!(final_roster[1].state, Some(ParticipantState::Left));
}

#[tokio::test]
async fn full_push_return_to_main_restores_the_cached_roster() {
    let mut r = rig();
    let mut main = meeting(1);
    main.controls = Some(main_controls());
    main.participants = Some(vec![
        participant("a", ParticipantState::Joined),
        participant("b", ParticipantState::Joined),
    ]);
    r.orchestrator.apply_full(main, None);

    let mut enter = delta(2, 1);
    enter.controls = Some(breakout_controls("g1", "s1"));
    r.orchestrator.apply_delta(enter).await.unwrap();

    // the return arrives as a truncated participant push, not a delta
    let mut back = meeting(3);
    back.controls = Some(main_controls());
    back.participants = Some(vec![participant("b", ParticipantState::Left)]);
    r.orchestrator
        .handle_push(PushEvent {
            kind: PushEventKind::ParticipantJoined,
            record: back,
        })
        .await
        .unwrap();

    let rosters: Vec<Vec<RawParticipant>> = r
        .mirror
        .updates
        .lock()
        .unwrap()
        .iter()
        .filter_map(|u| match u {
            MirrorUpdate::Participants(roster) => Some(roster.clone()),
            _ => None,
        })
        .collect();
    let final_roster = rosters.last().unwrap();
    assert_eq!(final_roster.len(), 2);
    assert_eq!(final_roster[0].id.as_deref(), Some("a"));
    assert_eq!(final_roster[1].id.as_deref(), Some("b"));
    assert_eq!(final_roster[1].state, Some(ParticipantState::Left));
}

#[tokio::test]
async fn desync_falls_back_from_catch_up_to_full_fetch() {
    let mut r = rig();
    r.orchestrator.apply_full(meeting(5), None);

    r.fetcher
        .catch_up
        .lock()
        .unwrap()
        .push_back(Err(RoomsyncError::fetch("catch-up unavailable", Some(502))));
    r.fetcher.full.lock().unwrap().push_back(Ok(meeting(12)));

    r.orchestrator.apply_delta(delta(9, 2)).await.unwrap();

    assert_eq!(r.orchestrator.working_copy().unwrap().sequence, Some(12));
    assert!(!r.orchestrator.is_destroyed());
    assert!(r.telemetry.reports.lock().unwrap().is_empty());
}

#[tokio::test]
async fn abandoned_sync_reports_telemetry_once_and_destroys_once() {
    let mut r = rig();
    r.orchestrator.apply_full(meeting(5), None);

    r.fetcher
        .catch_up
        .lock()
        .unwrap()
        .push_back(Err(RoomsyncError::fetch("catch-up unavailable", Some(502))));
    r.fetcher
        .full
        .lock()
        .unwrap()
        .push_back(Err(RoomsyncError::fetch("record service down", Some(503))));

    let err = r.orchestrator.apply_delta(delta(9, 2)).await.unwrap_err();
    assert!(err.is_sync_failed());

    assert_eq!(r.telemetry.reports.lock().unwrap().len(), 1);
    let destroys: Vec<_> = r
        .notifier
        .events()
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                ChangeEvent::DestroySession {
                    reason: RemovalReason::SyncFailed,
                    ..
                }
            )
        })
        .collect();
    assert_eq!(destroys.len(), 1);

    // the mirror is inert afterwards
    r.orchestrator.apply_full(meeting(20), None);
    assert_eq!(r.telemetry.reports.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn push_events_route_deltas_through_the_sequencer() {
    let mut r = rig();
    r.orchestrator
        .handle_push(PushEvent {
            kind: PushEventKind::ParticipantJoined,
            record: meeting(1),
        })
        .await
        .unwrap();
    assert_eq!(r.orchestrator.working_copy().unwrap().sequence, Some(1));

    r.orchestrator
        .handle_push(PushEvent {
            kind: PushEventKind::Difference,
            record: delta(2, 1),
        })
        .await
        .unwrap();
    assert_eq!(r.orchestrator.working_copy().unwrap().sequence, Some(2));
}
