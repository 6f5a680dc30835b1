//! Synchronization orchestrator.
//!
//! Owns the canonical mirror of one session: routes incoming records through
//! the sequencer, runs the field parsers over everything that changed,
//! publishes the named change events, forwards parsed sub-trees to the
//! mirror sink, and tears the session down when the server ends it or the
//! mirror cannot be resynchronized.

use crate::cache::{merge_records, MainSessionCache};
use crate::mirror::{MirrorSink, MirrorUpdate};
use crate::sequencer::{DeltaSequencer, Disposition};
use crate::telemetry::{TelemetryReport, TelemetrySink, EVENT_REMOTE_ENDED, EVENT_SYNC_FAILED};
use crate::transport::{PushEvent, PushEventKind, RecordFetcher};
use roomsync_core::parse::controls::{
    self, needs_member_refresh, resolve_recording_state, ControlsUpdates,
};
use roomsync_core::parse::{embedded_apps, full_state, host, info, media_shares, self_state};
use roomsync_core::participant::{compute_participant_deltas, find_partner};
use roomsync_core::record::{ParticipantState, TransitionReason};
use roomsync_core::{
    ChangeEvent, ChangeNotifier, RemovalReason, Result, RoomsyncError, SessionRecord, SessionType,
};
use std::collections::VecDeque;
use std::sync::Arc;

pub struct SyncOrchestrator {
    sequencer: DeltaSequencer,
    cache: MainSessionCache,
    notifier: Arc<dyn ChangeNotifier>,
    telemetry: Arc<dyn TelemetrySink>,
    mirror: Arc<dyn MirrorSink>,
    fetcher: Arc<dyn RecordFetcher>,
    can_assign_host: Option<bool>,
    destroyed: bool,
}

impl SyncOrchestrator {
    pub fn new(
        notifier: Arc<dyn ChangeNotifier>,
        telemetry: Arc<dyn TelemetrySink>,
        mirror: Arc<dyn MirrorSink>,
        fetcher: Arc<dyn RecordFetcher>,
    ) -> Self {
        Self {
            sequencer: DeltaSequencer::new(),
            cache: MainSessionCache::new(),
            notifier,
            telemetry,
            mirror,
            fetcher,
            can_assign_host: None,
            destroyed: false,
        }
    }

    pub fn working_copy(&self) -> Option<&SessionRecord> {
        self.sequencer.working_copy()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Routes one push-channel event: deltas go through the sequencer,
    /// everything else is treated as a full record.
    pub async fn handle_push(&mut self, event: PushEvent) -> Result<()> {
        if event.kind.is_delta() {
            self.apply_delta(event.record).await
        } else {
            self.apply_full(event.record, Some(event.kind));
            Ok(())
        }
    }

    /// Applies a full record, gated on freshness: a record older than the
    /// working copy is logged and discarded. Full pushes go through the
    /// main-session cache too, so a return to the main session signalled by
    /// a participant push still restores the retained roster.
    pub fn apply_full(&mut self, record: SessionRecord, kind: Option<PushEventKind>) {
        if self.destroyed {
            return;
        }
        let previous = self.sequencer.working_copy().cloned();
        let record = self.cache.record_to_apply(record, previous.as_ref());
        if !self.sequencer.is_newer_full_record(&record) {
            tracing::info!(
                sequence = record.sequence,
                "Discarding stale full record"
            );
            return;
        }

        self.apply_record(record);

        if let Some(kind) = kind {
            self.publish_remote_response(kind);
        }
    }

    /// Applies a delta record. Arrivals during a resync are queued; a
    /// desync or a session url change triggers the resync chain.
    pub async fn apply_delta(&mut self, record: SessionRecord) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        if self.sequencer.is_paused() {
            self.sequencer.enqueue_paused(record);
            return Ok(());
        }

        let mut worklist = VecDeque::from([record]);
        while let Some(incoming) = worklist.pop_front() {
            let previous = self.sequencer.working_copy().cloned();
            let record = self.cache.record_to_apply(incoming, previous.as_ref());

            match self.sequencer.classify(&record) {
                Disposition::UseIncoming => {
                    self.apply_record(record);
                    while let Some(ready) = self.sequencer.take_ready() {
                        self.apply_record(ready);
                    }
                }
                Disposition::UseCurrent => {
                    tracing::info!(
                        sequence = record.sequence,
                        "Discarding stale delta record"
                    );
                }
                Disposition::Wait => {
                    tracing::info!(
                        sequence = record.sequence,
                        base_sequence = record.base_sequence,
                        "Buffering out-of-order delta"
                    );
                    self.sequencer.buffer(record);
                }
                disposition @ (Disposition::Desync | Disposition::UrlChanged) => {
                    tracing::info!(?disposition, "Mirror diverged, resynchronizing");
                    let replayed = self.resync(&record, disposition).await?;
                    worklist.extend(replayed);
                }
            }
        }
        Ok(())
    }

    /// Resynchronizes the mirror: delta catch-up when a sync url is known,
    /// full refetch otherwise or on catch-up failure. Both failing is
    /// terminal. Returns the deltas queued while the resync was in flight.
    async fn resync(
        &mut self,
        trigger: &SessionRecord,
        disposition: Disposition,
    ) -> Result<Vec<SessionRecord>> {
        self.sequencer.pause();

        if disposition == Disposition::UrlChanged {
            // history before the url change no longer orders anything
            self.sequencer.reset();
            self.cache.clear();
        }

        match self.fetch_current(trigger).await {
            Ok(Some(record)) => {
                self.apply_record(record);
                Ok(self.sequencer.resume())
            }
            Ok(None) => Ok(self.sequencer.resume()),
            Err(err) => {
                self.teardown(
                    RemovalReason::SyncFailed,
                    EVENT_SYNC_FAILED,
                    &err.to_string(),
                    err.code(),
                    false,
                );
                Err(RoomsyncError::sync_failed(err.to_string()))
            }
        }
    }

    async fn fetch_current(&self, trigger: &SessionRecord) -> Result<Option<SessionRecord>> {
        if let Some(sync_url) = self.sequencer.sync_url() {
            match self.fetcher.fetch_delta_catch_up(sync_url).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    tracing::warn!(
                        "Delta catch-up failed, falling back to full fetch: {}",
                        err
                    );
                }
            }
        }

        let url = trigger
            .url
            .clone()
            .or_else(|| {
                self.sequencer
                    .working_copy()
                    .and_then(|w| w.url.clone())
            })
            .ok_or_else(|| RoomsyncError::internal("no url to resynchronize from"))?;
        self.fetcher.fetch_full(&url).await.map(Some)
    }

    /// Diffs one accepted record against the working copy, publishes the
    /// named events and mirror updates, evaluates liveness, and advances
    /// the sequencer.
    fn apply_record(&mut self, record: SessionRecord) {
        if self.destroyed {
            return;
        }
        let old = self.sequencer.working_copy().cloned();

        if record.is_delta() && is_self_moved_transition(&record) {
            tracing::info!("Skipping transient moved/left self transition");
            return;
        }

        // a delta only carries changed fields; the applied record keeps the
        // rest from the working copy
        let applied = match &old {
            Some(old_record) if record.is_delta() => merge_records(old_record, &record),
            _ => record.clone(),
        };

        self.update_url(old.as_ref(), &record);
        self.update_controls(old.as_ref(), &record);
        self.update_full_state(old.as_ref(), &record);
        self.update_info(old.as_ref(), &record);
        let self_moderator_changed = self.update_self(old.as_ref(), &record);
        self.update_host(old.as_ref(), &record, self_moderator_changed);
        self.update_media_shares(old.as_ref(), &record);
        self.update_embedded_apps(old.as_ref(), &record);
        self.update_participants(old.as_ref(), &record, &applied);
        self.update_services(old.as_ref(), &record);

        if let Some(reason) = evaluate_liveness(&applied) {
            // leaving first only makes sense while the local user is still
            // joined on the server, which only the partner-left case allows
            let should_leave = reason == RemovalReason::PartnerLeft
                && applied
                    .self_participant
                    .as_ref()
                    .and_then(|s| s.state)
                    == Some(ParticipantState::Joined);
            self.teardown(
                reason,
                EVENT_REMOTE_ENDED,
                &format!("session ended remotely: {reason}"),
                None,
                should_leave,
            );
        }

        self.cache.update(&applied);
        self.sequencer.advance(applied);
    }

    fn update_url(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) {
        let Some(url) = &record.url else { return };
        if old.and_then(|o| o.url.as_ref()) != Some(url) {
            self.notifier.publish(ChangeEvent::SessionUrlUpdated {
                url: url.clone(),
            });
            self.mirror.apply(MirrorUpdate::Url(url.clone()));
        }
    }

    fn update_controls(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) {
        let Some(new_controls) = &record.controls else {
            return;
        };
        let result = controls::diff(old.and_then(|o| o.controls.as_ref()), new_controls);
        let updates = result.updates;
        let current = result.current;

        if let Some(state) = resolve_recording_state(&updates, &current) {
            self.notifier.publish(ChangeEvent::RecordingUpdated {
                state,
                recording: current.recording.clone(),
            });
        }
        if updates.has_meeting_container_changed {
            self.notifier.publish(ChangeEvent::MeetingContainerUpdated {
                url: current.meeting_container_url.clone(),
            });
        }
        if updates.has_transcribe_changed {
            self.notifier.publish(ChangeEvent::TranscribeUpdated {
                transcribe: current.transcribe,
            });
        }
        if updates.has_manual_caption_changed {
            self.notifier.publish(ChangeEvent::ManualCaptionUpdated {
                enabled: current.manual_caption_enabled,
            });
        }
        if updates.has_entry_exit_tone_changed {
            self.notifier.publish(ChangeEvent::EntryExitToneUpdated {
                tone: current.entry_exit_tone.clone(),
            });
        }
        if updates.has_mute_on_entry_changed {
            self.notifier.publish(ChangeEvent::MuteOnEntryUpdated {
                enabled: current.mute_on_entry,
            });
        }
        if updates.has_share_control_changed {
            self.notifier.publish(ChangeEvent::ShareControlUpdated {
                mode: current.share_control_mode.clone(),
            });
        }
        if updates.has_disallow_unmute_changed {
            self.notifier.publish(ChangeEvent::DisallowUnmuteUpdated {
                enabled: current.disallow_unmute,
            });
        }
        if updates.has_reactions_changed {
            self.notifier.publish(ChangeEvent::ReactionsUpdated {
                reactions: current.reactions,
            });
        }
        if updates.has_reaction_display_names_changed {
            self.notifier
                .publish(ChangeEvent::ReactionDisplayNamesUpdated {
                    enabled: current.reactions.show_display_names,
                });
        }
        if updates.has_view_participant_list_changed {
            self.notifier
                .publish(ChangeEvent::ViewParticipantListUpdated {
                    enabled: current.view_participant_list,
                });
        }
        if updates.has_raise_hand_changed {
            self.notifier.publish(ChangeEvent::RaiseHandUpdated {
                enabled: current.raise_hand,
            });
        }
        if updates.has_video_changed {
            self.notifier.publish(ChangeEvent::VideoControlUpdated {
                enabled: current.video_enabled.unwrap_or(false),
            });
        }
        if updates.has_video_enabled_changed {
            self.notifier.publish(ChangeEvent::VideoEnabledUpdated {
                enabled: current.video_enabled,
            });
        }
        if updates.has_breakout_changed {
            self.notifier.publish(ChangeEvent::BreakoutControlUpdated {
                breakout: current.breakout.clone(),
            });
        }
        if updates.has_interpretation_changed {
            self.notifier
                .publish(ChangeEvent::InterpretationControlUpdated {
                    interpretation: current.interpretation.clone(),
                });
        }

        if updates != ControlsUpdates::default() {
            self.mirror.apply(MirrorUpdate::Controls(current));
        }
    }

    fn update_full_state(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) {
        let Some(new_full_state) = &record.full_state else {
            return;
        };
        let result = full_state::diff(old.and_then(|o| o.full_state.as_ref()), new_full_state);

        if result.updates.type_changed {
            self.notifier.publish(ChangeEvent::SessionTypeUpdated {
                state: result.current.clone(),
            });
        }
        if result.updates.state_changed {
            self.notifier.publish(ChangeEvent::SessionStateUpdated {
                state: result.current.clone(),
            });
        }
        if result.updates.ended {
            self.notifier.publish(ChangeEvent::SessionEnded);
        }
        if result.updates.terminating {
            self.notifier.publish(ChangeEvent::SessionTerminating);
        }
        if result.updates.type_changed || result.updates.state_changed {
            self.mirror.apply(MirrorUpdate::FullState(result.current));
        }
    }

    fn update_info(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) {
        let Some(new_info) = &record.info else { return };
        let result = info::diff(old.and_then(|o| o.info.as_ref()), new_info);

        if result.updates.locked {
            self.notifier.publish(ChangeEvent::SessionLocked);
        }
        if result.updates.unlocked {
            self.notifier.publish(ChangeEvent::SessionUnlocked);
        }
        if result.updates.changed {
            self.notifier.publish(ChangeEvent::InfoUpdated {
                info: result.current.clone(),
            });
            self.mirror.apply(MirrorUpdate::Info(result.current));
        }
    }

    /// Returns whether the local user's moderator flag changed, which also
    /// requires re-evaluating host assignability.
    fn update_self(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) -> bool {
        let Some(new_self) = &record.self_participant else {
            return false;
        };
        let result = self_state::diff(old.and_then(|o| o.self_participant.as_ref()), new_self);
        let updates = result.updates;
        let current = result.current;

        if updates.is_unadmitted {
            self.notifier.publish(ChangeEvent::SelfUnadmitted {
                current: current.clone(),
            });
        }
        if updates.is_admitted {
            self.notifier.publish(ChangeEvent::SelfAdmitted {
                current: current.clone(),
            });
        }
        if updates.moderator_changed {
            self.notifier.publish(ChangeEvent::ModeratorUpdated {
                moderator: current.moderator,
            });
        }
        if updates.roles_changed {
            self.notifier.publish(ChangeEvent::RolesUpdated {
                roles: current.roles.clone(),
            });
        }
        if updates.muted_by_others_changed {
            self.notifier.publish(ChangeEvent::MutedByOthers {
                muted: current.remote_muted == Some(true),
                unmute_allowed: current.unmute_allowed,
            });
        }
        if updates.video_muted_by_others_changed {
            self.notifier.publish(ChangeEvent::VideoMutedByOthers {
                muted: current.remote_video_muted == Some(true),
            });
        }
        if updates.local_unmute_required {
            self.notifier.publish(ChangeEvent::LocalUnmuteRequired);
        }
        if updates.local_unmute_requested {
            self.notifier.publish(ChangeEvent::LocalUnmuteRequested);
        }
        if updates.layout_changed {
            self.notifier.publish(ChangeEvent::LayoutUpdated {
                layout: current.layout.clone(),
            });
        }
        if updates.breakouts_changed {
            self.notifier.publish(ChangeEvent::SelfBreakoutUpdated {
                breakout: current.breakout.clone(),
            });
        }
        if updates.interpretation_changed {
            self.notifier.publish(ChangeEvent::SelfInterpretationUpdated {
                interpretation: current.interpretation.clone(),
            });
        }
        if updates.observing_changed {
            self.notifier.publish(ChangeEvent::ObservingUpdated {
                observing: current.observing,
            });
        }
        if updates.can_not_view_participant_list_changed {
            self.notifier
                .publish(ChangeEvent::CannotViewParticipantListUpdated {
                    blocked: current.can_not_view_the_participant_list,
                });
        }
        if updates.is_sharing_blocked_changed {
            self.notifier.publish(ChangeEvent::SharingBlockedUpdated {
                blocked: current.is_sharing_blocked,
            });
        }
        if updates.media_status_changed {
            self.notifier.publish(ChangeEvent::MediaStatusUpdated {
                status: current.media_status.clone(),
            });
        }
        if updates.media_inactive_or_released {
            self.notifier.publish(ChangeEvent::DisconnectDueToInactivity);
        }

        let moderator_changed = updates.moderator_changed;
        if updates != self_state::SelfUpdates::default() {
            self.mirror.apply(MirrorUpdate::SelfState(current));
        }
        moderator_changed
    }

    fn update_host(
        &mut self,
        old: Option<&SessionRecord>,
        record: &SessionRecord,
        self_moderator_changed: bool,
    ) {
        let mut host_changed = false;
        if let Some(new_host) = &record.host {
            let result = host::diff(old.and_then(|o| o.host.as_ref()), new_host);
            if result.updates.is_new_host {
                host_changed = true;
                self.notifier.publish(ChangeEvent::HostUpdated {
                    host: Some(result.current.clone()),
                });
                self.mirror.apply(MirrorUpdate::Host(Some(result.current)));
            }
        }

        if host_changed || self_moderator_changed {
            self.evaluate_can_assign_host(record, old);
        }
    }

    /// The local user can assign the host role when moderating, when already
    /// the host, or when they created a session that has no host yet.
    fn evaluate_can_assign_host(
        &mut self,
        record: &SessionRecord,
        old: Option<&SessionRecord>,
    ) {
        let self_raw = record
            .self_participant
            .as_ref()
            .or_else(|| old.and_then(|o| o.self_participant.as_ref()));
        let host_raw = record
            .host
            .as_ref()
            .or_else(|| old.and_then(|o| o.host.as_ref()));

        let identity = self_raw
            .and_then(|s| s.person.as_ref())
            .and_then(|p| p.id.as_deref());
        let moderator = self_raw.and_then(|s| s.moderator);
        let creator = self_raw.and_then(|s| s.is_creator).unwrap_or(false);
        let host_id = host_raw.and_then(|h| h.id.as_deref());

        let can_assign = moderator == Some(true)
            || (identity.is_some() && identity == host_id)
            || (creator && host_id.is_none());

        if self.can_assign_host != Some(can_assign) {
            self.can_assign_host = Some(can_assign);
            self.notifier
                .publish(ChangeEvent::CanAssignHostUpdated { can_assign });
        }
    }

    fn update_media_shares(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) {
        let Some(new_shares) = &record.media_shares else {
            return;
        };
        let result = media_shares::diff(old.and_then(|o| o.media_shares.as_deref()), new_shares);
        if result.updates.content_floor_changed || result.updates.whiteboard_floor_changed {
            self.notifier.publish(ChangeEvent::MediaSharesUpdated {
                shares: result.current.clone(),
            });
            self.mirror.apply(MirrorUpdate::MediaShares(result.current));
        }
    }

    fn update_embedded_apps(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) {
        let Some(new_apps) = &record.embedded_apps else {
            return;
        };
        let result = embedded_apps::diff(old.and_then(|o| o.embedded_apps.as_deref()), new_apps);
        if result.updates.apps_changed {
            self.notifier.publish(ChangeEvent::EmbeddedAppsUpdated {
                apps: result.current.clone(),
            });
            self.mirror.apply(MirrorUpdate::EmbeddedApps(result.current));
        }
    }

    fn update_participants(
        &mut self,
        old: Option<&SessionRecord>,
        record: &SessionRecord,
        applied: &SessionRecord,
    ) {
        let Some(new_roster) = &record.participants else {
            return;
        };
        let replace = needs_member_refresh(
            old.and_then(|o| o.controls.as_ref()),
            record.controls.as_ref(),
        );
        let old_roster = if replace {
            None
        } else {
            old.and_then(|o| o.participants.as_deref())
        };
        let deltas = compute_participant_deltas(old_roster, new_roster);

        if replace || deltas.iter().any(|d| d.has_changes()) {
            self.notifier.publish(ChangeEvent::ParticipantsUpdated {
                deltas,
                replace,
            });
            let roster = if replace {
                new_roster.clone()
            } else {
                applied.participants.clone().unwrap_or_default()
            };
            self.mirror.apply(MirrorUpdate::Participants(roster));
        }
    }

    fn update_services(&mut self, old: Option<&SessionRecord>, record: &SessionRecord) {
        let Some(services) = record.links.as_ref().and_then(|l| l.services.as_ref()) else {
            return;
        };
        let old_services = old
            .and_then(|o| o.links.as_ref())
            .and_then(|l| l.services.as_ref());
        if old_services != Some(services) {
            self.notifier.publish(ChangeEvent::ServicesUpdated {
                services: services.clone(),
            });
            self.mirror.apply(MirrorUpdate::Services(services.clone()));
        }
    }

    /// 1:1 call signalling: the remote party answering or declining arrives
    /// as a participant push on a CALL record.
    fn publish_remote_response(&self, kind: PushEventKind) {
        let Some(working) = self.sequencer.working_copy() else {
            return;
        };
        let session_type = working
            .full_state
            .as_ref()
            .and_then(|f| f.session_type)
            .unwrap_or_default();
        if session_type != SessionType::Call {
            return;
        }
        let Some(roster) = &working.participants else {
            return;
        };
        let Some(partner) = find_partner(roster, working.self_participant.as_ref()) else {
            return;
        };

        match kind {
            PushEventKind::ParticipantDeclined
                if partner.state == Some(ParticipantState::Declined) =>
            {
                self.notifier.publish(ChangeEvent::RemoteDeclined);
            }
            PushEventKind::ParticipantJoined | PushEventKind::ParticipantUpdated
                if partner.state == Some(ParticipantState::Joined) =>
            {
                self.notifier.publish(ChangeEvent::RemoteAnswered);
            }
            _ => {}
        }
    }

    /// Tears the mirror down exactly once: one telemetry report, then the
    /// destroy event. Every later record is ignored.
    fn teardown(
        &mut self,
        reason: RemovalReason,
        event_name: &str,
        detail: &str,
        code: Option<u16>,
        should_leave: bool,
    ) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        tracing::warn!(%reason, detail, "Tearing down session mirror");
        self.telemetry
            .report(TelemetryReport::new(event_name, detail, code));

        self.notifier.publish(ChangeEvent::DestroySession {
            reason,
            should_leave,
        });
    }
}

/// A delta reporting the local user as moved-and-left is a transient
/// artifact of switching sessions, not a real departure.
fn is_self_moved_transition(record: &SessionRecord) -> bool {
    record.self_participant.as_ref().is_some_and(|s| {
        s.reason == Some(TransitionReason::Moved) && s.state == Some(ParticipantState::Left)
    })
}

/// Terminal-state evaluation, per session type.
fn evaluate_liveness(record: &SessionRecord) -> Option<RemovalReason> {
    let full_state = record.full_state.as_ref()?;
    let state = full_state.state?;
    let session_type = full_state.session_type.unwrap_or_default();

    let self_participant = record.self_participant.as_ref();
    let self_state = self_participant.and_then(|s| s.state);
    let self_removed = self_participant
        .and_then(|s| s.removed)
        .unwrap_or(false);

    match session_type {
        SessionType::Call | SessionType::SipBridge => {
            if state == roomsync_core::SessionState::Inactive
                || full_state.active == Some(false)
            {
                return Some(RemovalReason::CallInactive);
            }

            // a call is only over for specific combinations of the two
            // parties' states; one side LEFT while the other is active is
            // still a live call (ringing, on hold, rejoining)
            let partner_state = record
                .participants
                .as_ref()
                .and_then(|roster| find_partner(roster, self_participant))
                .and_then(|partner| partner.state);
            if partner_state == Some(ParticipantState::Left)
                && matches!(
                    self_state,
                    Some(ParticipantState::Notified)
                        | Some(ParticipantState::Declined)
                        | Some(ParticipantState::Joined)
                )
            {
                return Some(RemovalReason::PartnerLeft);
            }
            if self_state == Some(ParticipantState::Left)
                && matches!(
                    partner_state,
                    Some(ParticipantState::Left)
                        | Some(ParticipantState::Declined)
                        | Some(ParticipantState::Notified)
                        | Some(ParticipantState::Idle)
                )
            {
                return Some(RemovalReason::SelfLeft);
            }
            None
        }
        SessionType::Meeting => {
            if full_state.removed.unwrap_or(false) {
                return Some(RemovalReason::FullStateRemoved);
            }
            if self_removed {
                return Some(RemovalReason::SelfRemoved);
            }
            if matches!(
                state,
                roomsync_core::SessionState::Inactive | roomsync_core::SessionState::Terminating
            ) {
                return Some(RemovalReason::MeetingInactiveTerminating);
            }
            None
        }
        SessionType::Unknown => None,
    }
}
