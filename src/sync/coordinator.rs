//! Turn-ownership coordinator.
//!
//! The coordinator gates when actions may be applied on this client and
//! keeps replicas in step:
//!
//! ## Submitting
//! `submit_action` validates synchronously, then opens the serialization
//! window (`CoordinatorPhase::AwaitingResolution`): the action is handed to
//! the observer, the presentation delay elapses, and the transition is
//! committed to a local copy of the state which replaces the old one and is
//! published through the [`Transport`]. Dropping the returned future before
//! the commit abandons the action and reopens the turn.
//!
//! ## Remote updates
//! Inbound records replace the local state wholesale. A record equal to the
//! current state is ignored, as is one with an older revision. A record
//! arriving during a serialization window supersedes the in-flight action,
//! which is abandoned at commit time.
//!
//! ## Timers
//! Computer seats owned by this client act after `ai_think_delay`. Owned
//! human seats may have a turn timer that forces a draw. The owner of the
//! seat that ended a round deals the next one after `inter_round_delay`.
//! Every timer is cancelled on the next commit and on termination.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ai::{RandomPolicy, SeatPolicy};
use crate::core::{
    Action, ActionRejected, ConfigError, MatchConfig, MatchRng, MatchState, Phase, SeatId,
    StoreError, TimingConfig, WhotError, AI_STREAM,
};
use crate::lifecycle::{force_draw, play_turn, start_match, start_next_round, TurnOutcome};
use crate::rules::validate;

use super::dto::{MatchSnapshot, MatchStateDto, SeatIdentity};
use super::observer::{MatchObserver, NullObserver, NullStats, StatsReporter, TerminationReason};
use super::store::StoreEvent;
use super::timer::{sleep_or_cancel, OneShotTimer};
use super::transport::{LocalTransport, Transport};

const LOG_TARGET: &str = "whot_engine::sync";

/// What the coordinator currently accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoordinatorPhase {
    /// Ready for an intent from the seat whose turn it is.
    Idle,
    /// An accepted action is being presented and not yet committed.
    AwaitingResolution,
    /// Round end, game end, no state yet, or terminated.
    Locked,
}

/// Result of an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Committed(TurnOutcome),
    /// Superseded by a remote update or cut short by termination.
    Abandoned,
}

/// Which seats this client drives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub match_id: String,
    /// Human seats controlled on this device.
    pub local_seats: Vec<SeatId>,
    /// This client plays for every computer seat.
    pub drives_computer_seats: bool,
    /// Identity metadata published with every record.
    pub identities: Vec<SeatIdentity>,
    pub timing: TimingConfig,
}

impl CoordinatorConfig {
    pub fn new(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            ..Self::default()
        }
    }

    /// Host configuration: every human seat in `config` is local and the
    /// computer seats are driven here.
    pub fn host(match_id: impl Into<String>, config: &MatchConfig) -> Self {
        let local_seats = config
            .seats
            .iter()
            .enumerate()
            .filter(|(_, seat)| !seat.computer)
            .map(|(i, _)| SeatId::new(i as u8))
            .collect();
        Self {
            match_id: match_id.into(),
            local_seats,
            drives_computer_seats: true,
            identities: Vec::new(),
            timing: config.timing.clone(),
        }
    }

    #[must_use]
    pub fn local_seat(mut self, seat: SeatId) -> Self {
        self.local_seats.push(seat);
        self
    }

    #[must_use]
    pub fn drives_computer_seats(mut self, drives: bool) -> Self {
        self.drives_computer_seats = drives;
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: SeatIdentity) -> Self {
        self.identities.push(identity);
        self
    }

    #[must_use]
    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local_seats.is_empty() && !self.drives_computer_seats {
            return Err(ConfigError::NoLocalSeats);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Timers {
    ai: Option<OneShotTimer>,
    turn: Option<OneShotTimer>,
    inter_round: Option<OneShotTimer>,
}

impl Timers {
    fn cancel_all(&mut self) {
        for timer in [self.ai.take(), self.turn.take(), self.inter_round.take()]
            .into_iter()
            .flatten()
        {
            timer.cancel();
        }
    }

    fn armed(&self) -> usize {
        [&self.ai, &self.turn, &self.inter_round]
            .into_iter()
            .flatten()
            .filter(|t| !t.is_cancelled() && !t.is_finished())
            .count()
    }
}

struct Inner {
    state: Option<MatchState>,
    phase: CoordinatorPhase,
    /// Bumped whenever `state` is replaced. Tickets from an older epoch are
    /// abandoned.
    epoch: u64,
    ai_rng: Option<MatchRng>,
    /// Published with every record; local entries override remote ones.
    identities: Vec<SeatIdentity>,
    reported_round: Option<u32>,
    terminated: Option<TerminationReason>,
    timers: Timers,
}

struct Shared<T> {
    transport: T,
    config: CoordinatorConfig,
    observer: Arc<dyn MatchObserver>,
    stats: Arc<dyn StatsReporter>,
    policy: Arc<dyn SeatPolicy>,
    cancel: CancellationToken,
    /// Ticks on every state replacement and on termination.
    changes: watch::Sender<u64>,
    inner: Mutex<Inner>,
}

/// An accepted action waiting for its commit.
#[derive(Clone, Copy, Debug)]
struct Ticket {
    seat: SeatId,
    action: Action,
    epoch: u64,
    timed_out: bool,
}

enum Commit {
    Applied(MatchState, TurnOutcome),
    Superseded,
    Dropped,
}

fn phase_for(state: &MatchState) -> CoordinatorPhase {
    match state.phase {
        Phase::Playing => CoordinatorPhase::Idle,
        Phase::Dealing | Phase::RoundEnd | Phase::GameEnd => CoordinatorPhase::Locked,
    }
}

/// Remote identities with this client's own entries laid over them.
fn merge_identities(local: &[SeatIdentity], remote: Vec<SeatIdentity>) -> Vec<SeatIdentity> {
    let mut merged: Vec<SeatIdentity> = remote
        .into_iter()
        .filter(|r| local.iter().all(|l| l.seat != r.seat))
        .collect();
    merged.extend(local.iter().cloned());
    merged.sort_by_key(|i| i.seat);
    merged
}

/// Reopens the turn if a serialization window is dropped before it commits,
/// e.g. when the caller of `submit_action` times out mid-delay.
struct WindowGuard<'a, T: Transport> {
    coordinator: &'a Coordinator<T>,
    epoch: u64,
    armed: bool,
}

impl<T: Transport> Drop for WindowGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let reopened = {
            let mut inner = self.coordinator.shared.inner.lock();
            if inner.terminated.is_some() || inner.phase != CoordinatorPhase::AwaitingResolution {
                false
            } else {
                inner.phase = inner
                    .state
                    .as_ref()
                    .map_or(CoordinatorPhase::Locked, phase_for);
                true
            }
        };
        if !reopened {
            return;
        }
        debug!(target: LOG_TARGET, epoch = self.epoch, "submission dropped before commit");
        // timers need a runtime; none is left when the runtime itself is dropping us
        if tokio::runtime::Handle::try_current().is_ok() {
            self.coordinator.schedule_follow_up();
        }
    }
}

/// Builder for [`Coordinator`].
pub struct CoordinatorBuilder<T: Transport> {
    transport: T,
    config: CoordinatorConfig,
    observer: Arc<dyn MatchObserver>,
    stats: Arc<dyn StatsReporter>,
    policy: Arc<dyn SeatPolicy>,
    ai_rng: Option<MatchRng>,
}

impl<T: Transport> CoordinatorBuilder<T> {
    #[must_use]
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn MatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn stats(mut self, stats: Arc<dyn StatsReporter>) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: Arc<dyn SeatPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Seed for computer-seat decisions. Defaults to a stream derived from the match RNG.
    #[must_use]
    pub fn ai_seed(mut self, seed: u64) -> Self {
        self.ai_rng = Some(MatchRng::new(seed));
        self
    }

    pub fn build(self) -> Result<Coordinator<T>, ConfigError> {
        self.config.validate()?;
        let identities = self.config.identities.clone();
        let (changes, _) = watch::channel(0);
        Ok(Coordinator {
            shared: Arc::new(Shared {
                transport: self.transport,
                config: self.config,
                observer: self.observer,
                stats: self.stats,
                policy: self.policy,
                cancel: CancellationToken::new(),
                changes,
                inner: Mutex::new(Inner {
                    state: None,
                    phase: CoordinatorPhase::Locked,
                    epoch: 0,
                    ai_rng: self.ai_rng,
                    identities,
                    reported_round: None,
                    terminated: None,
                    timers: Timers::default(),
                }),
            }),
        })
    }
}

/// Serializes local intents, applies remote updates and drives timers for
/// one match on this client.
///
/// Cheap to clone; clones share the same match. Timers are tokio tasks, so
/// methods that commit or attach must run inside a tokio runtime.
pub struct Coordinator<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for Coordinator<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Coordinator<LocalTransport> {
    /// Start a single-device match from `config`.
    pub fn local(
        config: &MatchConfig,
        observer: Arc<dyn MatchObserver>,
        stats: Arc<dyn StatsReporter>,
    ) -> Result<Self, WhotError> {
        let state = start_match(config)?;
        let coordinator = Coordinator::builder(LocalTransport)
            .config(CoordinatorConfig::host("local", config))
            .observer(observer)
            .stats(stats)
            .build()?;
        coordinator.start(state)?;
        Ok(coordinator)
    }
}

impl<T: Transport> Coordinator<T> {
    pub fn builder(transport: T) -> CoordinatorBuilder<T> {
        CoordinatorBuilder {
            transport,
            config: CoordinatorConfig::default(),
            observer: Arc::new(NullObserver),
            stats: Arc::new(NullStats),
            policy: Arc::new(RandomPolicy),
            ai_rng: None,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.shared.config
    }

    pub fn transport(&self) -> &T {
        &self.shared.transport
    }

    /// Copy of the current authoritative state.
    pub fn snapshot(&self) -> Option<MatchState> {
        self.shared.inner.lock().state.clone()
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.shared.inner.lock().phase
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.shared.inner.lock().terminated.clone()
    }

    /// Timers currently waiting to fire.
    pub fn armed_timers(&self) -> usize {
        self.shared.inner.lock().timers.armed()
    }

    /// Does this client act for `seat`?
    pub fn owns_seat(&self, seat: SeatId) -> bool {
        let inner = self.shared.inner.lock();
        inner.state.as_ref().is_some_and(|state| self.owns(state, seat))
    }

    fn owns(&self, state: &MatchState, seat: SeatId) -> bool {
        let config = &self.shared.config;
        config.local_seats.contains(&seat)
            || (config.drives_computer_seats && state.seat(seat).is_some_and(|s| s.is_computer))
    }

    /// Install `state` as the authoritative starting state and publish it.
    pub fn start(&self, state: MatchState) -> Result<(), WhotError> {
        state.check_conservation()?;
        if self.shared.inner.lock().terminated.is_some() {
            return Err(ActionRejected::NotPlaying.into());
        }
        self.shared
            .transport
            .publish(&MatchStateDto::new(&state, &self.shared.config.identities))?;

        {
            let mut inner = self.shared.inner.lock();
            if inner.ai_rng.is_none() {
                inner.ai_rng = Some(state.rng.derive(AI_STREAM));
            }
            inner.state = Some(state.clone());
            inner.epoch += 1;
            inner.phase = phase_for(&state);
        }
        info!(
            target: LOG_TARGET,
            match_id = %self.shared.config.match_id,
            revision = state.revision,
            "coordinator started"
        );
        self.present(&state);
        self.schedule_follow_up();
        Ok(())
    }

    /// Subscribe to remote changes. A client without a state yet (joining)
    /// loads the current record.
    pub fn attach(&self) -> Result<(), StoreError> {
        let Some(rx) = self.shared.transport.subscribe()? else {
            return Ok(());
        };
        tokio::spawn(self.clone().listen(rx));

        if self.snapshot().is_none() {
            let record = self
                .shared
                .transport
                .fetch()?
                .ok_or_else(|| StoreError::RecordMissing(self.shared.config.match_id.clone()))?;
            self.apply_remote(StoreEvent::Updated(Box::new(record)));
        }
        Ok(())
    }

    async fn listen(self, mut rx: broadcast::Receiver<StoreEvent>) {
        loop {
            tokio::select! {
                biased;
                () = self.shared.cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Ok(event) => self.apply_remote(event),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(target: LOG_TARGET, skipped, "subscription lagged");
                    }
                    Err(RecvError::Closed) => {
                        self.terminate(TerminationReason::StoreFailed(StoreError::Unavailable(
                            "subscription closed".into(),
                        )));
                        break;
                    }
                },
            }
        }
    }

    /// Submit an intent for `seat`.
    ///
    /// Rejections are returned before anything is presented and leave no
    /// trace. An accepted intent is committed after the presentation delay
    /// unless a remote update or termination gets there first.
    pub async fn submit_action(
        &self,
        seat: SeatId,
        action: Action,
    ) -> Result<Submission, ActionRejected> {
        let ticket = {
            let mut inner = self.shared.inner.lock();
            self.reserve(&mut inner, seat, action, false)?
        };
        Ok(self.resolve(ticket).await)
    }

    fn reserve(
        &self,
        inner: &mut Inner,
        seat: SeatId,
        action: Action,
        timed_out: bool,
    ) -> Result<Ticket, ActionRejected> {
        let checked = self.check_intent(inner, seat, &action);
        if let Err(reason) = &checked {
            debug!(target: LOG_TARGET, %seat, ?action, %reason, "intent rejected");
            return Err(reason.clone());
        }

        inner.phase = CoordinatorPhase::AwaitingResolution;
        if let Some(timer) = inner.timers.turn.take() {
            timer.cancel();
        }
        debug!(target: LOG_TARGET, %seat, ?action, "intent accepted");
        Ok(Ticket {
            seat,
            action,
            epoch: inner.epoch,
            timed_out,
        })
    }

    fn check_intent(&self, inner: &Inner, seat: SeatId, action: &Action) -> Result<(), ActionRejected> {
        let state = match (&inner.terminated, &inner.state) {
            (None, Some(state)) => state,
            _ => return Err(ActionRejected::NotPlaying),
        };
        match inner.phase {
            CoordinatorPhase::AwaitingResolution => return Err(ActionRejected::ActionInFlight),
            CoordinatorPhase::Locked => return Err(ActionRejected::NotPlaying),
            CoordinatorPhase::Idle => {}
        }
        if state.seat(seat).is_none() {
            return Err(ActionRejected::UnknownSeat(seat));
        }
        if !self.owns(state, seat) {
            return Err(ActionRejected::SeatNotOwned(seat));
        }
        validate(state, seat, action)
    }

    async fn resolve(&self, ticket: Ticket) -> Submission {
        let mut window = WindowGuard {
            coordinator: self,
            epoch: ticket.epoch,
            armed: true,
        };
        self.shared.observer.on_action_accepted(ticket.seat, &ticket.action);

        let delay = self.shared.config.timing.presentation_delay;
        if !sleep_or_cancel(delay, &self.shared.cancel).await {
            return Submission::Abandoned;
        }
        window.armed = false;

        let commit = {
            let mut inner = self.shared.inner.lock();
            Self::commit_ticket(&mut inner, &ticket)
        };
        match commit {
            Commit::Applied(state, outcome) if self.after_commit(&state) => {
                Submission::Committed(outcome)
            }
            Commit::Applied(..) => Submission::Abandoned,
            Commit::Superseded => {
                self.schedule_follow_up();
                Submission::Abandoned
            }
            Commit::Dropped => Submission::Abandoned,
        }
    }

    fn commit_ticket(inner: &mut Inner, ticket: &Ticket) -> Commit {
        if inner.terminated.is_some() {
            return Commit::Dropped;
        }
        let Some(current) = inner.state.as_ref() else {
            return Commit::Dropped;
        };
        if inner.epoch != ticket.epoch {
            debug!(target: LOG_TARGET, seat = %ticket.seat, "in-flight action superseded");
            inner.phase = phase_for(current);
            return Commit::Superseded;
        }

        let mut next = current.clone();
        let applied = if ticket.timed_out {
            force_draw(&mut next, ticket.seat)
        } else {
            play_turn(&mut next, ticket.seat, &ticket.action)
        };
        let outcome = match applied {
            Ok(outcome) => outcome,
            Err(reason) => {
                debug!(target: LOG_TARGET, seat = %ticket.seat, %reason, "commit rejected");
                inner.phase = phase_for(current);
                return Commit::Superseded;
            }
        };
        if let Err(violation) = next.check_conservation() {
            panic!("card conservation broken after {:?}: {violation}", ticket.action);
        }

        inner.phase = phase_for(&next);
        inner.state = Some(next.clone());
        inner.epoch += 1;
        Commit::Applied(next, outcome)
    }

    /// Publish a locally committed state and run everything that follows.
    ///
    /// A failed publish terminates the match; returns whether it succeeded.
    fn after_commit(&self, state: &MatchState) -> bool {
        let identities = self.shared.inner.lock().identities.clone();
        let record = MatchStateDto::new(state, &identities);
        if let Err(e) = self.shared.transport.publish(&record) {
            self.terminate(TerminationReason::StoreFailed(e));
            return false;
        }
        self.present(state);
        self.schedule_follow_up();
        true
    }

    fn present(&self, state: &MatchState) {
        self.shared.changes.send_modify(|n| *n += 1);
        self.shared.observer.on_state_committed(state);
        self.announce_round_end(state);
    }

    fn announce_round_end(&self, state: &MatchState) {
        if !matches!(state.phase, Phase::RoundEnd | Phase::GameEnd) {
            return;
        }
        let Some(record) = state.last_round.as_ref() else {
            return;
        };
        {
            let mut inner = self.shared.inner.lock();
            if inner.reported_round == Some(record.round_number) {
                return;
            }
            inner.reported_round = Some(record.round_number);
        }

        info!(
            target: LOG_TARGET,
            round = record.round_number,
            eliminated = %record.eliminated_seat,
            winner = %record.round_winner,
            "round over"
        );
        self.shared.observer.on_round_end(record);

        for &seat in &self.shared.config.local_seats {
            let Some(played) = state.seat(seat) else {
                continue;
            };
            if played.is_computer || record.total_for(seat).is_none() {
                continue;
            }
            self.shared.stats.report_round_result(
                seat,
                seat == record.round_winner,
                record.round_number,
                played.cards_played,
            );
        }

        if state.phase == Phase::GameEnd {
            info!(target: LOG_TARGET, winner = ?state.winner, "game over");
            self.shared.observer.on_game_end(state.winner);
        }
    }

    /// Arm whichever timer the current state calls for.
    fn schedule_follow_up(&self) {
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;
        inner.timers.cancel_all();
        if inner.terminated.is_some() || inner.phase == CoordinatorPhase::AwaitingResolution {
            return;
        }
        let Some(state) = inner.state.as_ref() else {
            return;
        };

        let seat = state.current_seat;
        if !self.owns(state, seat) {
            return;
        }
        let epoch = inner.epoch;
        let timing = &self.shared.config.timing;
        let cancel = &self.shared.cancel;

        match state.phase {
            Phase::Playing if state.seat(seat).is_some_and(|s| s.is_computer) => {
                let this = self.clone();
                inner.timers.ai = Some(OneShotTimer::spawn(cancel, timing.ai_think_delay, move || {
                    this.run_computer_turn(seat, epoch)
                }));
            }
            Phase::Playing => {
                if let Some(timeout) = timing.turn_timeout {
                    let this = self.clone();
                    inner.timers.turn = Some(OneShotTimer::spawn(cancel, timeout, move || {
                        this.expire_turn(seat, epoch)
                    }));
                }
            }
            Phase::RoundEnd => {
                let this = self.clone();
                inner.timers.inter_round =
                    Some(OneShotTimer::spawn(cancel, timing.inter_round_delay, move || {
                        this.advance_round(epoch)
                    }));
            }
            Phase::Dealing | Phase::GameEnd => {}
        }
    }

    async fn run_computer_turn(self, seat: SeatId, epoch: u64) {
        let ticket = {
            let mut guard = self.shared.inner.lock();
            let inner = &mut *guard;
            if inner.epoch != epoch {
                return;
            }
            let Some(state) = inner.state.as_ref() else {
                return;
            };
            let rng = inner.ai_rng.get_or_insert_with(|| state.rng.derive(AI_STREAM));
            let action = self.shared.policy.choose(state, seat, rng);

            match self.reserve(inner, seat, action, false) {
                Ok(ticket) => ticket,
                Err(reason) => {
                    warn!(target: LOG_TARGET, %seat, ?action, %reason, "policy chose a rejected action, drawing");
                    match self.reserve(inner, seat, Action::Draw, false) {
                        Ok(ticket) => ticket,
                        Err(_) => return,
                    }
                }
            }
        };
        self.resolve(ticket).await;
    }

    async fn expire_turn(self, seat: SeatId, epoch: u64) {
        let ticket = {
            let mut inner = self.shared.inner.lock();
            if inner.epoch != epoch {
                return;
            }
            match self.reserve(&mut inner, seat, Action::Draw, true) {
                Ok(ticket) => ticket,
                Err(_) => return,
            }
        };
        info!(target: LOG_TARGET, %seat, "turn timed out");
        self.resolve(ticket).await;
    }

    async fn advance_round(self, epoch: u64) {
        let next = {
            let mut inner = self.shared.inner.lock();
            if inner.epoch != epoch || inner.terminated.is_some() {
                return;
            }
            let Some(finished) = inner.state.as_ref() else {
                return;
            };
            if finished.phase != Phase::RoundEnd {
                return;
            }
            let next = start_next_round(finished);
            if let Err(violation) = next.check_conservation() {
                panic!("card conservation broken dealing round {}: {violation}", next.round_number);
            }
            inner.phase = phase_for(&next);
            inner.state = Some(next.clone());
            inner.epoch += 1;
            next
        };
        debug!(target: LOG_TARGET, round = next.round_number, "next round committed");
        self.after_commit(&next);
    }

    /// Apply a change to the shared record.
    pub fn apply_remote(&self, event: StoreEvent) {
        let record = match event {
            StoreEvent::Updated(record) => *record,
            StoreEvent::Removed => {
                self.terminate(TerminationReason::RecordRemoved);
                return;
            }
        };

        let (next, in_flight) = {
            let mut inner = self.shared.inner.lock();
            if inner.terminated.is_some() {
                return;
            }
            if let Some(current) = inner.state.as_ref() {
                if MatchSnapshot::from(current) == record.state {
                    return;
                }
                if record.state.revision < current.revision {
                    debug!(
                        target: LOG_TARGET,
                        incoming = record.state.revision,
                        current = current.revision,
                        "stale remote record ignored"
                    );
                    return;
                }
            }

            inner.identities = merge_identities(&self.shared.config.identities, record.identities);
            let next = record.state.into_state();
            inner.state = Some(next.clone());
            inner.epoch += 1;
            let in_flight = inner.phase == CoordinatorPhase::AwaitingResolution;
            if !in_flight {
                inner.phase = phase_for(&next);
            }
            (next, in_flight)
        };

        debug!(target: LOG_TARGET, revision = next.revision, "remote state applied");
        self.present(&next);
        if !in_flight {
            self.schedule_follow_up();
        }
    }

    /// Leave the match: cancel timers and windows, discard local state.
    pub fn leave(&self) {
        self.terminate(TerminationReason::Left);
    }

    fn terminate(&self, reason: TerminationReason) {
        {
            let mut inner = self.shared.inner.lock();
            if inner.terminated.is_some() {
                return;
            }
            inner.terminated = Some(reason.clone());
            inner.state = None;
            inner.phase = CoordinatorPhase::Locked;
            inner.timers.cancel_all();
        }
        self.shared.cancel.cancel();

        match &reason {
            TerminationReason::Left => {
                info!(target: LOG_TARGET, match_id = %self.shared.config.match_id, "left match");
            }
            _ => {
                warn!(target: LOG_TARGET, match_id = %self.shared.config.match_id, %reason, "match terminated");
            }
        }
        self.shared.changes.send_modify(|n| *n += 1);
        self.shared.observer.on_match_terminated(&reason);
    }

    /// Wait until the state satisfies `predicate`. Returns `None` once the
    /// match is terminated.
    ///
    /// `predicate` runs under the coordinator lock and must not call back
    /// into the coordinator.
    pub async fn wait_for<F>(&self, predicate: F) -> Option<MatchState>
    where
        F: Fn(&MatchState) -> bool,
    {
        let mut changes = self.shared.changes.subscribe();
        loop {
            {
                let inner = self.shared.inner.lock();
                if inner.terminated.is_some() {
                    return None;
                }
                if let Some(state) = inner.state.as_ref().filter(|&s| predicate(s)) {
                    return Some(state.clone());
                }
            }
            if changes.changed().await.is_err() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::SeatConfig;
    use crate::sync::observer::{ChannelObserver, ObserverEvent};

    fn humans_only(seed: u64) -> MatchConfig {
        MatchConfig::new()
            .seat(SeatConfig::human("Ada"))
            .seat(SeatConfig::human("Bo"))
            .seed(seed)
            .timing(TimingConfig::immediate())
    }

    #[test]
    fn test_host_config_owns_humans() {
        let config = MatchConfig::solo("Ada", 2);
        let coordinator = CoordinatorConfig::host("m", &config);

        assert_eq!(coordinator.local_seats, vec![SeatId::new(0)]);
        assert!(coordinator.drives_computer_seats);
        assert_eq!(
            CoordinatorConfig::new("m").validate(),
            Err(ConfigError::NoLocalSeats)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_intent_rejected_while_in_flight() {
        let config = humans_only(3).timing(TimingConfig {
            presentation_delay: Duration::from_millis(500),
            ..TimingConfig::immediate()
        });
        let coordinator =
            Coordinator::local(&config, Arc::new(NullObserver), Arc::new(NullStats)).unwrap();
        let seat = SeatId::new(0);

        let (first, second) = tokio::join!(
            coordinator.submit_action(seat, Action::Draw),
            coordinator.submit_action(seat, Action::Draw)
        );

        assert!(matches!(first, Ok(Submission::Committed(_))));
        assert_eq!(second, Err(ActionRejected::ActionInFlight));
        assert_eq!(coordinator.phase(), CoordinatorPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_turn_rejected_without_presentation() {
        let (observer, mut events) = ChannelObserver::new();
        let coordinator =
            Coordinator::local(&humans_only(3), Arc::new(observer), Arc::new(NullStats)).unwrap();
        while events.try_recv().is_ok() {}

        let result = coordinator.submit_action(SeatId::new(1), Action::Draw).await;

        assert_eq!(result, Err(ActionRejected::NotYourTurn(SeatId::new(1))));
        assert!(events.try_recv().is_err());
        assert_eq!(coordinator.snapshot().unwrap().revision, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_action_presented_then_committed() {
        let (observer, mut events) = ChannelObserver::new();
        let coordinator =
            Coordinator::local(&humans_only(3), Arc::new(observer), Arc::new(NullStats)).unwrap();
        while events.try_recv().is_ok() {}

        coordinator.submit_action(SeatId::new(0), Action::Draw).await.unwrap();

        assert!(matches!(
            events.try_recv().unwrap(),
            ObserverEvent::ActionAccepted { action: Action::Draw, .. }
        ));
        match events.try_recv().unwrap() {
            ObserverEvent::StateCommitted(state) => {
                assert_eq!(state.revision, 1);
                assert_eq!(state.current_seat, SeatId::new(1));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_timer_forces_draw() {
        let config = humans_only(9).timing(TimingConfig {
            turn_timeout: Some(Duration::from_secs(5)),
            ..TimingConfig::immediate()
        });
        let coordinator =
            Coordinator::local(&config, Arc::new(NullObserver), Arc::new(NullStats)).unwrap();
        assert_eq!(coordinator.armed_timers(), 1);

        let state = tokio::time::timeout(
            Duration::from_secs(60),
            coordinator.wait_for(|s| s.current_seat == SeatId::new(1)),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(state.seats[0].hand.len(), 13);
        assert!(state
            .log
            .iter()
            .any(|e| *e == crate::core::LogEntry::TurnTimedOut { seat: SeatId::new(0) }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submission_reopens_the_turn() {
        let config = humans_only(9).timing(TimingConfig {
            presentation_delay: Duration::from_millis(500),
            turn_timeout: Some(Duration::from_secs(5)),
            ..TimingConfig::immediate()
        });
        let coordinator =
            Coordinator::local(&config, Arc::new(NullObserver), Arc::new(NullStats)).unwrap();

        let cut_short = tokio::time::timeout(
            Duration::from_millis(100),
            coordinator.submit_action(SeatId::new(0), Action::Draw),
        )
        .await;

        assert!(cut_short.is_err());
        assert_eq!(coordinator.phase(), CoordinatorPhase::Idle);
        assert_eq!(coordinator.armed_timers(), 1);
        assert_eq!(coordinator.snapshot().unwrap().revision, 0);

        let again = coordinator.submit_action(SeatId::new(0), Action::Draw).await;
        assert!(matches!(again, Ok(Submission::Committed(_))));
        assert_eq!(coordinator.snapshot().unwrap().revision, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submission_keeps_turn_timer_running() {
        let config = humans_only(9).timing(TimingConfig {
            presentation_delay: Duration::from_millis(500),
            turn_timeout: Some(Duration::from_secs(5)),
            ..TimingConfig::immediate()
        });
        let coordinator =
            Coordinator::local(&config, Arc::new(NullObserver), Arc::new(NullStats)).unwrap();

        let _ = tokio::time::timeout(
            Duration::from_millis(100),
            coordinator.submit_action(SeatId::new(0), Action::Draw),
        )
        .await;
        let state = tokio::time::timeout(
            Duration::from_secs(60),
            coordinator.wait_for(|s| s.current_seat == SeatId::new(1)),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(state.revision, 1);
        assert_eq!(
            state.log.back(),
            Some(&crate::core::LogEntry::TurnTimedOut { seat: SeatId::new(0) })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_cancels_everything() {
        let (observer, mut events) = ChannelObserver::new();
        let config = humans_only(9).timing(TimingConfig {
            turn_timeout: Some(Duration::from_secs(5)),
            ..TimingConfig::immediate()
        });
        let coordinator = Coordinator::local(&config, Arc::new(observer), Arc::new(NullStats)).unwrap();
        assert_eq!(coordinator.armed_timers(), 1);

        coordinator.leave();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(coordinator.armed_timers(), 0);
        assert!(coordinator.snapshot().is_none());
        assert_eq!(coordinator.phase(), CoordinatorPhase::Locked);
        assert_eq!(coordinator.termination(), Some(TerminationReason::Left));
        assert_eq!(
            coordinator.submit_action(SeatId::new(0), Action::Draw).await,
            Err(ActionRejected::NotPlaying)
        );
        let terminated = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|e| matches!(e, ObserverEvent::Terminated(TerminationReason::Left)))
            .count();
        assert_eq!(terminated, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_computer_seat_plays_itself() {
        let config = MatchConfig::solo("Ada", 1)
            .seed(17)
            .timing(TimingConfig::immediate());
        let coordinator =
            Coordinator::local(&config, Arc::new(NullObserver), Arc::new(NullStats)).unwrap();

        coordinator.submit_action(SeatId::new(0), Action::Draw).await.unwrap();
        let state = tokio::time::timeout(
            Duration::from_secs(60),
            coordinator.wait_for(|s| s.revision >= 2),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(state.revision >= 2);
        assert!(!coordinator.owns_seat(SeatId::new(5)));
        assert!(coordinator.owns_seat(SeatId::new(1)));
    }
}
