//! Wizard state machine: session data plus pure command application.
//!
//! Transitions are synchronous and never interrupt each other; a command
//! that is invalid in the current step is a silent no-op. The only refusal
//! surfaced to the player is the gated Design→Plan advance.

use crate::catalog::generate_catalog;
use crate::reveal::reward_for_score;
use crate::store::ConfigStore;
use crate::{
    emit, Counters, Event, EventEnvelope, FlightProfile, GameContent, GameStep, LandingMethod,
    LaunchGrade, MinigameSession, MissionConfig, MissionOutcome, Part, PartId, RevealState,
    SimPhase,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub seed: u64,
    /// Bumped on every restart; outcome responses from an older epoch are stale.
    pub epoch: u64,
    pub schema_version: u32,
    pub content_version: String,
}

/// The whole wizard session. Serializable as-is for snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub meta: SessionMeta,
    pub step: GameStep,
    /// Meaningful only while `step` is `Simulate`.
    pub sim_phase: SimPhase,
    pub config: MissionConfig,
    pub catalog: Vec<Part>,
    pub minigame: Option<MinigameSession>,
    /// Grade of a stopped sweep, waiting for the banner delay to elapse.
    pub pending_launch: Option<LaunchGrade>,
    pub outcome: Option<MissionOutcome>,
    pub reveal: RevealState,
    pub counters: Counters,
}

impl Session {
    pub fn new(content: &GameContent, seed: u64, saved: Option<MissionConfig>) -> Self {
        Session {
            meta: SessionMeta {
                seed,
                epoch: 0,
                schema_version: 1,
                content_version: content.content_version.clone(),
            },
            step: GameStep::Intro,
            sim_phase: SimPhase::Game,
            config: saved.unwrap_or_default(),
            catalog: Vec::new(),
            minigame: None,
            pending_launch: None,
            outcome: None,
            reveal: RevealState::default(),
            counters: Counters { next_event_id: 0 },
        }
    }

    /// Construct a session, restoring any draft configuration the store holds.
    /// The store is read exactly once, here.
    pub fn restore(content: &GameContent, seed: u64, store: &impl ConfigStore) -> Self {
        Self::new(content, seed, store.load())
    }

    pub fn launch_score(&self) -> Option<u32> {
        self.pending_launch.map(|grade| grade.score)
    }

    /// Advance the launch sweep by one animation frame. Returns the new
    /// cursor position while a sweep is running, `None` otherwise.
    pub fn tick_sweep(&mut self) -> Option<f32> {
        if self.step != GameStep::Simulate || self.sim_phase != SimPhase::Game {
            return None;
        }
        let minigame = self.minigame.as_mut()?;
        if !minigame.active {
            return None;
        }
        minigame.tick();
        Some(minigame.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Intro→Design. Draws a fresh catalog and clears the draft config.
    StartMission,
    /// Equip a catalog part into its category slot. Design step only.
    SelectPart { part_id: PartId },
    /// Design→Plan, gated on a complete configuration.
    AdvanceToPlan,
    BackToIntro,
    BackToDesign,
    SetFlightProfile { profile: FlightProfile },
    SetLandingMethod { method: LandingMethod },
    /// Plan→Simulate(Game). Clears any prior outcome, starts a sweep.
    Launch,
    /// Player stop action. Idempotent: a second stop never re-scores.
    StopSweep,
    /// Issued by the timing driver once the score banner delay elapsed.
    CommitLaunch,
    /// Issued by the driver when the outcome service resolved.
    OutcomeReady { outcome: MissionOutcome },
    /// Issued by the driver on the log-reveal cadence.
    AdvanceReveal,
    /// Simulate(any)→Design. Fresh catalog, empty config, torn-down sweep.
    Retry,
}

/// Apply one command to the session.
///
/// Collaborators are injected per call: content for catalog draws and reward
/// tiers, the RNG for randomization, the store for draft persistence.
/// Returns the events produced, in order.
pub fn apply(
    session: &mut Session,
    command: &Command,
    content: &GameContent,
    rng: &mut impl Rng,
    store: &mut impl ConfigStore,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    match command {
        Command::StartMission => handle_start(session, content, rng, store, &mut events),
        Command::SelectPart { part_id } => {
            handle_select_part(session, part_id, store, &mut events);
        }
        Command::AdvanceToPlan => handle_advance_to_plan(session, &mut events),
        Command::BackToIntro => {
            if session.step == GameStep::Design {
                set_step(session, GameStep::Intro, &mut events);
            }
        }
        Command::BackToDesign => {
            if session.step == GameStep::Plan {
                set_step(session, GameStep::Design, &mut events);
            }
        }
        Command::SetFlightProfile { profile } => {
            handle_set_plan(session, Some(*profile), None, store, &mut events);
        }
        Command::SetLandingMethod { method } => {
            handle_set_plan(session, None, Some(*method), store, &mut events);
        }
        Command::Launch => handle_launch(session, content, &mut events),
        Command::StopSweep => handle_stop_sweep(session, &mut events),
        Command::CommitLaunch => handle_commit_launch(session, &mut events),
        Command::OutcomeReady { outcome } => handle_outcome_ready(session, outcome, &mut events),
        Command::AdvanceReveal => handle_advance_reveal(session, content, &mut events),
        Command::Retry => handle_retry(session, content, rng, store, &mut events),
    }
    events
}

fn set_step(session: &mut Session, step: GameStep, events: &mut Vec<EventEnvelope>) {
    session.step = step;
    push(session, Event::StepChanged { step }, events);
}

fn set_sim_phase(session: &mut Session, phase: SimPhase, events: &mut Vec<EventEnvelope>) {
    session.sim_phase = phase;
    push(session, Event::SimPhaseChanged { phase }, events);
}

fn push(session: &mut Session, event: Event, events: &mut Vec<EventEnvelope>) {
    events.push(emit(&mut session.counters, session.meta.epoch, event));
}

fn persist_config(
    session: &mut Session,
    store: &mut impl ConfigStore,
    events: &mut Vec<EventEnvelope>,
) {
    if let Err(err) = store.save(&session.config) {
        push(
            session,
            Event::ConfigSaveFailed {
                reason: err.to_string(),
            },
            events,
        );
    }
}

fn reset_run(
    session: &mut Session,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    session.meta.epoch += 1;
    session.config = MissionConfig::default();
    session.catalog = generate_catalog(content, rng);
    session.minigame = None;
    session.pending_launch = None;
    session.outcome = None;
    session.reveal = RevealState::default();
    session.sim_phase = SimPhase::Game;
    let parts = session.catalog.len();
    push(session, Event::CatalogGenerated { parts }, events);
}

fn handle_start(
    session: &mut Session,
    content: &GameContent,
    rng: &mut impl Rng,
    store: &mut impl ConfigStore,
    events: &mut Vec<EventEnvelope>,
) {
    if session.step != GameStep::Intro {
        return;
    }
    reset_run(session, content, rng, events);
    set_step(session, GameStep::Design, events);
    persist_config(session, store, events);
}

fn handle_select_part(
    session: &mut Session,
    part_id: &PartId,
    store: &mut impl ConfigStore,
    events: &mut Vec<EventEnvelope>,
) {
    if session.step != GameStep::Design {
        return;
    }
    let Some(part) = session.catalog.iter().find(|p| &p.id == part_id).cloned() else {
        return;
    };
    let (category, name) = (part.category, part.name.clone());
    session.config.set_part(part);
    push(
        session,
        Event::PartEquipped {
            category,
            part_id: part_id.clone(),
            name,
        },
        events,
    );
    persist_config(session, store, events);
}

fn handle_advance_to_plan(session: &mut Session, events: &mut Vec<EventEnvelope>) {
    if session.step != GameStep::Design {
        return;
    }
    let missing = session.config.missing_categories();
    if missing.is_empty() {
        set_step(session, GameStep::Plan, events);
    } else {
        push(session, Event::TransitionRefused { missing }, events);
    }
}

fn handle_set_plan(
    session: &mut Session,
    profile: Option<FlightProfile>,
    method: Option<LandingMethod>,
    store: &mut impl ConfigStore,
    events: &mut Vec<EventEnvelope>,
) {
    if session.step != GameStep::Plan {
        return;
    }
    if let Some(profile) = profile {
        session.config.flight_profile = profile;
    }
    if let Some(method) = method {
        session.config.landing_method = method;
    }
    push(
        session,
        Event::PlanChanged {
            flight_profile: session.config.flight_profile,
            landing_method: session.config.landing_method,
        },
        events,
    );
    persist_config(session, store, events);
}

fn handle_launch(session: &mut Session, content: &GameContent, events: &mut Vec<EventEnvelope>) {
    if session.step != GameStep::Plan {
        return;
    }
    session.outcome = None;
    session.reveal = RevealState::default();
    session.pending_launch = None;
    session.minigame = Some(MinigameSession::new(&content.constants));
    set_step(session, GameStep::Simulate, events);
    set_sim_phase(session, SimPhase::Game, events);
}

fn handle_stop_sweep(session: &mut Session, events: &mut Vec<EventEnvelope>) {
    if session.step != GameStep::Simulate || session.sim_phase != SimPhase::Game {
        return;
    }
    let Some(minigame) = session.minigame.as_mut() else {
        return;
    };
    let Some(grade) = minigame.stop() else {
        return;
    };
    let position = minigame.position;
    session.pending_launch = Some(grade);
    push(
        session,
        Event::SweepStopped {
            position,
            score: grade.score,
            band: grade.band,
        },
        events,
    );
}

fn handle_commit_launch(session: &mut Session, events: &mut Vec<EventEnvelope>) {
    if session.step != GameStep::Simulate || session.sim_phase != SimPhase::Game {
        return;
    }
    let Some(grade) = session.pending_launch else {
        return;
    };
    set_sim_phase(session, SimPhase::Loading, events);
    push(
        session,
        Event::LoadingStarted {
            launch_score: grade.score,
        },
        events,
    );
}

fn handle_outcome_ready(
    session: &mut Session,
    outcome: &MissionOutcome,
    events: &mut Vec<EventEnvelope>,
) {
    if session.step != GameStep::Simulate || session.sim_phase != SimPhase::Loading {
        return;
    }
    session.outcome = Some(outcome.clone());
    session.reveal = RevealState::default();
    session.pending_launch = None;
    set_sim_phase(session, SimPhase::Result, events);
    push(
        session,
        Event::OutcomeReceived {
            success: outcome.success,
            score: outcome.score,
        },
        events,
    );
}

fn handle_advance_reveal(
    session: &mut Session,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    if session.step != GameStep::Simulate || session.sim_phase != SimPhase::Result {
        return;
    }
    let Some(outcome) = session.outcome.clone() else {
        return;
    };
    let total = outcome.mission_log.len();
    if session.reveal.is_finished(total) {
        return;
    }
    let finished = session.reveal.advance(total);
    let index = session.reveal.shown - 1;
    push(
        session,
        Event::LogRevealed {
            index,
            entry: outcome.mission_log[index].clone(),
        },
        events,
    );
    if finished {
        let reward = reward_for_score(&content.reward_tiers, outcome.score).clone();
        push(session, Event::RevealFinished { reward }, events);
    }
}

fn handle_retry(
    session: &mut Session,
    content: &GameContent,
    rng: &mut impl Rng,
    store: &mut impl ConfigStore,
    events: &mut Vec<EventEnvelope>,
) {
    if session.step != GameStep::Simulate {
        return;
    }
    reset_run(session, content, rng, events);
    set_step(session, GameStep::Design, events);
    persist_config(session, store, events);
}
