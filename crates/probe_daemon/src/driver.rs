//! Timing driver: the one loop that owns the sweep frames, the score-banner
//! pause, the reveal cadence, and the outcome-request handoff.
//!
//! All deadline logic lives in [`drive`], a pure function over the locked
//! state and a caller-supplied `now`, so cancellation and ordering are
//! testable without a runtime.

use crate::state::{AppState, SimState};
use probe_core::{Command, Event, EventEnvelope, GameStep, MissionConfig, SimPhase};
use std::time::{Duration, Instant};

/// One driver pass at `now`. Advances the sweep by a frame, arms and fires
/// the banner deadline, and paces the log reveal. Returns events to
/// broadcast.
pub fn drive(state: &mut SimState, now: Instant) -> Vec<EventEnvelope> {
    let mut events = Vec::new();

    state.session.tick_sweep();

    drive_banner(state, now, &mut events);
    drive_reveal(state, now, &mut events);

    events
}

fn drive_banner(state: &mut SimState, now: Instant, events: &mut Vec<EventEnvelope>) {
    let in_game =
        state.session.step == GameStep::Simulate && state.session.sim_phase == SimPhase::Game;
    if !in_game {
        // Leaving the Game phase tears the pending banner down with it.
        state.timers.banner_deadline = None;
        return;
    }

    if state.session.pending_launch.is_some() && state.timers.banner_deadline.is_none() {
        let pause = Duration::from_millis(state.content.constants.score_banner_ms);
        state.timers.banner_deadline = Some(now + pause);
    }

    if let Some(deadline) = state.timers.banner_deadline {
        if now >= deadline {
            state.timers.banner_deadline = None;
            events.extend(state.apply(&Command::CommitLaunch));
        }
    }
}

fn drive_reveal(state: &mut SimState, now: Instant, events: &mut Vec<EventEnvelope>) {
    let in_result =
        state.session.step == GameStep::Simulate && state.session.sim_phase == SimPhase::Result;
    let total = state
        .session
        .outcome
        .as_ref()
        .map(|outcome| outcome.mission_log.len());

    let Some(total) = total.filter(|_| in_result) else {
        state.timers.reveal_deadline = None;
        return;
    };
    if state.session.reveal.is_finished(total) {
        state.timers.reveal_deadline = None;
        return;
    }

    match state.timers.reveal_deadline {
        None => {
            let cadence = Duration::from_millis(state.content.constants.log_reveal_interval_ms);
            state.timers.reveal_deadline = Some(now + cadence);
        }
        Some(deadline) if now >= deadline => {
            // Cleared here and re-armed on the next pass while entries remain.
            state.timers.reveal_deadline = None;
            events.extend(state.apply(&Command::AdvanceReveal));
        }
        Some(_) => {}
    }
}

/// The Loading transition inside `events` carries the score; snapshot what
/// the outcome task needs while the lock is held.
pub fn pending_outcome_request(
    state: &SimState,
    events: &[EventEnvelope],
) -> Option<(MissionConfig, u32, u64)> {
    events.iter().find_map(|envelope| match envelope.event {
        Event::LoadingStarted { launch_score } => Some((
            state.session.config.clone(),
            launch_score,
            state.session.meta.epoch,
        )),
        _ => None,
    })
}

fn spawn_outcome_task(app: AppState, config: MissionConfig, launch_score: u32, epoch: u64) {
    tokio::spawn(async move {
        let outcome = app.backend.simulate(&config, launch_score).await;
        let events = {
            let mut sim = app.sim.lock();
            if sim.session.meta.epoch != epoch {
                tracing::debug!("discarding stale outcome from epoch {epoch}");
                return;
            }
            sim.apply(&Command::OutcomeReady { outcome })
        };
        if !events.is_empty() {
            let _ = app.event_tx.send(events);
        }
    });
}

pub async fn run_driver(app: AppState) {
    let frame = {
        let sim = app.sim.lock();
        Duration::from_millis(sim.content.constants.sweep_frame_ms)
    };
    let mut interval = tokio::time::interval(frame);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let (events, request) = {
            let mut sim = app.sim.lock();
            let events = drive(&mut sim, Instant::now());
            let request = pending_outcome_request(&sim, &events);
            (events, request)
        };
        if let Some((config, launch_score, epoch)) = request {
            spawn_outcome_task(app.clone(), config, launch_score, epoch);
        }
        if !events.is_empty() {
            let _ = app.event_tx.send(events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PhaseTimers;
    use probe_core::test_fixtures::{base_content, make_rng, sample_outcome};
    use probe_core::{PartCategory, PartId, Session};
    use probe_outcome::{fallback_outcome, OutcomeBackend, ScriptedBackend};
    use probe_world::JsonFileStore;

    fn make_state(dir: &tempfile::TempDir) -> SimState {
        let content = base_content();
        let session = Session::new(&content, 42, None);
        SimState {
            session,
            content,
            rng: make_rng(),
            store: JsonFileStore::new(dir.path().join("mission_config.json")),
            timers: PhaseTimers::default(),
        }
    }

    /// Drive the wizard to Simulate(Game) with a stopped sweep.
    fn stop_sweep(state: &mut SimState) {
        state.apply(&Command::StartMission);
        for category in PartCategory::ALL {
            let part_id: PartId = state
                .session
                .catalog
                .iter()
                .find(|p| p.category == category)
                .unwrap()
                .id
                .clone();
            state.apply(&Command::SelectPart { part_id });
        }
        state.apply(&Command::AdvanceToPlan);
        state.apply(&Command::Launch);
        state.apply(&Command::StopSweep);
    }

    #[test]
    fn test_banner_deadline_arms_and_fires_after_the_pause() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(&dir);
        stop_sweep(&mut state);

        let t0 = Instant::now();
        let events = drive(&mut state, t0);
        assert!(events.is_empty(), "nothing fires while the banner shows");
        assert!(state.timers.banner_deadline.is_some());

        // Just before the pause ends: still waiting.
        let events = drive(&mut state, t0 + Duration::from_millis(1999));
        assert!(events.is_empty());

        let events = drive(&mut state, t0 + Duration::from_millis(2001));
        assert!(events
            .iter()
            .any(|e| matches!(e.event, Event::LoadingStarted { launch_score: 10 })));
        assert_eq!(state.session.sim_phase, SimPhase::Loading);
        assert!(state.timers.banner_deadline.is_none());
    }

    #[test]
    fn test_retry_tears_the_banner_deadline_down() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(&dir);
        stop_sweep(&mut state);

        let t0 = Instant::now();
        drive(&mut state, t0);
        assert!(state.timers.banner_deadline.is_some());

        state.apply(&Command::Retry);
        let events = drive(&mut state, t0 + Duration::from_secs(10));

        assert!(state.timers.banner_deadline.is_none());
        assert!(!events
            .iter()
            .any(|e| matches!(e.event, Event::LoadingStarted { .. })));
        assert_eq!(state.session.step, GameStep::Design);
    }

    #[test]
    fn test_reveal_cadence_paces_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(&dir);
        stop_sweep(&mut state);
        state.apply(&Command::CommitLaunch);
        state.apply(&Command::OutcomeReady { outcome: sample_outcome() });

        let t0 = Instant::now();
        drive(&mut state, t0); // arms the cadence
        assert!(state.timers.reveal_deadline.is_some());

        let mut revealed = 0;
        let mut now = t0;
        for _ in 0..10 {
            now += Duration::from_millis(1501);
            let events = drive(&mut state, now);
            revealed += events
                .iter()
                .filter(|e| matches!(e.event, Event::LogRevealed { .. }))
                .count();
            drive(&mut state, now); // re-arm pass
        }

        assert_eq!(revealed, 3, "every entry reveals exactly once");
        assert!(state.timers.reveal_deadline.is_none(), "cadence stops at the end");
    }

    #[test]
    fn test_navigation_away_cancels_the_reveal_timer() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(&dir);
        stop_sweep(&mut state);
        state.apply(&Command::CommitLaunch);
        state.apply(&Command::OutcomeReady { outcome: sample_outcome() });

        let t0 = Instant::now();
        drive(&mut state, t0);
        assert!(state.timers.reveal_deadline.is_some());

        state.apply(&Command::Retry);
        drive(&mut state, t0 + Duration::from_secs(5));
        assert!(state.timers.reveal_deadline.is_none());
        assert_eq!(state.session.reveal.shown, 0);
    }

    #[test]
    fn test_loading_transition_snapshots_the_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(&dir);
        stop_sweep(&mut state);

        let events = state.apply(&Command::CommitLaunch);
        let (config, launch_score, epoch) =
            pending_outcome_request(&state, &events).expect("request must be pending");

        assert!(config.is_complete());
        assert_eq!(launch_score, 10);
        assert_eq!(epoch, state.session.meta.epoch);
    }

    fn make_app(dir: &tempfile::TempDir, backend: OutcomeBackend) -> AppState {
        let (event_tx, _) = tokio::sync::broadcast::channel(64);
        AppState {
            sim: std::sync::Arc::new(parking_lot::Mutex::new(make_state(dir))),
            event_tx,
            backend: std::sync::Arc::new(backend),
        }
    }

    async fn wait_for_result(app: &AppState) -> bool {
        for _ in 0..200 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if app.sim.lock().session.sim_phase == SimPhase::Result {
                return true;
            }
        }
        false
    }

    #[tokio::test]
    async fn test_outcome_task_delivers_the_fallback_into_result() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_app(&dir, OutcomeBackend::Scripted(ScriptedBackend::failing()));

        let request = {
            let mut sim = app.sim.lock();
            stop_sweep(&mut sim);
            let events = sim.apply(&Command::CommitLaunch);
            pending_outcome_request(&sim, &events).expect("loading must request an outcome")
        };
        let (config, launch_score, epoch) = request;
        spawn_outcome_task(app.clone(), config, launch_score, epoch);

        assert!(wait_for_result(&app).await, "outcome never arrived");
        let sim = app.sim.lock();
        let outcome = sim.session.outcome.as_ref().unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.score, 0);
        assert_eq!(*outcome, fallback_outcome());
    }

    #[tokio::test]
    async fn test_stale_epoch_outcome_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let app = make_app(&dir, OutcomeBackend::Scripted(ScriptedBackend::default()));

        let request = {
            let mut sim = app.sim.lock();
            stop_sweep(&mut sim);
            let events = sim.apply(&Command::CommitLaunch);
            pending_outcome_request(&sim, &events).expect("loading must request an outcome")
        };
        let (config, launch_score, epoch) = request;

        // The player bails out before the response lands.
        {
            let mut sim = app.sim.lock();
            sim.apply(&Command::Retry);
        }
        spawn_outcome_task(app.clone(), config, launch_score, epoch);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let sim = app.sim.lock();
        assert_eq!(sim.session.step, GameStep::Design);
        assert!(sim.session.outcome.is_none(), "stale outcome must be dropped");
    }

    #[test]
    fn test_sweep_advances_only_in_the_game_phase() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = make_state(&dir);
        let t0 = Instant::now();

        drive(&mut state, t0);
        assert!(state.session.minigame.is_none(), "no sweep before launch");

        stop_sweep(&mut state);
        let frozen = state.session.minigame.as_ref().unwrap().position;
        drive(&mut state, t0);
        let after = state.session.minigame.as_ref().unwrap().position;
        assert!((after - frozen).abs() < 1e-6, "stopped sweep must not move");
    }
}
