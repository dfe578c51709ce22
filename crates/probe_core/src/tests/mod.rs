use super::*;
use crate::test_fixtures::{base_content, base_session, jittered_content, make_rng, sample_outcome};
use rand::Rng;

mod integration;

// --- Shared test helpers ------------------------------------------------

fn test_content() -> GameContent {
    base_content()
}

/// Session already advanced to the Design step with a freshly drawn catalog.
fn design_session(
    content: &GameContent,
    rng: &mut impl Rng,
    store: &mut MemoryStore,
) -> Session {
    let mut session = base_session(content);
    apply(&mut session, &Command::StartMission, content, rng, store);
    session
}

/// Equip the first catalog part of each category.
fn equip_all(
    session: &mut Session,
    content: &GameContent,
    rng: &mut impl Rng,
    store: &mut MemoryStore,
) {
    for category in PartCategory::ALL {
        let part_id = session
            .catalog
            .iter()
            .find(|part| part.category == category)
            .expect("catalog covers every category")
            .id
            .clone();
        apply(session, &Command::SelectPart { part_id }, content, rng, store);
    }
}

/// Session at Simulate(Game) with a running sweep.
fn launched_session(
    content: &GameContent,
    rng: &mut impl Rng,
    store: &mut MemoryStore,
) -> Session {
    let mut session = design_session(content, rng, store);
    equip_all(&mut session, content, rng, store);
    apply(&mut session, &Command::AdvanceToPlan, content, rng, store);
    apply(&mut session, &Command::Launch, content, rng, store);
    session
}

/// Tick the sweep until the cursor sits exactly on the target (75 is an even
/// multiple of the 1.5-unit step, so 50 frames land on it).
fn sweep_to_target(session: &mut Session) {
    for _ in 0..50 {
        session.tick_sweep();
    }
}

/// A deterministic failed outcome in the shape the adapter falls back to.
fn failed_outcome() -> MissionOutcome {
    MissionOutcome {
        success: false,
        score: 0,
        sample_retrieved: 0,
        scientific_value: 0,
        mission_log: vec![
            BilingualText::new("Mission control link error.", "通信エラー発生"),
            BilingualText::new("Connection to the relay was lost.", "中継局との接続が切れました。"),
        ],
        failure_reason: Some(BilingualText::new(
            "Telemetry link failed.",
            "通信エラーが発生しました。",
        )),
        feedback: BilingualText::new(
            "Check the connection and try again.",
            "接続を確認して、もう一度ためしてみてください。",
        ),
    }
}
