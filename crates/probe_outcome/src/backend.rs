//! Backend selection, the deterministic fallback, and outcome normalization.

use crate::client::GenerativeClient;
use probe_core::{BilingualText, MissionConfig, MissionOutcome};

/// The outcome every error path degrades to. Deterministic and offline.
pub fn fallback_outcome() -> MissionOutcome {
    MissionOutcome {
        success: false,
        score: 0,
        sample_retrieved: 0,
        scientific_value: 0,
        mission_log: vec![
            BilingualText::new("Mission control link error.", "通信エラー発生"),
            BilingualText::new(
                "Lost connection to the simulation relay.",
                "シミュレーションサーバーとの接続が切れました。",
            ),
        ],
        failure_reason: Some(BilingualText::new(
            "Telemetry link failed.",
            "通信エラーが発生しました。",
        )),
        feedback: BilingualText::new(
            "Check the network connection and try again.",
            "インターネット接続を確認して、もう一度ためしてみてください。",
        ),
    }
}

/// Enforce the outcome field contract: score within 0..=100 and
/// `failure_reason` present iff the mission failed.
pub fn normalize_outcome(mut outcome: MissionOutcome) -> MissionOutcome {
    outcome.score = outcome.score.min(100);
    outcome.scientific_value = outcome.scientific_value.min(100);
    if outcome.success {
        outcome.failure_reason = None;
    } else if outcome.failure_reason.is_none() {
        outcome.failure_reason = Some(BilingualText::new(
            "The mission could not be completed.",
            "ミッションを完了できませんでした。",
        ));
    }
    outcome
}

/// Canned backend for tests, offline play, and demos.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    pub outcome: MissionOutcome,
}

impl ScriptedBackend {
    pub fn new(outcome: MissionOutcome) -> Self {
        ScriptedBackend {
            outcome: normalize_outcome(outcome),
        }
    }

    /// A backend that behaves like a dead link: every run fails with the
    /// adapter fallback.
    pub fn failing() -> Self {
        ScriptedBackend {
            outcome: fallback_outcome(),
        }
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new(MissionOutcome {
            success: true,
            score: 78,
            sample_retrieved: 60,
            scientific_value: 72,
            mission_log: vec![
                BilingualText::new("Liftoff. All systems nominal.", "打ち上げ成功！全システム正常です。"),
                BilingualText::new("Cruise phase underway.", "巡航フェーズに入りました。"),
                BilingualText::new("Phobos orbit insertion confirmed.", "フォボス周回軌道に入りました。"),
                BilingualText::new("Sampler deployed; surface contact.", "採取装置を展開、表面に接触しました。"),
                BilingualText::new("Samples secured for Earth return.", "サンプルを確保、地球へ帰還します。"),
            ],
            failure_reason: None,
            feedback: BilingualText::new(
                "A steady design: the power source covered every draw with margin.",
                "安定した設計でした。電源がすべての機器をよゆうを持って支えました。",
            ),
        })
    }
}

/// The pluggable outcome collaborator the frontends talk to.
#[derive(Debug, Clone)]
pub enum OutcomeBackend {
    Generative(GenerativeClient),
    Scripted(ScriptedBackend),
}

impl OutcomeBackend {
    /// Resolve an outcome for the given configuration and launch score.
    /// Never fails: the generative path degrades to the fallback internally.
    pub async fn simulate(&self, config: &MissionConfig, launch_score: u32) -> MissionOutcome {
        match self {
            OutcomeBackend::Generative(client) => client.simulate(config, launch_score).await,
            OutcomeBackend::Scripted(scripted) => scripted.outcome.clone(),
        }
    }
}
