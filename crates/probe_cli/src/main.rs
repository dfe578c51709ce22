use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use probe_core::{
    apply, BilingualText, Command, ConfigStore, Event, FlightProfile, GameContent, GameStep,
    LandingMethod, MemoryStore, PartCategory, Session,
};
use probe_outcome::{GenerativeClient, OutcomeBackend, ScriptedBackend};
use probe_world::{load_content, JsonFileStore};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "probe_cli", about = "Phobos Probe Builder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one scripted mission end to end.
    Run {
        /// Catalog seed; random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Where to stop the launch sweep (0-100); the target star sits at 75.
        /// The cursor lands on the first frame at or past this position.
        #[arg(long, default_value_t = 75.0)]
        stop_at: f32,
        #[arg(long, default_value = "hohmann", value_parser = ["hohmann", "fast-transit", "gravity-assist"])]
        flight_profile: String,
        #[arg(long, default_value = "touch-and-go", value_parser = ["touch-and-go", "full-landing", "hover-drop"])]
        landing: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Persist the draft configuration here; omit for an ephemeral run.
        #[arg(long)]
        save_path: Option<String>,
        /// Call the live generative service (reads GEMINI_API_KEY).
        #[arg(long)]
        live: bool,
        #[arg(long, default_value = "en", value_parser = ["en", "ja"])]
        lang: String,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunOptions {
    seed: u64,
    stop_at: f32,
    flight_profile: FlightProfile,
    landing_method: LandingMethod,
    live: bool,
    ja: bool,
}

fn text<'a>(bilingual: &'a BilingualText, ja: bool) -> &'a str {
    if ja {
        &bilingual.ja
    } else {
        &bilingual.en
    }
}

fn make_backend(live: bool) -> OutcomeBackend {
    if live {
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.is_empty() => {
                return OutcomeBackend::Generative(GenerativeClient::new(key));
            }
            _ => eprintln!("GEMINI_API_KEY is not set; using scripted outcomes"),
        }
    }
    OutcomeBackend::Scripted(ScriptedBackend::default())
}

fn print_catalog(session: &Session) {
    for category in PartCategory::ALL {
        println!("{category}:");
        for part in session.catalog.iter().filter(|p| p.category == category) {
            println!(
                "  {} {:<28} mass={:>3}kg  cost=${:>3}M  rel={:>3}%",
                part.icon, part.name, part.mass_kg, part.cost_m_usd, part.reliability_pct,
            );
        }
    }
}

fn design_probe(
    session: &mut Session,
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    store: &mut impl ConfigStore,
) -> Result<()> {
    // One random pick per category, like a kid grabbing whatever looks cool.
    for category in PartCategory::ALL {
        let options: Vec<_> = session
            .catalog
            .iter()
            .filter(|p| p.category == category)
            .map(|p| p.id.clone())
            .collect();
        if options.is_empty() {
            bail!("catalog offers nothing for the {category} slot");
        }
        let part_id = options[rng.gen_range(0..options.len())].clone();
        apply(session, &Command::SelectPart { part_id }, content, rng, store);
        let part = session.config.part(category).expect("slot just filled");
        println!("equipped {category}: {}", part.name);
    }
    Ok(())
}

fn play_sweep(
    session: &mut Session,
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    store: &mut impl ConfigStore,
    stop_at: f32,
) -> u32 {
    let target = stop_at.clamp(0.0, 100.0);
    while session
        .minigame
        .as_ref()
        .is_some_and(|m| m.active && m.position < target)
    {
        if session.tick_sweep().is_none() {
            break;
        }
    }
    let events = apply(session, &Command::StopSweep, content, rng, store);
    for envelope in &events {
        if let Event::SweepStopped { position, score, band } = &envelope.event {
            println!(
                "sweep stopped at {position:.1} (target {}): {} — launch score {score}",
                content.constants.sweep_target_pos,
                band.label(),
            );
        }
    }
    session.launch_score().unwrap_or(0)
}

fn print_report(session: &Session, reward: Option<&probe_core::RewardTier>, ja: bool) {
    let Some(outcome) = &session.outcome else {
        return;
    };
    println!("{}", "-".repeat(80));
    println!(
        "{}  score={}  sample={}g  value={}/100",
        if outcome.success { "MISSION COMPLETE" } else { "MISSION FAILED" },
        outcome.score,
        outcome.sample_retrieved,
        outcome.scientific_value,
    );
    if let Some(reason) = &outcome.failure_reason {
        println!("failure reason: {}", text(reason, ja));
    }
    if let Some(tier) = reward {
        println!("sample reward: {} {}", tier.icon, text(&tier.name, ja));
    }
    println!("feedback: {}", text(&outcome.feedback, ja));
    let totals = session.config.totals();
    println!(
        "craft: {}kg, ${}M, draw {}W / output {}W, route {}",
        totals.mass_kg,
        totals.cost_m_usd,
        totals.power_draw_w,
        totals.power_output_w,
        session.config.flight_profile.label(),
    );
}

fn run(options: &RunOptions, content: &GameContent, store: &mut impl ConfigStore) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut session = Session::restore(content, options.seed, store);
    let ja = options.ja;

    println!(
        "Starting mission: seed={} content_version={}",
        options.seed, content.content_version,
    );
    println!("{}", "-".repeat(80));

    apply(&mut session, &Command::StartMission, content, &mut rng, store);
    print_catalog(&session);
    println!("{}", "-".repeat(80));

    design_probe(&mut session, content, &mut rng, store)?;

    apply(&mut session, &Command::AdvanceToPlan, content, &mut rng, store);
    if session.step != GameStep::Plan {
        bail!("design gate refused a complete craft");
    }
    apply(
        &mut session,
        &Command::SetFlightProfile { profile: options.flight_profile },
        content,
        &mut rng,
        store,
    );
    apply(
        &mut session,
        &Command::SetLandingMethod { method: options.landing_method },
        content,
        &mut rng,
        store,
    );
    println!(
        "plan: {} / {}",
        options.flight_profile.label(),
        options.landing_method.label(),
    );

    apply(&mut session, &Command::Launch, content, &mut rng, store);
    let launch_score = play_sweep(&mut session, content, &mut rng, store, options.stop_at);
    apply(&mut session, &Command::CommitLaunch, content, &mut rng, store);

    println!("resolving mission outcome...");
    let backend = make_backend(options.live);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building the outcome runtime")?;
    let outcome = runtime.block_on(backend.simulate(&session.config, launch_score));
    apply(
        &mut session,
        &Command::OutcomeReady { outcome: outcome.clone() },
        content,
        &mut rng,
        store,
    );

    println!("{}", "-".repeat(80));
    let mut reward = None;
    for index in 0..outcome.mission_log.len() {
        let events = apply(&mut session, &Command::AdvanceReveal, content, &mut rng, store);
        for envelope in events {
            match envelope.event {
                Event::LogRevealed { entry, .. } => {
                    println!("[{:02}] {}", index + 1, text(&entry, ja));
                }
                Event::RevealFinished { reward: tier } => reward = Some(tier),
                _ => {}
            }
        }
    }

    print_report(&session, reward.as_ref(), ja);
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn parse_flight_profile(value: &str) -> FlightProfile {
    match value {
        "fast-transit" => FlightProfile::FastTransit,
        "gravity-assist" => FlightProfile::GravityAssist,
        _ => FlightProfile::Hohmann,
    }
}

fn parse_landing(value: &str) -> LandingMethod {
    match value {
        "full-landing" => LandingMethod::FullLanding,
        "hover-drop" => LandingMethod::HoverDrop,
        _ => LandingMethod::TouchAndGo,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            seed,
            stop_at,
            flight_profile,
            landing,
            content_dir,
            save_path,
            live,
            lang,
        } => {
            let content = load_content(&content_dir)?;
            let options = RunOptions {
                seed: seed.unwrap_or_else(rand::random),
                stop_at,
                flight_profile: parse_flight_profile(&flight_profile),
                landing_method: parse_landing(&landing),
                live,
                ja: lang == "ja",
            };
            match save_path {
                Some(path) => run(&options, &content, &mut JsonFileStore::new(path))?,
                None => run(&options, &content, &mut MemoryStore::default())?,
            }
        }
    }
    Ok(())
}
