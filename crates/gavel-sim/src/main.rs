//! gavel-sim: boot an in-memory auction and run a simulated sale.
//!
//! Seeds a demo roster, starts the session actor, connects as an ordinary
//! client, and lets the simulation driver auction the pool. Prints the
//! report as JSON on stdout once the ledger and roster audit pass.

mod bootstrap;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gavel_roster::RosterStore;
use gavel_session::{AuctionSession, ClientMessage, spawn};
use gavel_types::{AuctionEvent, EngineConfig, SimulationReport, constants};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "gavel-sim")]
#[command(about = "Run a simulated Gavel auction against an in-memory roster")]
#[command(version)]
struct Args {
    /// Engine configuration file (JSON). Defaults apply when omitted.
    #[arg(long, env = "GAVEL_CONFIG")]
    config: Option<PathBuf>,

    /// Number of teams to seed.
    #[arg(long, env = "GAVEL_TEAMS", default_value_t = 4)]
    teams: usize,

    /// Players seeded per category.
    #[arg(long, env = "GAVEL_PLAYERS_PER_CATEGORY", default_value_t = 8)]
    players_per_category: usize,

    /// Stop after this many lots.
    #[arg(long, env = "GAVEL_LOTS")]
    lots: Option<usize>,

    /// RNG seed for roster, nomination, and bidding.
    #[arg(long, env = "GAVEL_SEED")]
    seed: Option<u64>,

    /// Pause between simulated commands, in milliseconds.
    #[arg(long, env = "GAVEL_STEP_DELAY_MS")]
    step_delay_ms: Option<u64>,

    /// Countdown length per lot, in seconds.
    #[arg(long, env = "GAVEL_TIMER_SECS")]
    timer_secs: Option<u32>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "GAVEL_JSON_LOGS")]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(delay) = args.step_delay_ms {
        config.simulation.step_delay_ms = delay;
    }
    if let Some(secs) = args.timer_secs {
        config.initial_settings.timer_duration_secs = secs;
    }
    config.initial_settings = config
        .initial_settings
        .clone()
        .finalize()
        .context("initial settings are invalid")?;
    config.validate().context("engine config is invalid")?;
    Ok(config)
}

fn rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config = load_config(&args)?;
    info!(
        engine = constants::ENGINE_NAME,
        version = constants::VERSION,
        teams = args.teams,
        players_per_category = args.players_per_category,
        seed = ?config.simulation.seed,
        restricted = config.restricted_policy().is_some(),
        "starting simulation"
    );

    let seed = config.simulation.seed;
    let store = Arc::new(bootstrap::roster(
        args.teams,
        args.players_per_category,
        &config.initial_settings,
        &mut rng(seed),
    ));
    let session = AuctionSession::new(Arc::clone(&store), &config, rng(seed));
    let (handle, task) = spawn(session, &config);

    let mut conn = handle.connect().await?;
    handle.start_simulation(conn.client_id, args.lots).await?;

    let report: SimulationReport = loop {
        match conn.next().await {
            Some(ClientMessage::Event(envelope)) => {
                debug!(seq = envelope.seq, event = envelope.event.name(), "event");
            }
            Some(ClientMessage::Direct(AuctionEvent::SimulationComplete { report })) => {
                break report;
            }
            Some(ClientMessage::Direct(AuctionEvent::SimulationFailed { reason })) => {
                bail!("simulation failed: {reason}");
            }
            Some(ClientMessage::Direct(event)) => {
                debug!(event = event.name(), "direct event");
            }
            Some(ClientMessage::Lagged(skipped)) => {
                conn.snapshot = handle.snapshot();
                warn!(skipped, seq = conn.snapshot.seq, "event stream lagged; resynced");
            }
            None => bail!("session closed before the simulation finished"),
        }
    };

    handle.verify().await.context("post-run audit failed")?;
    for team in store.snapshot().teams.values() {
        info!(
            team = %team.name,
            purse = team.purse,
            spent = team.points_spent,
            players = team.roster_size(),
            "final roster"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    handle.shutdown().await;
    task.await.context("session task panicked")?;
    Ok(())
}
