use chrono::{SecondsFormat, Utc};
use clap::Parser;
use packman_chase_engine::config::RulesConfig;
use packman_chase_engine::engine::{GameEngine, GameEngineOptions};
use packman_chase_engine::types::{Direction, RuntimeEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    #[arg(long)]
    seed: Option<u64>,
    /// JSON rules file; missing keys keep their defaults.
    #[arg(long)]
    rules: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    /// Emit a snapshot log line every N ticks (0 disables).
    #[arg(long, default_value_t = 300)]
    snapshot_every: u64,
    #[arg(long)]
    run_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
struct RunStats {
    pellets: u32,
    #[serde(rename = "powerPellets")]
    power_pellets: u32,
    captures: u32,
    deaths: u32,
    fruits: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
    #[serde(rename = "gamesOver")]
    games_over: u32,
}

impl RunStats {
    fn record(&mut self, event: &RuntimeEvent) {
        match event {
            RuntimeEvent::PelletEaten { power, .. } => {
                self.pellets += 1;
                if *power {
                    self.power_pellets += 1;
                }
            }
            RuntimeEvent::GhostCaptured { .. } => self.captures += 1,
            RuntimeEvent::PlayerDied { .. } => self.deaths += 1,
            RuntimeEvent::FruitEaten { .. } => self.fruits += 1,
            RuntimeEvent::LevelCleared { .. } => self.levels_cleared += 1,
            RuntimeEvent::GameOver { .. } => self.games_over += 1,
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    seed: u32,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    ticks: u64,
    #[serde(rename = "simulatedSecs")]
    simulated_secs: f32,
    level: u32,
    score: u32,
    lives: u32,
    stats: RunStats,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Random-walk stand-in for a player: holds each direction for a random
/// number of ticks.
struct Autopilot {
    rng: StdRng,
    intent: Direction,
    hold: u32,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            intent: Direction::Stop,
            hold: 0,
        }
    }

    fn next_intent(&mut self) -> Direction {
        if self.hold == 0 {
            let index = self.rng.random_range(0..Direction::CARDINALS.len());
            self.intent = Direction::CARDINALS[index];
            self.hold = self.rng.random_range(10..60);
        }
        self.hold -= 1;
        self.intent
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let seed = normalize_seed(cli.seed.unwrap_or_else(rand::random));
    let started_at = now_iso();
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, Utc::now().timestamp_millis()));

    let rules = match cli.rules.as_ref() {
        Some(path) => match RulesConfig::load(path) {
            Ok(rules) => rules,
            Err(error) => {
                emit_log(
                    "error",
                    "rules_load_failed",
                    &run_id,
                    None,
                    json!({
                        "path": path.to_string_lossy(),
                        "error": error.to_string(),
                    }),
                );
                std::process::exit(2);
            }
        },
        None => RulesConfig::default(),
    };
    let step_secs = rules.max_step_secs;

    let mut engine = match GameEngine::new(GameEngineOptions {
        seed,
        level: 0,
        rules,
    }) {
        Ok(engine) => engine,
        Err(error) => {
            emit_log(
                "error",
                "engine_init_failed",
                &run_id,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let total_ticks = ticks_for(cli.seconds, step_secs);
    emit_log(
        "info",
        "run_started",
        &run_id,
        None,
        json!({
            "seed": seed,
            "seconds": cli.seconds,
            "ticks": total_ticks,
        }),
    );

    let mut autopilot = Autopilot::new(seed as u64);
    let mut stats = RunStats::default();
    for tick in 0..total_ticks {
        // Stand in for the player pressing pause after every reset.
        if engine.is_paused() {
            engine.toggle_pause();
        }
        engine.step(step_secs, autopilot.next_intent());

        let snapshot = engine.build_snapshot(true);
        for event in &snapshot.events {
            stats.record(event);
            emit_log(
                "info",
                "runtime_event",
                &run_id,
                Some(tick),
                serde_json::to_value(event).unwrap_or(Value::Null),
            );
        }
        if cli.snapshot_every > 0 && tick % cli.snapshot_every == 0 {
            emit_log(
                "debug",
                "snapshot",
                &run_id,
                Some(tick),
                json!({
                    "level": snapshot.level,
                    "score": snapshot.score,
                    "lives": snapshot.lives,
                    "paused": snapshot.paused,
                    "pelletsRemaining": snapshot.pellets_remaining,
                    "player": snapshot.player,
                    "ghosts": snapshot.ghosts,
                }),
            );
        }
    }

    let summary = RunSummary {
        run_id: run_id.clone(),
        seed,
        started_at,
        finished_at: now_iso(),
        ticks: total_ticks,
        simulated_secs: total_ticks as f32 * step_secs,
        level: engine.level(),
        score: engine.score(),
        lives: engine.lives(),
        stats,
    };

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        Some(total_ticks),
        json!({
            "score": summary.score,
            "level": summary.level,
            "lives": summary.lives,
            "summaryOut": summary_out_written,
        }),
    );
    println!(
        "{}",
        serde_json::to_string(&summary).expect("run summary should serialize")
    );
}

fn ticks_for(seconds: f32, step_secs: f32) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 || step_secs <= 0.0 {
        return 0;
    }
    (seconds / step_secs).ceil() as u64
}

fn normalize_seed(seed: u64) -> u32 {
    (seed % u32::MAX as u64) as u32
}

fn default_run_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn emit_log(level: &str, event: &str, run_id: &str, tick: Option<u64>, details: Value) {
    let log_line = StructuredLogLine {
        timestamp: now_iso(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => tracing::warn!(%error, event, "structured log failed to serialize"),
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use packman_chase_engine::types::Species;

    fn make_summary() -> RunSummary {
        RunSummary {
            run_id: "sim-1-1".to_string(),
            seed: 1,
            started_at: now_iso(),
            finished_at: now_iso(),
            ticks: 30,
            simulated_secs: 1.0,
            level: 0,
            score: 120,
            lives: 5,
            stats: RunStats::default(),
        }
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn seconds_round_up_to_whole_ticks() {
        assert_eq!(ticks_for(1.0, 0.25), 4);
        assert_eq!(ticks_for(1.1, 0.25), 5);
        assert_eq!(ticks_for(-3.0, 0.25), 0);
        assert_eq!(ticks_for(f32::NAN, 0.25), 0);
    }

    #[test]
    fn autopilot_replays_for_a_seed() {
        let mut a = Autopilot::new(7);
        let mut b = Autopilot::new(7);
        let first: Vec<_> = (0..200).map(|_| a.next_intent()).collect();
        let second: Vec<_> = (0..200).map(|_| b.next_intent()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|dir| *dir != Direction::Stop));
    }

    #[test]
    fn stats_count_runtime_events() {
        let mut stats = RunStats::default();
        stats.record(&RuntimeEvent::PelletEaten {
            points: 10,
            power: false,
        });
        stats.record(&RuntimeEvent::PelletEaten {
            points: 50,
            power: true,
        });
        stats.record(&RuntimeEvent::GhostCaptured {
            species: Species::Shy,
            points: 200,
        });
        stats.record(&RuntimeEvent::FruitExpired);
        assert_eq!(stats.pellets, 2);
        assert_eq!(stats.power_pellets, 1);
        assert_eq!(stats.captures, 1);
        assert_eq!(stats.fruits, 0);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("packman-missing-{}", Utc::now().timestamp_millis()))
            .join("summary.json");
        assert!(write_summary(&target, &make_summary()).is_err());
    }
}
