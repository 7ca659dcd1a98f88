use clap::Parser;
use maze_chase::engine::{GameEngine, GameOptions};
use maze_chase::rng::Rng;
use maze_chase::types::{Direction, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Headless batch driver: runs seeded games to completion with a scripted
/// input policy and reports one JSON line per game plus a run summary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Base seed; games use seed, seed+1, ... Defaults to a random seed.
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 8)]
    games: u32,
    #[arg(long, default_value_t = 15)]
    rows: i32,
    #[arg(long, default_value_t = 15)]
    cols: i32,
    /// Abort a game as a timeout after this many ticks.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Won,
    Lost,
    Timeout,
}

#[derive(Clone, Debug, Serialize)]
struct GameResultLine {
    game: u32,
    seed: u32,
    outcome: Outcome,
    ticks: u64,
    score: i32,
    #[serde(rename = "pipsLeft")]
    pips_left: usize,
    #[serde(rename = "powerPickups")]
    power_pickups: u32,
    #[serde(rename = "chasersCaught")]
    chasers_caught: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "gameCount")]
    game_count: u32,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: i64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    games: Vec<GameResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let base_seed = cli.seed.unwrap_or_else(|| {
        use rand::Rng as _;
        rand::rng().random()
    });
    let started_at_ms = now_ms();
    let run_id = format!("run_{base_seed}_{started_at_ms}");

    let mut results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_score: i64 = 0;
    let mut total_anomalies = 0usize;

    for game in 0..cli.games {
        let seed = base_seed.wrapping_add(game);
        emit_log(
            "info",
            "game_started",
            &run_id,
            Some(seed),
            None,
            json!({ "game": game, "rows": cli.rows, "cols": cli.cols }),
        );

        let result = run_game(game, seed, &cli);
        for anomaly in &result.anomalies {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(seed),
                Some(result.ticks),
                json!({ "message": anomaly }),
            );
        }
        emit_log(
            "info",
            "game_finished",
            &run_id,
            Some(seed),
            Some(result.ticks),
            json!({
                "outcome": result.outcome,
                "score": result.score,
                "anomalyCount": result.anomalies.len(),
            }),
        );

        total_anomalies += result.anomalies.len();
        total_score += result.score as i64;
        *outcome_counts.entry(outcome_key(result.outcome)).or_insert(0) += 1;

        println!(
            "{}",
            serde_json::to_string(&result).expect("game result should serialize")
        );
        results.push(result);
    }

    let summary = RunSummary {
        run_id: run_id.clone(),
        started_at_ms,
        finished_at_ms: now_ms(),
        game_count: cli.games,
        anomaly_count: total_anomalies,
        average_score: if cli.games > 0 {
            total_score / cli.games as i64
        } else {
            0
        },
        outcome_counts,
        games: results,
    };

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                json!({ "path": path.to_string_lossy(), "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        json!({
            "gameCount": summary.game_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
        }),
    );

    if total_anomalies > 0 {
        std::process::exit(1);
    }
}

fn run_game(game: u32, seed: u32, cli: &Cli) -> GameResultLine {
    let mut engine = GameEngine::new(
        seed,
        GameOptions {
            rows: cli.rows,
            cols: cli.cols,
            power_duration_ms_override: None,
        },
    );
    // The input policy draws from its own stream so it stands in for the
    // input router without disturbing simulation randomness.
    let mut policy = Rng::new(seed ^ 0x5eed_cafe);

    let mut anomalies = Vec::new();
    let mut power_pickups = 0u32;
    let mut chasers_caught = 0u32;
    let mut previous = engine.build_snapshot();
    let mut outcome = Outcome::Timeout;

    while engine.tick_count() < cli.max_ticks {
        if policy.chance(0.2) {
            let dir = Direction::ALL[policy.pick_index(Direction::ALL.len())];
            engine.set_pending_direction(dir);
        }
        engine.tick();
        let snapshot = engine.build_snapshot();
        for message in collect_snapshot_anomalies(&previous, &snapshot) {
            if !anomalies.contains(&message) {
                anomalies.push(message);
            }
        }
        if snapshot.power_active && !previous.power_active {
            power_pickups += 1;
        }
        if snapshot.score >= previous.score + 200 {
            chasers_caught += 1;
        }
        previous = snapshot;

        if engine.is_won() {
            outcome = Outcome::Won;
            break;
        }
        if engine.is_lost() {
            outcome = Outcome::Lost;
            break;
        }
    }

    GameResultLine {
        game,
        seed,
        outcome,
        ticks: engine.tick_count(),
        score: engine.score(),
        pips_left: previous.pips_left,
        power_pickups,
        chasers_caught,
        anomalies,
    }
}

fn collect_snapshot_anomalies(previous: &Snapshot, snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.score < previous.score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            previous.score, snapshot.score
        ));
    }
    if snapshot.won && snapshot.lost {
        anomalies.push("won and lost are both set".to_string());
    }
    if snapshot.pips_left > previous.pips_left {
        anomalies.push(format!(
            "pips increased: {} -> {}",
            previous.pips_left, snapshot.pips_left
        ));
    }
    let moved =
        (snapshot.player.row - previous.player.row).abs() + (snapshot.player.col - previous.player.col).abs();
    if moved > 1 {
        anomalies.push(format!("player jumped {moved} cells in one tick"));
    }
    if snapshot.player.row < 0
        || snapshot.player.row >= snapshot.rows
        || snapshot.player.col < 0
        || snapshot.player.col >= snapshot.cols
    {
        anomalies.push(format!(
            "player out of bounds at ({}, {})",
            snapshot.player.row, snapshot.player.col
        ));
    }
    anomalies
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let payload = serde_json::to_string_pretty(summary)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    fs::write(path, payload)
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&line).expect("log line should serialize")
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn outcome_key(outcome: Outcome) -> String {
    match outcome {
        Outcome::Won => "won".to_string(),
        Outcome::Lost => "lost".to_string(),
        Outcome::Timeout => "timeout".to_string(),
    }
}
