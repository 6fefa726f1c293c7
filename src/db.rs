use crate::analysis::types::{EvRating, PlayerHistory, Trend, VibeAura};
use crate::errors::{AppError, AppResult};
use crate::pricing::ev::Verdict;
use crate::state::{BetVerdict, DbCommand, HISTORY_CAP};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub type DbPool = Arc<Mutex<Connection>>;

pub fn init_db(data_dir: &Path) -> AppResult<DbPool> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| AppError::Database(format!("create dir: {e}")))?;
    let db_path = data_dir.join("wirepick.db");
    let conn = Connection::open(&db_path)?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

    let schema = include_str!("../migrations/001_init.sql");
    conn.execute_batch(schema)?;

    tracing::info!("database initialized at {}", db_path.display());
    Ok(Arc::new(Mutex::new(conn)))
}

/// Dedicated DB writer task. Reads commands from bounded channel,
/// executes SQL. This is the ONLY task that writes to the database.
pub async fn run_db_writer(db: DbPool, mut rx: mpsc::Receiver<DbCommand>) {
    tracing::info!("db writer task started");

    while let Some(cmd) = rx.recv().await {
        if let Err(e) = execute_command(&db, cmd) {
            tracing::error!("db write error: {e}");
        }
    }

    tracing::info!("db writer task shutting down");
}

fn execute_command(db: &DbPool, cmd: DbCommand) -> AppResult<()> {
    let conn = db
        .lock()
        .map_err(|e| AppError::Database(format!("lock poisoned: {e}")))?;

    match cmd {
        DbCommand::InsertVerdict(v) => {
            conn.execute(
                "INSERT OR REPLACE INTO verdicts (id, bet_description, verdict, ev_score, ev_reason, trend, trend_reason, vibe_emoji, vibe_reason, timestamp_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    v.id,
                    v.bet_description,
                    v.verdict.to_string(),
                    v.ev_rating.score,
                    v.ev_rating.reason,
                    v.player_history.trend.to_string(),
                    v.player_history.reason,
                    v.vibe_aura.emoji,
                    v.vibe_aura.reason,
                    v.timestamp,
                ],
            )?;
            // Persisted history obeys the same cap as the in-memory container
            conn.execute(
                "DELETE FROM verdicts WHERE id NOT IN
                 (SELECT id FROM verdicts ORDER BY timestamp_ms DESC LIMIT ?1)",
                rusqlite::params![HISTORY_CAP as i64],
            )?;
        }
        DbCommand::ClearVerdicts => {
            conn.execute("DELETE FROM verdicts", [])?;
        }
    }
    Ok(())
}

// ── Query helpers (server REST reads + startup rehydration; cold path) ──

pub fn get_recent_verdicts(db: &DbPool, limit: usize) -> AppResult<Vec<BetVerdict>> {
    let conn = db
        .lock()
        .map_err(|e| AppError::Database(format!("lock: {e}")))?;
    let mut stmt = conn.prepare(
        "SELECT id, bet_description, verdict, ev_score, ev_reason, trend, trend_reason, vibe_emoji, vibe_reason, timestamp_ms
         FROM verdicts ORDER BY timestamp_ms DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(rusqlite::params![limit as i64], |row| {
        Ok(BetVerdict {
            id: row.get(0)?,
            bet_description: row.get(1)?,
            verdict: parse_verdict(&row.get::<_, String>(2)?),
            ev_rating: EvRating {
                score: row.get(3)?,
                reason: row.get(4)?,
            },
            player_history: PlayerHistory {
                trend: parse_trend(&row.get::<_, String>(5)?),
                reason: row.get(6)?,
            },
            vibe_aura: VibeAura {
                emoji: row.get(7)?,
                reason: row.get(8)?,
            },
            timestamp: row.get(9)?,
        })
    })?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

fn parse_verdict(s: &str) -> Verdict {
    match s {
        "W" => Verdict::W,
        _ => Verdict::L,
    }
}

fn parse_trend(s: &str) -> Trend {
    match s {
        "hot" => Trend::Hot,
        "cold" => Trend::Cold,
        _ => Trend::Neutral,
    }
}
