use crate::analysis::types::{EvRating, PlayerHistory, VibeAura};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::pricing::ev::Verdict;
use portable_atomic::{AtomicBool, AtomicU64, Ordering};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};

/// History keeps only the most recent entries.
pub const HISTORY_CAP: usize = 50;

// ── Stored verdict record ──

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetVerdict {
    pub id: String,
    pub bet_description: String,
    pub verdict: Verdict,
    pub ev_rating: EvRating,
    pub player_history: PlayerHistory,
    pub vibe_aura: VibeAura,
    /// Epoch milliseconds, UTC.
    pub timestamp: i64,
}

// ── Verdict history container ──

/// Explicit state container for verdict history and the in-flight
/// analysis flag. Mutated only through the transition functions below;
/// persistence happens at defined checkpoints via the DB writer task.
#[derive(Debug, Default)]
pub struct VerdictHistory {
    /// Most-recent-first, capped at [`HISTORY_CAP`].
    verdicts: VecDeque<BetVerdict>,
    current: Option<BetVerdict>,
}

impl VerdictHistory {
    /// Rehydrate from persisted rows (already most-recent-first).
    pub fn from_rows(rows: Vec<BetVerdict>) -> Self {
        let mut verdicts: VecDeque<BetVerdict> = rows.into();
        verdicts.truncate(HISTORY_CAP);
        Self {
            verdicts,
            current: None,
        }
    }

    /// Prepend a verdict, dropping the oldest beyond the cap.
    pub fn add_verdict(&mut self, verdict: BetVerdict) {
        self.verdicts.push_front(verdict);
        self.verdicts.truncate(HISTORY_CAP);
    }

    pub fn clear_verdicts(&mut self) {
        self.verdicts.clear();
    }

    pub fn set_current(&mut self, verdict: Option<BetVerdict>) {
        self.current = verdict;
    }

    pub fn current(&self) -> Option<&BetVerdict> {
        self.current.as_ref()
    }

    pub fn verdicts(&self) -> impl Iterator<Item = &BetVerdict> {
        self.verdicts.iter()
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

// ── Messages INTO the analysis worker (bounded channel) ──

#[derive(Debug)]
pub struct AnalyzeCommand {
    pub bet_text: String,
    pub image_base64: Option<String>,
    pub reply: tokio::sync::oneshot::Sender<BetVerdict>,
}

// ── DB Commands (sent to writer task via bounded channel) ──

#[derive(Debug)]
pub enum DbCommand {
    InsertVerdict(BetVerdict),
    ClearVerdicts,
}

// ── Messages OUT to WS clients ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "new_verdict")]
    NewVerdict { verdict: BetVerdict },

    #[serde(rename = "analysis_state")]
    AnalysisState { analyzing: bool },

    #[serde(rename = "history_cleared")]
    HistoryCleared,
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub ev_requests: AtomicU64,
    pub analyses_requested: AtomicU64,
    pub analyses_failed: AtomicU64,
    pub verdicts_stored: AtomicU64,
    pub ws_messages_sent: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            ev_requests: AtomicU64::new(0),
            analyses_requested: AtomicU64::new(0),
            analyses_failed: AtomicU64::new(0),
            verdicts_stored: AtomicU64::new(0),
            ws_messages_sent: AtomicU64::new(0),
        }
    }
}

// ── Application shared state ──

pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,

    /// History + current verdict; cold path, short critical sections.
    pub history: Mutex<VerdictHistory>,

    /// Not persisted: whether an analysis is in flight.
    pub analyzing: AtomicBool,

    // Server -> analysis worker: bounded command channel
    pub analyze_tx: mpsc::Sender<AnalyzeCommand>,

    // Anywhere -> DB writer: bounded command channel
    pub db_tx: mpsc::Sender<DbCommand>,

    // Worker -> WS clients: event stream
    pub ws_tx: broadcast::Sender<WsMessage>,

    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DbPool,
        history: VerdictHistory,
        analyze_tx: mpsc::Sender<AnalyzeCommand>,
        db_tx: mpsc::Sender<DbCommand>,
    ) -> Arc<Self> {
        let (ws_tx, _) = broadcast::channel(256);

        Arc::new(Self {
            config,
            db,
            history: Mutex::new(history),
            analyzing: AtomicBool::new(false),
            analyze_tx,
            db_tx,
            ws_tx,
            counters: PerfCounters::new(),
        })
    }

    #[inline]
    pub fn broadcast(&self, msg: WsMessage) {
        self.counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
        let _ = self.ws_tx.send(msg);
    }

    pub fn set_analyzing(&self, analyzing: bool) {
        self.analyzing.store(analyzing, Ordering::Relaxed);
        self.broadcast(WsMessage::AnalysisState { analyzing });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Trend;

    fn verdict(n: u64) -> BetVerdict {
        BetVerdict {
            id: format!("v{n}"),
            bet_description: format!("bet {n}"),
            verdict: Verdict::W,
            ev_rating: EvRating {
                score: 50.0,
                reason: "test".into(),
            },
            player_history: PlayerHistory {
                trend: Trend::Neutral,
                reason: "test".into(),
            },
            vibe_aura: VibeAura {
                emoji: "🧪".into(),
                reason: "test".into(),
            },
            timestamp: n as i64,
        }
    }

    #[test]
    fn test_add_verdict_is_most_recent_first() {
        let mut h = VerdictHistory::default();
        h.add_verdict(verdict(1));
        h.add_verdict(verdict(2));
        h.add_verdict(verdict(3));
        let ids: Vec<_> = h.verdicts().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["v3", "v2", "v1"]);
    }

    #[test]
    fn test_history_caps_at_fifty() {
        let mut h = VerdictHistory::default();
        for n in 0..60 {
            h.add_verdict(verdict(n));
        }
        assert_eq!(h.len(), HISTORY_CAP);
        // Oldest entries dropped, newest kept at the front
        assert_eq!(h.verdicts().next().unwrap().id, "v59");
        assert_eq!(h.verdicts().last().unwrap().id, "v10");
    }

    #[test]
    fn test_clear_empties_history() {
        let mut h = VerdictHistory::default();
        h.add_verdict(verdict(1));
        h.clear_verdicts();
        assert!(h.is_empty());
    }

    #[test]
    fn test_rehydrate_truncates_to_cap() {
        let rows: Vec<_> = (0..80).map(verdict).collect();
        let h = VerdictHistory::from_rows(rows);
        assert_eq!(h.len(), HISTORY_CAP);
        assert_eq!(h.verdicts().next().unwrap().id, "v0");
    }

    #[test]
    fn test_current_verdict_transitions() {
        let mut h = VerdictHistory::default();
        assert!(h.current().is_none());
        h.set_current(Some(verdict(7)));
        assert_eq!(h.current().unwrap().id, "v7");
        h.set_current(None);
        assert!(h.current().is_none());
    }
}
