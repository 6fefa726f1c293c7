use crate::pricing::ev::EvInput;
use crate::pricing::service;
use crate::state::{AnalyzeCommand, AppState, BetVerdict, DbCommand, WsMessage, HISTORY_CAP};
use axum::extract::{Json, State};
use axum::http::StatusCode;
use portable_atomic::Ordering;
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub bet_text: String,
    pub image_base64: Option<String>,
}

/// POST /api/ev -- synchronous EV calculation, no network, no state.
/// 400 with a field-naming error code when validation fails.
pub async fn post_ev(
    State(state): State<Arc<AppState>>,
    Json(input): Json<EvInput>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.counters.ev_requests.fetch_add(1, Ordering::Relaxed);
    match service::get_ev(&input) {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!(output))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string(), "code": e.code() })),
        ),
    }
}

/// POST /api/analyze -- runs the AI path via the analysis worker and
/// returns the stored verdict. The worker owns fallback behavior; this
/// handler only fails when the worker itself is gone.
pub async fn post_analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<BetVerdict>, (StatusCode, Json<serde_json::Value>)> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let cmd = AnalyzeCommand {
        bet_text: req.bet_text,
        image_base64: req.image_base64,
        reply: reply_tx,
    };

    let unavailable = || {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "analysis worker unavailable", "code": "channel_closed" })),
        )
    };

    state.analyze_tx.send(cmd).await.map_err(|_| unavailable())?;
    let verdict = reply_rx.await.map_err(|_| unavailable())?;
    Ok(Json(verdict))
}

/// GET /api/verdicts -- history, most-recent-first, capped.
pub async fn get_verdicts(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let verdicts: Vec<BetVerdict> = match state.history.lock() {
        Ok(h) => h.verdicts().take(HISTORY_CAP).cloned().collect(),
        Err(_) => Vec::new(),
    };
    Json(serde_json::json!({ "verdicts": verdicts }))
}

/// DELETE /api/verdicts -- clear transition, in memory and on disk.
pub async fn delete_verdicts(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    if let Ok(mut h) = state.history.lock() {
        h.clear_verdicts();
        h.set_current(None);
    }
    let _ = state.db_tx.send(DbCommand::ClearVerdicts).await;
    state.broadcast(WsMessage::HistoryCleared);
    Json(serde_json::json!({ "cleared": true }))
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "ev_requests": state.counters.ev_requests.load(Relaxed),
        "analyses_requested": state.counters.analyses_requested.load(Relaxed),
        "analyses_failed": state.counters.analyses_failed.load(Relaxed),
        "verdicts_stored": state.counters.verdicts_stored.load(Relaxed),
        "ws_messages_sent": state.counters.ws_messages_sent.load(Relaxed),
    }))
}
