mod analysis;
mod config;
mod db;
mod errors;
mod pricing;
mod server;
mod state;

use crate::analysis::client::AiClient;
use crate::state::*;
use portable_atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("wirepick service starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    // Init database
    let db_pool = match db::init_db(&cfg.data_dir) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("database init error: {e}");
            std::process::exit(1);
        }
    };

    // Rehydrate verdict history from disk (most-recent-first, capped)
    let history = match db::get_recent_verdicts(&db_pool, HISTORY_CAP) {
        Ok(rows) => {
            tracing::info!(count = rows.len(), "verdict history rehydrated");
            VerdictHistory::from_rows(rows)
        }
        Err(e) => {
            tracing::warn!("history rehydration failed, starting empty: {e}");
            VerdictHistory::default()
        }
    };

    // Create bounded channels
    let (analyze_tx, analyze_rx) = mpsc::channel::<AnalyzeCommand>(64);
    let (db_tx, db_rx) = mpsc::channel::<DbCommand>(256);

    // Create shared state
    let app_state = state::AppState::new(cfg.clone(), db_pool.clone(), history, analyze_tx, db_tx);

    // ── Spawn tasks ──

    // 1. DB writer task (dedicated, owns all database writes)
    let db_pool_writer = db_pool.clone();
    tokio::spawn(async move {
        db::run_db_writer(db_pool_writer, db_rx).await;
    });

    // 2. Analysis worker task (AI calls + history transitions)
    let worker_state = app_state.clone();
    let worker_cfg = cfg.clone();
    tokio::spawn(async move {
        run_analysis_worker(worker_state, worker_cfg, analyze_rx).await;
    });

    // 3. Axum HTTP + WS server
    let server_state = app_state.clone();
    let port = cfg.server_port;

    let app = axum::Router::new()
        .route("/api/ev", axum::routing::post(server::routes::post_ev))
        .route("/api/analyze", axum::routing::post(server::routes::post_analyze))
        .route(
            "/api/verdicts",
            axum::routing::get(server::routes::get_verdicts)
                .delete(server::routes::delete_verdicts),
        )
        .route("/api/counters", axum::routing::get(server::routes::get_counters))
        .route("/ws", axum::routing::get(server::ws::ws_handler))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(server_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}

/// Analysis worker loop. One analysis at a time: calls the AI path,
/// applies the history transitions, persists, broadcasts, replies.
async fn run_analysis_worker(
    state: Arc<AppState>,
    config: config::AppConfig,
    mut rx: mpsc::Receiver<AnalyzeCommand>,
) {
    tracing::info!("analysis worker started");

    let ai = AiClient::new(&config.openai_base_url, &config.openai_api_key);

    while let Some(cmd) = rx.recv().await {
        state.counters.analyses_requested.fetch_add(1, Ordering::Relaxed);
        state.set_analyzing(true);

        let verdict = match analysis::analyze_bet(
            &ai,
            &config,
            &cmd.bet_text,
            cmd.image_base64.as_deref(),
        )
        .await
        {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "bet analysis failed, using fallback verdict");
                state.counters.analyses_failed.fetch_add(1, Ordering::Relaxed);
                analysis::fallback_verdict(&cmd.bet_text)
            }
        };

        // add-verdict + set-current transitions, then persist and broadcast
        if let Ok(mut h) = state.history.lock() {
            h.add_verdict(verdict.clone());
            h.set_current(Some(verdict.clone()));
        }
        if state
            .db_tx
            .send(DbCommand::InsertVerdict(verdict.clone()))
            .await
            .is_ok()
        {
            state.counters.verdicts_stored.fetch_add(1, Ordering::Relaxed);
        }
        state.broadcast(WsMessage::NewVerdict {
            verdict: verdict.clone(),
        });

        state.set_analyzing(false);

        tracing::info!(
            id = %verdict.id,
            verdict = %verdict.verdict,
            "analysis complete"
        );

        let _ = cmd.reply.send(verdict);
    }

    tracing::info!("analysis worker shutting down");
}
