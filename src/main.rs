use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use tower_http::trace::TraceLayer;

use ledger_server::{
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    notifier::WebhookNotifier,
    routes::router,
    services::ServiceContext,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.logging.rust_log);

    let db_cfg = cfg
        .database
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("database config section is required"))?;
    let db = connection::connect(db_cfg).await?;

    let notifier = Arc::new(WebhookNotifier::new(cfg.mailer.clone()));
    let state = AppState::new(cfg, db, notifier)?;

    let services = ServiceContext::from_state(state.as_ref());
    services.auth().seed_admin(&state.auth).await?;

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .map_err(|err| anyhow::anyhow!("invalid host/port: {err}"))?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
