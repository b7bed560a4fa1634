use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info};

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::resources::{create_record, delete_record, get_record, list_records, patch_record};
use super::{log_requests, state::*, ServerConfig};
use crate::catalog::{Artist, Customer, Genre, Label, Payment, Plan, Resource, Track};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

/// Collection and item routes for one kind.
fn with_resource<R: Resource>(router: Router<ServerState>) -> Router<ServerState> {
    let collection = format!("/api/{}/", R::KIND.collection_path());
    let item = format!("/api/{}/{{id}}", R::KIND.collection_path());
    router
        .route(
            &collection,
            get(list_records::<R>).post(create_record::<R>),
        )
        .route(
            &item,
            get(get_record::<R>)
                .patch(patch_record::<R>)
                .delete(delete_record::<R>),
        )
}

pub fn make_app(config: ServerConfig, store: GuardedRecordStore) -> Router {
    let state = ServerState::new(config, store);

    let mut app: Router<ServerState> = Router::new().route("/", get(home));
    app = with_resource::<Track>(app);
    app = with_resource::<Artist>(app);
    app = with_resource::<Genre>(app);
    app = with_resource::<Label>(app);
    app = with_resource::<Customer>(app);
    app = with_resource::<Plan>(app);
    app = with_resource::<Payment>(app);

    app.layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    info!("Shutdown requested, draining connections...");
}

pub async fn run_server(store: GuardedRecordStore, config: ServerConfig) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, store);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Ready to serve at {}!", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
