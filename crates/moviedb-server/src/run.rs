use crate::config::ServerConfig;
use crate::error::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use futures::FutureExt;
use moviedb_app::graphql::GRAPHQL_PATH;
use moviedb_app::state::{AppConfig, AppState};
use tracing::{debug, error, info, warn};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Listening on {}, GraphQL endpoint {}",
        listener.local_addr()?,
        args.base_url.join(GRAPHQL_PATH)?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

fn main_router(state: AppState) -> Router<()> {
    let graphiql = state.config().graphiql;
    if graphiql {
        debug!("GraphiQL explorer enabled");
    }
    Router::new()
        .merge(moviedb_app::graphql::router(graphiql))
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match moviedb_dal::ping(state.pool()).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            error!("Health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
        }
    }
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    if config.uses_data_dir() {
        let data_dir = config.ensure_data_dir()?;
        debug!("Using data directory {}", data_dir.display());
    }

    let pool = moviedb_dal::new_pool(&config.database_url()).await?;
    if config.reset_db {
        warn!("Resetting database, all movies and genres are dropped");
        moviedb_dal::reset_schema(&pool).await?;
    } else {
        moviedb_dal::migrate(&pool).await?;
    }

    let app_config = AppConfig {
        graphiql: config.graphiql(),
    };
    Ok(AppState::new(app_config, pool))
}
