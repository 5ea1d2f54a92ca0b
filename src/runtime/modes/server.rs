//! Server mode

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::{
    self, AppState,
    middleware::{RequestIdMiddleware, TimingMiddleware},
};
use crate::config::StaticConfig;
use crate::runtime::lifetime;

/// Run the HTTP server until it stops or Ctrl+C is received
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let store = startup.store.clone();
    let state = web::Data::new(AppState::new(
        startup.store,
        startup.reagents,
        startup.brand,
        startup.title,
    ));

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TimingMiddleware) // outermost, measures full latency
            .wrap(RequestIdMiddleware)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(state.clone())
            .app_data(web::FormConfig::default().limit(64 * 1024))
            .configure(api::configure)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?;

    warn!("Starting server at http://{}", bind_address);
    let server = server.run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&store) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
