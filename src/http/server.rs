use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::payload::PayloadStore;
use crate::queue::QueueManager;
use crate::recovery::JournalSender;

use super::handlers;
use super::middleware::ip_whitelist;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<QueueManager>,
    pub journal: JournalSender,
    pub payloads: Arc<PayloadStore>,
    pub whitelist: Arc<HashSet<IpAddr>>,
}

impl AppState {
    pub fn new(config: &Config, manager: Arc<QueueManager>, journal: JournalSender) -> Self {
        let mut whitelist = HashSet::new();
        for entry in &config.ip_whitelist {
            match entry.parse::<IpAddr>() {
                Ok(ip) => {
                    whitelist.insert(ip);
                }
                Err(_) => tracing::warn!("ignoring unparseable ip_whitelist entry {:?}", entry),
            }
        }
        Self {
            manager,
            journal,
            payloads: Arc::new(PayloadStore::new(config)),
            whitelist: Arc::new(whitelist),
        }
    }
}

/// HTTP front end: serves the same router on every configured bind address.
pub struct HttpServer {
    config: Config,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: Config, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/list", get(handlers::list))
            .route("/count/:queue", get(handlers::count))
            .route("/skip/:queue/:number", get(handlers::skip))
            .route("/set/:queue", get(handlers::set_empty))
            .route("/set/:queue/", get(handlers::set_empty))
            .route("/set/:queue/*message", get(handlers::set))
            .route("/get/:queue", get(handlers::get))
            .route("/fetch/:queue", get(handlers::fetch))
            .route("/download", get(handlers::download_empty))
            .route("/download/", get(handlers::download_empty))
            .route("/download/*message", get(handlers::download))
            .route("/delete/:queue", get(handlers::delete))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                ip_whitelist,
            ))
            .layer(CompressionLayer::new())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn run(self) -> std::io::Result<()> {
        let app = Self::router(self.state);

        // Bind everything up front so a bad address fails fast.
        let mut listeners = Vec::new();
        for addr in &self.config.bind_addresses {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("lmq listening on {}", addr);
            listeners.push(listener);
        }

        let Some(last) = listeners.pop() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "bind_addresses is empty",
            ));
        };

        for listener in listeners {
            let app = app.clone();
            tokio::spawn(async move {
                if let Err(e) =
                    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                        .await
                {
                    tracing::error!("server error: {}", e);
                }
            });
        }

        axum::serve(last, app.into_make_service_with_connect_info::<SocketAddr>()).await
    }
}
