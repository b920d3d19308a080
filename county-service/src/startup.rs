use crate::config::CountyConfig;
use crate::handlers;
use crate::services::{LocalUploads, MongoDb, UploadStore};
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: CountyConfig,
    pub db: MongoDb,
    pub uploads: Arc<dyn UploadStore>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: CountyConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let uploads: Arc<dyn UploadStore> =
            Arc::new(LocalUploads::new(&config.uploads.dir).await.map_err(|e| {
                tracing::error!(
                    "Failed to initialize upload store at {}: {}",
                    config.uploads.dir,
                    e
                );
                e
            })?);

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            uploads,
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route(
                "/counties",
                post(handlers::create_county).get(handlers::list_counties),
            )
            .route("/counties/all", get(handlers::list_all_counties))
            .route(
                "/counties/:id",
                get(handlers::get_county)
                    .put(handlers::update_county)
                    .delete(handlers::delete_county),
            )
            .nest_service("/uploads", ServeDir::new(&config.uploads.dir))
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
