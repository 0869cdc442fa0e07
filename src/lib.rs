pub mod api;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod graphql_client;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{ErrorResponse, MdrError};
pub use graphql_client::{GraphQlClient, GraphQlClientError, GraphQlConfig};

pub use logic::AssociationRegistry;

// Export all model types
pub use model::*;

// Export store types
pub use store::{MdrSession, MdrStore, MemoryStore, PostgresStore};

/// Connect to PostgreSQL with the loaded configuration and serve the API.
pub async fn run_server(config: &config::AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    let postgres_store =
        PostgresStore::new(&config.database_url(), config.database.max_connections).await?;

    if config.database.run_migrations {
        log::info!("Running database migrations...");
        postgres_store.migrate().await?;
    }

    let store = Arc::new(postgres_store);
    let app = api::routes::create_router().with_state(store);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Metadata repository listening on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
