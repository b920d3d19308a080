use crate::models::{Company, County};
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// Unique indexes on name and slug back the pre-insert existence check:
    /// two concurrent creates can both pass the check, but only one insert
    /// can win.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for county-service");

        let counties = self.counties();

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name("unique_name".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        counties.create_index(name_index, None).await.map_err(|e| {
            tracing::error!("Failed to create name index on counties collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created unique index on counties.name");

        let slug_index = IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(
                IndexOptions::builder()
                    .name("unique_slug".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        counties.create_index(slug_index, None).await.map_err(|e| {
            tracing::error!("Failed to create slug index on counties collection: {}", e);
            AppError::from(e)
        })?;
        tracing::info!("Created unique index on counties.slug");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn counties(&self) -> Collection<County> {
        self.db.collection("counties")
    }

    pub fn companies(&self) -> Collection<Company> {
        self.db.collection("companies")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
