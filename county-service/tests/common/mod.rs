use county_service::config::CountyConfig;
use county_service::models::{Company, County};
use county_service::services::MongoDb;
use county_service::startup::Application;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
    pub uploads_dir: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");

        let db_name = format!("county_test_{}", Uuid::new_v4());
        let uploads_dir = format!("target/test-uploads-{}", Uuid::new_v4());

        let mut config = CountyConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.clone();
        config.uploads.dir = uploads_dir.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            uploads_dir,
        }
    }

    pub async fn seed_county(&self, name: &str, slug: &str, excerpt: &str) -> County {
        let county = County::new(name.to_string(), slug.to_string(), excerpt.to_string());
        self.db
            .counties()
            .insert_one(&county, None)
            .await
            .expect("Failed to insert county");
        county
    }

    pub async fn seed_county_doc(&self, county: &County) {
        self.db
            .counties()
            .insert_one(county, None)
            .await
            .expect("Failed to insert county");
    }

    pub async fn seed_company(&self, id: &str, name: &str) {
        let company = Company {
            id: id.to_string(),
            company_name: name.to_string(),
        };
        self.db
            .companies()
            .insert_one(&company, None)
            .await
            .expect("Failed to insert company");
    }

    pub async fn county_count(&self) -> u64 {
        self.db
            .counties()
            .count_documents(None, None)
            .await
            .expect("Failed to count counties")
    }

    /// Cleanup test resources (database and upload directory).
    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
        let _ = tokio::fs::remove_dir_all(&self.uploads_dir).await;
    }
}
