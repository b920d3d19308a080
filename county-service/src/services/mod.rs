pub mod database;
pub mod uploads;

pub use database::MongoDb;
pub use uploads::{LocalUploads, UploadStore};
