use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde_json::{Map, Value};
use service_core::error::AppError;

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Request body for create/update. Counties are posted either as a plain
/// JSON object or as `multipart/form-data` (when an icon file rides along).
/// Multipart text parts land as string values, so nested fields like
/// `companies` arrive stringified and go through the lenient decode.
#[derive(Debug, Default)]
pub struct CountyPayload {
    pub fields: Map<String, Value>,
    pub file: Option<UploadedFile>,
}

#[async_trait]
impl<S> FromRequest<S> for CountyPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state).await.map_err(|e| {
                AppError::ValidationError(format!("Failed to read multipart body: {}", e))
            })?;

            let mut fields = Map::new();
            let mut file = None;

            while let Some(field) = multipart.next_field().await.map_err(|e| {
                AppError::ValidationError(format!("Failed to read multipart field: {}", e))
            })? {
                if let Some(filename) = field.file_name().map(str::to_string) {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| {
                            AppError::ValidationError(format!("Failed to read file bytes: {}", e))
                        })?
                        .to_vec();
                    file = Some(UploadedFile {
                        filename,
                        content_type,
                        data,
                    });
                } else {
                    let name = field.name().unwrap_or_default().to_string();
                    let text = field.text().await.map_err(|e| {
                        AppError::ValidationError(format!(
                            "Failed to read multipart field {}: {}",
                            name, e
                        ))
                    })?;
                    fields.insert(name, Value::String(text));
                }
            }

            Ok(Self { fields, file })
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| AppError::ValidationError(format!("Invalid JSON body: {}", e)))?;

            match value {
                Value::Object(fields) => Ok(Self { fields, file: None }),
                _ => Err(AppError::ValidationError(
                    "Request body must be a JSON object".to_string(),
                )),
            }
        }
    }
}
