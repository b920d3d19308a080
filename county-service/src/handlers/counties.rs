use crate::dtos::{
    decode_lenient, expand_company_refs, ApiResponse, CountyListParams, CountyListResponse,
    CountyPayload, CountyResponse, Lenient,
};
use crate::models::{CompanyRef, County};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use service_core::error::{is_duplicate_key_error, AppError};
use std::collections::HashMap;

const REQUIRED_FIELDS_MESSAGE: &str = "All fields are required.";
const DUPLICATE_MESSAGE: &str = "County with that name or slug already exists.";
const NOT_FOUND_MESSAGE: &str = "County not found";

pub async fn create_county(
    State(state): State<AppState>,
    mut payload: CountyPayload,
) -> Result<impl IntoResponse, AppError> {
    let name = take_trimmed(&mut payload.fields, "name");
    let slug = take_trimmed(&mut payload.fields, "slug");
    let excerpt = take_trimmed(&mut payload.fields, "excerpt").unwrap_or_default();

    let (name, slug) = match (name, slug) {
        (Some(name), Some(slug)) => (name, slug),
        _ => return Err(AppError::ValidationError(REQUIRED_FIELDS_MESSAGE.to_string())),
    };

    let companies = take_lenient::<Vec<CompanyRef>>(&mut payload.fields, "companies")
        .map(Lenient::into_inner)
        .unwrap_or_default();
    let robots = take_lenient::<Document>(&mut payload.fields, "robots")
        .map(Lenient::into_inner)
        .unwrap_or_default();

    let existing = state
        .db
        .counties()
        .find_one(doc! { "$or": [ { "name": &name }, { "slug": &slug } ] }, None)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(DUPLICATE_MESSAGE.to_string()));
    }

    let icon = match payload.file.take() {
        Some(file) => Some(state.uploads.store(&file.filename, file.data).await?),
        None => None,
    };

    let mut county = County::new(name, slug, excerpt);
    county.icon = icon;
    county.companies = companies;
    county.robots = robots;
    county.extra = extension_fields(payload.fields)?;

    // The existence check above can race a concurrent create; the unique
    // indexes make the loser land here.
    state.db.counties().insert_one(&county, None).await.map_err(|e| {
        if is_duplicate_key_error(&e) {
            AppError::Conflict(DUPLICATE_MESSAGE.to_string())
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(county_id = %county.id, slug = %county.slug, "County created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "County created successfully.",
            CountyResponse::from(county),
        )),
    ))
}

pub async fn list_counties(
    State(state): State<AppState>,
    Query(params): Query<CountyListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).max(1);
    let skip = (page - 1) * limit as u64;

    let mut filter = doc! {};
    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        filter = doc! {
            "$or": [
                { "name": { "$regex": search, "$options": "i" } },
                { "slug": { "$regex": search, "$options": "i" } },
                { "excerpt": { "$regex": search, "$options": "i" } },
            ]
        };
    }

    let sort_field = params.sort_by.unwrap_or_else(|| "createdAt".to_string());
    let sort_direction = if params.sort_order.as_deref() == Some("asc") {
        1
    } else {
        -1
    };
    let mut sort = Document::new();
    sort.insert(sort_field, sort_direction);

    let total = state
        .db
        .counties()
        .count_documents(filter.clone(), None)
        .await?;

    let find_options = FindOptions::builder()
        .sort(sort)
        .skip(skip)
        .limit(limit)
        .build();

    let mut cursor = state.db.counties().find(filter, find_options).await?;
    let mut counties = Vec::new();
    while let Some(county) = cursor.try_next().await? {
        counties.push(CountyResponse::from(county));
    }

    let total_pages = (total as f64 / limit as f64).ceil() as u64;

    Ok(Json(CountyListResponse {
        success: true,
        message: "Counties fetched successfully.".to_string(),
        current_page: page,
        total_pages,
        total_counties: total,
        data: counties,
    }))
}

pub async fn list_all_counties(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut cursor = state.db.counties().find(None, None).await?;
    let mut counties = Vec::new();
    while let Some(county) = cursor.try_next().await? {
        counties.push(CountyResponse::from(county));
    }

    Ok(Json(ApiResponse::ok(
        "Counties fetched successfully.",
        counties,
    )))
}

pub async fn get_county(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let county = state
        .db
        .counties()
        .find_one(doc! { "_id": &id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    let names = fetch_company_names(&state, &county).await?;

    let mut data = serde_json::to_value(CountyResponse::from(county)).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to serialize county: {}", e))
    })?;
    expand_company_refs(&mut data, &names);

    Ok(Json(ApiResponse::ok("County fetched successfully.", data)))
}

pub async fn update_county(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut payload: CountyPayload,
) -> Result<impl IntoResponse, AppError> {
    // An `icon` body field is discarded on purpose: the icon only changes
    // when a new file is uploaded. Existing API behavior, kept for
    // compatibility.
    payload.fields.remove("icon");

    let mut update = Document::new();

    for key in ["name", "slug", "excerpt"] {
        if let Some(Value::String(value)) = payload.fields.remove(key) {
            update.insert(key, value);
        }
    }

    if let Some(companies) = take_lenient::<Vec<CompanyRef>>(&mut payload.fields, "companies") {
        let encoded = bson::to_bson(&companies.into_inner()).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to encode companies: {}", e))
        })?;
        update.insert("companies", encoded);
    }
    if let Some(robots) = take_lenient::<Document>(&mut payload.fields, "robots") {
        update.insert("robots", robots.into_inner());
    }

    if let Some(file) = payload.file.take() {
        let icon = state.uploads.store(&file.filename, file.data).await?;
        update.insert("icon", icon);
    }

    for (key, value) in extension_fields(payload.fields)? {
        update.insert(key, value);
    }

    let county = if update.is_empty() {
        // Nothing to set; an empty $set is rejected by the server.
        state
            .db
            .counties()
            .find_one(doc! { "_id": &id }, None)
            .await?
    } else {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        state
            .db
            .counties()
            .find_one_and_update(doc! { "_id": &id }, doc! { "$set": update }, options)
            .await
            .map_err(|e| {
                if is_duplicate_key_error(&e) {
                    AppError::Conflict(DUPLICATE_MESSAGE.to_string())
                } else {
                    AppError::from(e)
                }
            })?
    };

    let county = county.ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    tracing::info!(county_id = %county.id, "County updated");

    Ok(Json(ApiResponse::ok(
        "County updated successfully.",
        CountyResponse::from(county),
    )))
}

pub async fn delete_county(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let county = state
        .db
        .counties()
        .find_one_and_delete(doc! { "_id": &id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    tracing::info!(county_id = %county.id, "County deleted");

    // Original message has no trailing period.
    Ok(Json(ApiResponse::ok(
        "County deleted successfully",
        CountyResponse::from(county),
    )))
}

async fn fetch_company_names(
    state: &AppState,
    county: &County,
) -> Result<HashMap<String, String>, AppError> {
    let ids: Vec<String> = county
        .companies
        .iter()
        .map(|c| c.company_id.clone())
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let find_options = FindOptions::builder()
        .projection(doc! { "companyName": 1 })
        .build();
    let mut cursor = state
        .db
        .companies()
        .find(doc! { "_id": { "$in": ids } }, find_options)
        .await?;

    let mut names = HashMap::new();
    while let Some(company) = cursor.try_next().await? {
        names.insert(company.id, company.company_name);
    }
    Ok(names)
}

/// Removes `key` from the body, returning it trimmed. Missing, non-string,
/// and whitespace-only values all count as absent.
fn take_trimmed(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

fn take_lenient<T>(fields: &mut Map<String, Value>, key: &str) -> Option<Lenient<T>>
where
    T: DeserializeOwned + Default,
{
    let value = fields.remove(key)?;
    let decoded = decode_lenient(value);
    if decoded.is_defaulted() {
        tracing::warn!(field = key, "Failed to decode field, substituting empty default");
    }
    Some(decoded)
}

// Keys the API assigns itself and never accepts through pass-through.
const RESERVED_KEYS: &[&str] = &["_id", "icon", "createdAt"];

fn extension_fields(mut fields: Map<String, Value>) -> Result<Document, AppError> {
    for key in RESERVED_KEYS {
        fields.remove(*key);
    }
    bson::to_document(&fields).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to encode extra fields: {}", e))
    })
}
