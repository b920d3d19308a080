use crate::models::{CompanyRef, County};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct CountyListParams {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Success envelope shared by the non-list operations.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }
}

/// Success envelope for the paginated list.
#[derive(Debug, Serialize)]
pub struct CountyListResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "currentPage")]
    pub current_page: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "totalCounties")]
    pub total_counties: u64,
    pub data: Vec<CountyResponse>,
}

#[derive(Debug, Serialize)]
pub struct CountyResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub excerpt: String,
    pub icon: Option<String>,
    pub companies: Vec<CompanyRef>,
    pub robots: Document,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Document,
}

impl From<County> for CountyResponse {
    fn from(county: County) -> Self {
        Self {
            id: county.id,
            name: county.name,
            slug: county.slug,
            excerpt: county.excerpt,
            icon: county.icon,
            companies: county.companies,
            robots: county.robots,
            created_at: county.created_at.to_chrono().to_rfc3339(),
            extra: county.extra,
        }
    }
}

/// Replaces each `companies[].companyId` with the referenced company's
/// `{ _id, companyName }`, or null when the reference is dangling. Mirrors a
/// document-store populate of `companies.companyId`.
pub fn expand_company_refs(data: &mut Value, names: &HashMap<String, String>) {
    let Some(companies) = data.get_mut("companies").and_then(Value::as_array_mut) else {
        return;
    };

    for entry in companies {
        let Some(obj) = entry.as_object_mut() else {
            continue;
        };
        let Some(id) = obj.get("companyId").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };

        let expanded = match names.get(&id) {
            Some(name) => serde_json::json!({ "_id": id, "companyName": name }),
            None => Value::Null,
        };
        obj.insert("companyId".to_string(), expanded);
    }
}
