use serde::{Deserialize, Serialize};

/// The slice of a company document this service reads when expanding
/// `companies[].companyId` on a county fetch. Companies are owned by another
/// service; we only ever query `_id` and `companyName` (with a projection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "companyName", default)]
    pub company_name: String,
}
