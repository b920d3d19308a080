use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reference to a company, as stored inside a county document. Anything
/// beyond the id (ordering hints, display overrides, ...) rides along in
/// `data` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRef {
    #[serde(rename = "companyId")]
    pub company_id: String,
    #[serde(flatten)]
    pub data: Document,
}

/// A county document in the `counties` collection.
///
/// Field names follow the public API: `createdAt` and `companies[].companyId`
/// are camelCase on the wire and in storage. Clients may send arbitrary extra
/// body fields; those are persisted verbatim at the top level through the
/// flattened `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct County {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub companies: Vec<CompanyRef>,
    #[serde(default)]
    pub robots: Document,
    #[serde(rename = "createdAt")]
    pub created_at: bson::DateTime,
    #[serde(flatten)]
    pub extra: Document,
}

impl County {
    pub fn new(name: String, slug: String, excerpt: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            excerpt,
            icon: None,
            companies: Vec::new(),
            robots: Document::new(),
            created_at: bson::DateTime::now(),
            extra: Document::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn new_county_has_no_icon_or_companies() {
        let county = County::new(
            "Kerry".to_string(),
            "kerry".to_string(),
            "The kingdom".to_string(),
        );

        assert!(county.icon.is_none());
        assert!(county.companies.is_empty());
        assert!(county.robots.is_empty());
        assert!(county.extra.is_empty());
    }

    #[test]
    fn extra_fields_round_trip_at_top_level() {
        let mut county = County::new("Cork".to_string(), "cork".to_string(), String::new());
        county.extra = doc! { "population": 581231, "region": "Munster" };

        let encoded = bson::to_document(&county).expect("serialize county");
        assert_eq!(encoded.get_i32("population").unwrap(), 581231);
        assert_eq!(encoded.get_str("region").unwrap(), "Munster");

        let decoded: County = bson::from_document(encoded).expect("deserialize county");
        assert_eq!(decoded.extra.get_str("region").unwrap(), "Munster");
        assert_eq!(decoded.name, "Cork");
    }
}
