use serde::Serialize;

use cinelog_core::MovieRecord;

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// The add-on manifest the browsing client fetches before anything else.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub catalogs: Vec<CatalogDescriptor>,
    pub resources: Vec<String>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub name: String,
}

impl Manifest {
    pub fn for_user(username: &str, catalog_id: &str) -> Self {
        Self {
            id: format!("org.cinelog.{username}"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: format!("Movie Diary: {username}"),
            description: format!("All movies logged by {username}, with their ratings"),
            catalogs: vec![CatalogDescriptor {
                kind: "movie".to_string(),
                id: catalog_id.to_string(),
                name: format!("{username}'s diary"),
            }],
            resources: vec!["catalog".to_string(), "meta".to_string()],
            types: vec!["movie".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog & meta responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaItem>,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    /// `null` for an unknown id: a well-formed miss, never a fault.
    pub meta: Option<MetaItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub poster: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_info: Option<String>,
}

impl From<MovieRecord> for MetaItem {
    fn from(record: MovieRecord) -> Self {
        Self {
            id: record.id,
            kind: "movie".to_string(),
            name: record.title,
            poster: record.poster,
            description: record.description,
            release_info: record.year.map(|y| y.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
