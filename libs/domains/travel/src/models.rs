use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{VectorError, VectorResult};

/// Maximum byte length of a record id; matches the primary-key field width.
pub const MAX_ID_LEN: usize = 100;

/// A travel destination as ingested and returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravelRecord {
    /// Externally assigned, unique identifier
    pub id: String,
    pub destination: String,
    pub description: String,
    /// Category, e.g. "City", "Beach"
    #[serde(rename = "type")]
    pub kind: String,
    pub best_time_to_visit: String,
    /// Not part of the embedded text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_cost_per_day: Option<i64>,
    #[serde(default)]
    pub popular_attractions: Vec<String>,
}

impl TravelRecord {
    /// Text blob that is embedded for this record and used as prompt context.
    pub fn content_for_embedding(&self) -> String {
        format!(
            "{} - {}. Type: {}. Best time to visit: {}. Popular attractions: {}",
            self.destination,
            self.description,
            self.kind,
            self.best_time_to_visit,
            self.popular_attractions.join(", ")
        )
    }

    pub fn validate(&self) -> VectorResult<()> {
        validate_record_id(&self.id)
    }
}

pub fn validate_record_id(id: &str) -> VectorResult<()> {
    if id.is_empty() {
        return Err(VectorError::Validation(
            "record id must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_ID_LEN {
        return Err(VectorError::Validation(format!(
            "record id '{}…' is {} bytes, maximum is {}",
            id.chars().take(16).collect::<String>(),
            id.len(),
            MAX_ID_LEN
        )));
    }
    Ok(())
}

/// Result of a travel search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    /// Generated answer grounded on the relevant destinations
    pub ai_response: String,
    /// Resolved matches, best first
    pub relevant_destinations: Vec<TravelRecord>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text question, e.g. "romantic getaway"
    pub query: String,
}
