//! Territory types

use serde::{Deserialize, Serialize};

/// A named grouping the optimizer scopes requests to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Request to create a new territory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTerritoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_territory_tolerates_missing_description() {
        let territory: Territory =
            serde_json::from_str(r#"{"id": "t1", "name": "North"}"#).unwrap();
        assert_eq!(territory.name, "North");
        assert_eq!(territory.description, "");
    }
}
