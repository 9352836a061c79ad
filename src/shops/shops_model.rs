use serde::{Deserialize, Serialize};

/// Domain model for a glass shop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub postal_code: String,
    pub is_active: bool,
}
