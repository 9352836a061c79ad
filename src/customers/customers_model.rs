use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::Error, Result};

/// Domain model for a customer. Email is the stable identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Defaults used when a customer record is created on first contact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::Validation(format!(
                "Invalid customer email: '{}'",
                self.email
            )));
        }
        Ok(())
    }
}
