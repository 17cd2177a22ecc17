use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::validate;

/// Postal address, stored as a JSON sub-document on its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub country: String,
}

impl Address {
    /// Trim every field and require street, city and country.
    pub fn normalized(self) -> Result<Self, AppError> {
        Ok(Self {
            street: validate::required("Street", &self.street)?,
            city: validate::required("City", &self.city)?,
            state: validate::optional(self.state),
            postal_code: validate::optional(self.postal_code),
            country: validate::required("Country", &self.country)?,
        })
    }
}
