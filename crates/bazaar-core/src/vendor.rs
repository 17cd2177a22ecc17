use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::Address;

/// Commission percentage applied when none is given.
pub const DEFAULT_COMMISSION_RATE: Decimal = Decimal::TEN;

/// Onboarding state of a marketplace seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    Pending,
    Active,
    Suspended,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorStatus::Pending => "pending",
            VendorStatus::Active => "active",
            VendorStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VendorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(VendorStatus::Pending),
            "active" => Ok(VendorStatus::Active),
            "suspended" => Ok(VendorStatus::Suspended),
            _ => Err(format!("Unknown vendor status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub status: VendorStatus,
    pub commission_rate: Decimal,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub status: VendorStatus,
    pub commission_rate: Decimal,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default)]
pub struct VendorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub status: Option<VendorStatus>,
    pub commission_rate: Option<Decimal>,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    pub status: Option<VendorStatus>,
    /// Case-insensitive substring match on name, email or company.
    pub search: Option<String>,
}
