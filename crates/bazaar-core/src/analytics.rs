use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::order::OrderStatus;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;
pub const DEFAULT_TOP_PRODUCTS: u32 = 5;
pub const DEFAULT_REVENUE_MONTHS: u32 = 6;

/// Knobs for the dashboard query, clamped to sane ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
    pub low_stock_threshold: i32,
    pub top_products: u32,
    pub months: u32,
}

impl DashboardQuery {
    pub fn new(
        low_stock_threshold: Option<i32>,
        top_products: Option<u32>,
        months: Option<u32>,
    ) -> Self {
        Self {
            low_stock_threshold: low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
                .max(0),
            top_products: top_products.unwrap_or(DEFAULT_TOP_PRODUCTS).clamp(1, 50),
            months: months.unwrap_or(DEFAULT_REVENUE_MONTHS).clamp(1, 24),
        }
    }
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub totals: EntityTotals,
    /// Sum of all orders that were not cancelled.
    pub total_revenue: Decimal,
    pub orders_by_status: Vec<StatusCount>,
    pub low_stock_products: i64,
    pub top_products: Vec<TopProduct>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EntityTotals {
    pub users: i64,
    pub products: i64,
    pub orders: i64,
    pub customers: i64,
    pub vendors: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub orders: i64,
    pub revenue: Decimal,
}

/// Fill in zero counts for statuses with no orders, in lifecycle order.
pub fn complete_status_counts(counts: &[(OrderStatus, i64)]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: counts
                .iter()
                .filter(|(s, _)| s == status)
                .map(|(_, c)| *c)
                .sum(),
        })
        .collect()
}

/// `YYYY-MM` keys for the `months` calendar months ending with `now`'s month,
/// oldest first.
pub fn month_keys(now: DateTime<Utc>, months: u32) -> Vec<String> {
    let mut year = now.year();
    let mut month = now.month();
    let mut keys = Vec::with_capacity(months as usize);
    for _ in 0..months {
        keys.push(format!("{year:04}-{month:02}"));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    keys.reverse();
    keys
}

/// Align per-month rows to the full window, filling empty months with zeros.
pub fn complete_monthly(
    now: DateTime<Utc>,
    months: u32,
    rows: Vec<MonthlyRevenue>,
) -> Vec<MonthlyRevenue> {
    month_keys(now, months)
        .into_iter()
        .map(|month| {
            rows.iter()
                .find(|r| r.month == month)
                .cloned()
                .unwrap_or(MonthlyRevenue {
                    month,
                    orders: 0,
                    revenue: Decimal::ZERO,
                })
        })
        .collect()
}
