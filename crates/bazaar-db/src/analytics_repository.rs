use bazaar_core::AppError;
use bazaar_core::analytics::{
    DashboardQuery, DashboardStats, EntityTotals, MonthlyRevenue, TopProduct,
    complete_monthly, complete_status_counts,
};
use bazaar_core::order::OrderStatus;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::database::db_error;

/// Read-only aggregate queries for the dashboard.
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: Pool<Postgres>,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self, query: DashboardQuery) -> Result<DashboardStats, AppError> {
        let totals = self.totals().await?;

        let (total_revenue,): (Decimal,) = sqlx::query_as(
            r#"SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE status <> 'cancelled'"#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let status_rows: Vec<(String, i64)> =
            sqlx::query_as(r#"SELECT status, COUNT(*) FROM orders GROUP BY status"#)
                .fetch_all(&self.pool)
                .await
                .map_err(db_error)?;
        let status_counts: Vec<(OrderStatus, i64)> = status_rows
            .into_iter()
            .filter_map(|(status, count)| status.parse().ok().map(|s| (s, count)))
            .collect();

        let (low_stock_products,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM products WHERE stock <= $1"#)
                .bind(query.low_stock_threshold)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(DashboardStats {
            totals,
            total_revenue,
            orders_by_status: complete_status_counts(&status_counts),
            low_stock_products,
            top_products: self.top_products(query.top_products).await?,
            monthly_revenue: complete_monthly(
                Utc::now(),
                query.months,
                self.monthly_revenue(query.months).await?,
            ),
        })
    }

    async fn totals(&self) -> Result<EntityTotals, AppError> {
        let (users, products, orders, customers, vendors): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM products),
                    (SELECT COUNT(*) FROM orders),
                    (SELECT COUNT(*) FROM customers),
                    (SELECT COUNT(*) FROM vendors)
                "#,
            )
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(EntityTotals {
            users,
            products,
            orders,
            customers,
            vendors,
        })
    }

    /// Best sellers by units in non-cancelled orders.
    async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>, AppError> {
        let rows: Vec<(Uuid, String, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT oi.product_id,
                   MAX(oi.product_name),
                   SUM(oi.quantity)::BIGINT AS units_sold,
                   SUM(oi.line_total) AS revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.status <> 'cancelled' AND oi.product_id IS NOT NULL
            GROUP BY oi.product_id
            ORDER BY units_sold DESC, revenue DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(product_id, name, units_sold, revenue)| TopProduct {
                product_id,
                name,
                units_sold,
                revenue,
            })
            .collect())
    }

    /// Months are bucketed in UTC regardless of the session time zone.
    async fn monthly_revenue(&self, months: u32) -> Result<Vec<MonthlyRevenue>, AppError> {
        let rows: Vec<(String, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT to_char(date_trunc('month', created_at AT TIME ZONE 'UTC'), 'YYYY-MM') AS month,
                   COUNT(*),
                   COALESCE(SUM(total_amount), 0)
            FROM orders
            WHERE status <> 'cancelled'
              AND created_at AT TIME ZONE 'UTC'
                  >= date_trunc('month', NOW() AT TIME ZONE 'UTC') - make_interval(months => $1)
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(months.saturating_sub(1) as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(month, orders, revenue)| MonthlyRevenue {
                month,
                orders,
                revenue,
            })
            .collect())
    }
}
