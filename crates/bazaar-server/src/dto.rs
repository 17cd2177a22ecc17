use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_core::Address;
use bazaar_core::analytics::{
    DashboardStats, EntityTotals, MonthlyRevenue, StatusCount, TopProduct,
};
use bazaar_core::customer::Customer;
use bazaar_core::order::{Order, OrderItem};
use bazaar_core::pagination::{Page, PaginationMeta};
use bazaar_core::product::Product;
use bazaar_core::user::User;
use bazaar_core::vendor::Vendor;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Success envelope: `{ success: true, data, pagination? }`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationResponse>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wrap one page of records, converting each into its response type.
    pub fn page<R>(page: Page<R>) -> Self
    where
        R: Into<T>,
    {
        let meta = page.meta();
        Self {
            success: true,
            data: page.items.into_iter().map(Into::into).collect(),
            pagination: Some(meta.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<PaginationMeta> for PaginationResponse {
    fn from(meta: PaginationMeta) -> Self {
        Self {
            page: meta.page,
            limit: meta.limit,
            total: meta.total,
            total_pages: meta.total_pages,
        }
    }
}

/// Error envelope: `{ success: false, error, code }`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error code, e.g. `not_found` or `insufficient_stock`.
    pub code: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeletedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Postal address sub-document.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AddressBody {
    pub street: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub country: String,
}

impl From<Address> for AddressBody {
    fn from(a: Address) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
        }
    }
}

impl From<AddressBody> for Address {
    fn from(a: AddressBody) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    /// At least 8 characters.
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `admin`, `manager` or `user` (default).
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    /// Matches name or email.
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub status: String,
    pub vendor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            sku: p.sku,
            category: p.category,
            price: p.price,
            stock: p.stock,
            status: p.status.to_string(),
            vendor_id: p.vendor_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub category: Option<String>,
    pub price: Decimal,
    /// Defaults to 0.
    pub stock: Option<i32>,
    /// `active` (default) or `inactive`.
    pub status: Option<String>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub status: Option<String>,
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListProductsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Matches name or SKU.
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Only products with stock at or below this value.
    pub low_stock: Option<i32>,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: String,
    pub total_amount: Decimal,
    pub shipping_address: Option<AddressBody>,
    pub notes: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            customer_id: o.customer_id,
            status: o.status.to_string(),
            total_amount: o.total_amount,
            shipping_address: o.shipping_address.map(Into::into),
            notes: o.notes,
            items: o.items.into_iter().map(Into::into).collect(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    /// `null` once the product has been deleted.
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total: item.line_total,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub items: Vec<OrderLineRequest>,
    pub shipping_address: Option<AddressBody>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrderRequest {
    /// Target status; must be a legal transition from the current one.
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    /// Ignored for the `user` role, which only sees its own orders.
    pub user_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<AddressBody>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address.map(Into::into),
            status: c.status.to_string(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<AddressBody>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<AddressBody>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListCustomersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    /// Matches name or email.
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Vendors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VendorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub status: String,
    pub commission_rate: Decimal,
    pub address: Option<AddressBody>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vendor> for VendorResponse {
    fn from(v: Vendor) -> Self {
        Self {
            id: v.id,
            name: v.name,
            email: v.email,
            phone: v.phone,
            company_name: v.company_name,
            status: v.status.to_string(),
            commission_rate: v.commission_rate,
            address: v.address.map(Into::into),
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateVendorRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    /// Percentage between 0 and 100; defaults to 10.
    pub commission_rate: Option<Decimal>,
    /// `pending` (default), `active` or `suspended`.
    pub status: Option<String>,
    pub address: Option<AddressBody>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateVendorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub commission_rate: Option<Decimal>,
    pub status: Option<String>,
    pub address: Option<AddressBody>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListVendorsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    /// Matches name, email or company name.
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DashboardParams {
    /// Stock level at or below which a product counts as low (default 10).
    pub low_stock_threshold: Option<i32>,
    /// Number of best sellers to return (default 5).
    pub top_products: Option<u32>,
    /// Months of revenue history, including the current one (default 6).
    pub months: Option<u32>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub totals: TotalsResponse,
    /// Revenue of all non-cancelled orders.
    pub total_revenue: Decimal,
    pub orders_by_status: Vec<StatusCountResponse>,
    pub low_stock_products: i64,
    pub top_products: Vec<TopProductResponse>,
    pub monthly_revenue: Vec<MonthlyRevenueResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TotalsResponse {
    pub users: i64,
    pub products: i64,
    pub orders: i64,
    pub customers: i64,
    pub vendors: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatusCountResponse {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TopProductResponse {
    pub product_id: Uuid,
    pub name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MonthlyRevenueResponse {
    /// `YYYY-MM`
    pub month: String,
    pub orders: i64,
    pub revenue: Decimal,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        let EntityTotals {
            users,
            products,
            orders,
            customers,
            vendors,
        } = stats.totals;

        Self {
            totals: TotalsResponse {
                users,
                products,
                orders,
                customers,
                vendors,
            },
            total_revenue: stats.total_revenue,
            orders_by_status: stats
                .orders_by_status
                .into_iter()
                .map(|StatusCount { status, count }| StatusCountResponse {
                    status: status.to_string(),
                    count,
                })
                .collect(),
            low_stock_products: stats.low_stock_products,
            top_products: stats
                .top_products
                .into_iter()
                .map(
                    |TopProduct {
                         product_id,
                         name,
                         units_sold,
                         revenue,
                     }| TopProductResponse {
                        product_id,
                        name,
                        units_sold,
                        revenue,
                    },
                )
                .collect(),
            monthly_revenue: stats
                .monthly_revenue
                .into_iter()
                .map(
                    |MonthlyRevenue {
                         month,
                         orders,
                         revenue,
                     }| MonthlyRevenueResponse {
                        month,
                        orders,
                        revenue,
                    },
                )
                .collect(),
        }
    }
}
