use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bazaar API",
        version = "0.1.0",
        description = "Admin backend for a multi-vendor e-commerce dashboard."
    ),
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::change_password,
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::products::list_products,
        crate::routes::products::create_product,
        crate::routes::products::get_product,
        crate::routes::products::update_product,
        crate::routes::products::delete_product,
        crate::routes::orders::list_orders,
        crate::routes::orders::create_order,
        crate::routes::orders::get_order,
        crate::routes::orders::update_order,
        crate::routes::orders::delete_order,
        crate::routes::customers::list_customers,
        crate::routes::customers::create_customer,
        crate::routes::customers::get_customer,
        crate::routes::customers::update_customer,
        crate::routes::customers::delete_customer,
        crate::routes::vendors::list_vendors,
        crate::routes::vendors::create_vendor,
        crate::routes::vendors::get_vendor,
        crate::routes::vendors::update_vendor,
        crate::routes::vendors::delete_vendor,
        crate::routes::analytics::dashboard,
        crate::routes::health::health,
    ),
    components(schemas(
        crate::dto::PaginationResponse,
        crate::dto::ErrorResponse,
        crate::dto::DeletedResponse,
        crate::dto::HealthResponse,
        crate::dto::AddressBody,
        crate::dto::RegisterRequest,
        crate::dto::LoginRequest,
        crate::dto::AuthResponse,
        crate::dto::ChangePasswordRequest,
        crate::dto::UserResponse,
        crate::dto::CreateUserRequest,
        crate::dto::UpdateUserRequest,
        crate::dto::ProductResponse,
        crate::dto::CreateProductRequest,
        crate::dto::UpdateProductRequest,
        crate::dto::OrderResponse,
        crate::dto::OrderItemResponse,
        crate::dto::OrderLineRequest,
        crate::dto::CreateOrderRequest,
        crate::dto::UpdateOrderRequest,
        crate::dto::CustomerResponse,
        crate::dto::CreateCustomerRequest,
        crate::dto::UpdateCustomerRequest,
        crate::dto::VendorResponse,
        crate::dto::CreateVendorRequest,
        crate::dto::UpdateVendorRequest,
        crate::dto::DashboardResponse,
        crate::dto::TotalsResponse,
        crate::dto::StatusCountResponse,
        crate::dto::TopProductResponse,
        crate::dto::MonthlyRevenueResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and the current account"),
        (name = "users", description = "Account management (admin)"),
        (name = "products", description = "Catalog"),
        (name = "orders", description = "Order placement and fulfilment"),
        (name = "customers", description = "Customer records"),
        (name = "vendors", description = "Marketplace sellers"),
        (name = "analytics", description = "Dashboard statistics"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/login."))
                        .build(),
                ),
            );
        }
    }
}
