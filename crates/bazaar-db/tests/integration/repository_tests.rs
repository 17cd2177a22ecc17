use bazaar_core::customer::{CustomerFilter, CustomerStatus, CustomerUpdate, NewCustomer};
use bazaar_core::product::{ProductFilter, ProductStatus, ProductUpdate};
use bazaar_core::user::{Role, UserFilter, UserUpdate};
use bazaar_core::vendor::{NewVendor, VendorStatus, VendorUpdate};
use bazaar_core::{Address, AppError, PageRequest};

use crate::integration::common::{create_product, create_user, dec, new_product, setup_test_db};

#[tokio::test]
async fn duplicate_user_email_is_conflict() {
    let (db, _container) = setup_test_db().await;
    create_user(&db, "ada@example.com", Role::Admin).await;

    let err = db
        .user_repo()
        .create(&bazaar_core::user::NewUser {
            name: "Other".into(),
            email: "ada@example.com".into(),
            password_hash: "x".into(),
            role: Role::User,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn user_update_and_filter() {
    let (db, _container) = setup_test_db().await;
    let repo = db.user_repo();
    let ada = create_user(&db, "ada@example.com", Role::Admin).await;
    create_user(&db, "bob@example.com", Role::User).await;
    create_user(&db, "cy@example.com", Role::Manager).await;

    let updated = repo
        .update(
            ada.id,
            &UserUpdate {
                name: Some("Ada Lovelace".into()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Ada Lovelace");
    assert!(!updated.is_active);
    assert_eq!(updated.role, Role::Admin);

    let inactive = repo
        .list(
            &UserFilter {
                is_active: Some(false),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(inactive.total, 1);
    assert_eq!(inactive.items[0].id, ada.id);

    let managers = repo
        .list(
            &UserFilter {
                role: Some(Role::Manager),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(managers.total, 1);

    let searched = repo
        .list(
            &UserFilter {
                search: Some("BOB".into()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(searched.total, 1);
    assert_eq!(searched.items[0].email, "bob@example.com");
}

#[tokio::test]
async fn record_login_sets_timestamp() {
    let (db, _container) = setup_test_db().await;
    let user = create_user(&db, "ada@example.com", Role::User).await;
    assert!(user.last_login_at.is_none());

    db.user_repo().record_login(user.id).await.unwrap();

    let reloaded = db.user_repo().get(user.id).await.unwrap().unwrap();
    assert!(reloaded.last_login_at.is_some());
}

#[tokio::test]
async fn product_list_paginates_newest_first() {
    let (db, _container) = setup_test_db().await;
    for i in 0..25 {
        create_product(&db, &format!("Item {i}"), &format!("SKU-{i:03}"), "5.00", 10).await;
    }

    let page = db
        .product_repo()
        .list(&ProductFilter::default(), PageRequest::new(Some(3), Some(10)))
        .await
        .unwrap();

    assert_eq!(page.total, 25);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(page.items.last().unwrap().name, "Item 0");

    let beyond = db
        .product_repo()
        .list(&ProductFilter::default(), PageRequest::new(Some(9), Some(10)))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 25);
}

#[tokio::test]
async fn product_filters_combine() {
    let (db, _container) = setup_test_db().await;
    create_product(&db, "Desk Lamp", "LAMP-1", "19.99", 3).await;
    create_product(&db, "Floor Lamp", "LAMP-2", "89.00", 40).await;
    create_product(&db, "Mug", "MUG-1", "4.50", 2).await;

    let repo = db.product_repo();

    let lamps = repo
        .list(
            &ProductFilter {
                search: Some("lamp".into()),
                max_price: Some(dec("50")),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(lamps.total, 1);
    assert_eq!(lamps.items[0].sku, "LAMP-1");

    let low = repo
        .list(
            &ProductFilter {
                low_stock: Some(5),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(low.total, 2);
}

#[tokio::test]
async fn product_update_is_partial() {
    let (db, _container) = setup_test_db().await;
    let product = create_product(&db, "Desk Lamp", "LAMP-1", "19.99", 3).await;

    let updated = db
        .product_repo()
        .update(
            product.id,
            &ProductUpdate {
                price: Some(dec("24.50")),
                status: Some(ProductStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.price, dec("24.50"));
    assert_eq!(updated.status, ProductStatus::Inactive);
    assert_eq!(updated.name, "Desk Lamp");
    assert_eq!(updated.stock, 3);
    assert!(updated.updated_at >= product.updated_at);
}

#[tokio::test]
async fn duplicate_sku_is_conflict() {
    let (db, _container) = setup_test_db().await;
    create_product(&db, "Desk Lamp", "LAMP-1", "19.99", 3).await;

    let err = db
        .product_repo()
        .create(&new_product("Other Lamp", "LAMP-1", "9.99", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn unknown_vendor_is_validation_error() {
    let (db, _container) = setup_test_db().await;
    let mut product = new_product("Desk Lamp", "LAMP-1", "19.99", 3);
    product.vendor_id = Some(uuid::Uuid::new_v4());

    let err = db.product_repo().create(&product).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn price_out_of_column_range_is_validation_error() {
    let (db, _container) = setup_test_db().await;

    let err = db
        .product_repo()
        .create(&new_product("Bank Vault", "VAULT-1", "99999999999", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg == "Numeric value out of range"));
}

#[tokio::test]
async fn delete_missing_returns_false() {
    let (db, _container) = setup_test_db().await;
    assert!(!db.product_repo().delete(uuid::Uuid::new_v4()).await.unwrap());
    assert!(db.product_repo().get(uuid::Uuid::new_v4()).await.unwrap().is_none());
}

fn address() -> Address {
    Address {
        street: "1 Main St".into(),
        city: "Springfield".into(),
        state: None,
        postal_code: Some("12345".into()),
        country: "US".into(),
    }
}

#[tokio::test]
async fn vendor_round_trips_address_and_commission() {
    let (db, _container) = setup_test_db().await;
    let repo = db.vendor_repo();

    let vendor = repo
        .create(&NewVendor {
            name: "Acme".into(),
            email: "sales@acme.test".into(),
            phone: None,
            company_name: Some("Acme Corp".into()),
            status: VendorStatus::Pending,
            commission_rate: dec("12.5"),
            address: Some(address()),
        })
        .await
        .unwrap();

    assert_eq!(vendor.commission_rate, dec("12.5"));
    assert_eq!(vendor.address, Some(address()));
    assert!(repo.exists(vendor.id).await.unwrap());

    let activated = repo
        .update(
            vendor.id,
            &VendorUpdate {
                status: Some(VendorStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(activated.status, VendorStatus::Active);
    assert_eq!(activated.company_name.as_deref(), Some("Acme Corp"));
}

#[tokio::test]
async fn customer_crud() {
    let (db, _container) = setup_test_db().await;
    let repo = db.customer_repo();

    let customer = repo
        .create(&NewCustomer {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            phone: Some("555-0100".into()),
            address: None,
            status: CustomerStatus::Active,
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            customer.id,
            &CustomerUpdate {
                address: Some(address()),
                status: Some(CustomerStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.address, Some(address()));
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));

    let inactive = repo
        .list(
            &CustomerFilter {
                status: Some(CustomerStatus::Inactive),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(inactive.total, 1);

    assert!(repo.delete(customer.id).await.unwrap());
    assert!(repo.get(customer.id).await.unwrap().is_none());
}
