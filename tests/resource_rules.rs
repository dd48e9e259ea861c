use chrono::Utc;
use ecommerce_backoffice::{
    dto::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    entity::{customers, products, reviews, shipping_addresses},
    validation::ValidationErrors,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;
use validator::Validate;

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn product(price: i64, discount: f64, stock: i32) -> products::Model {
    products::Model {
        id: Uuid::new_v4(),
        name: "Ferris Mug".into(),
        description: None,
        price,
        discount,
        stock,
        category_id: None,
        created_at: now(),
        updated_at: now(),
    }
}

fn customer(email: &str, phone: Option<&str>) -> customers::Model {
    customers::Model {
        id: Uuid::new_v4(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: email.into(),
        phone_number: phone.map(str::to_string),
        address: None,
        password_hash: String::new(),
        created_at: now(),
        updated_at: now(),
    }
}

fn errors_of(result: Result<(), validator::ValidationErrors>) -> ValidationErrors {
    result.map_err(ValidationErrors::from).err().unwrap_or_default()
}

#[test]
fn product_bounds() {
    assert!(product(0, 0.0, 0).validate().is_ok());
    assert!(product(1200, 75.0, 3).validate().is_ok());

    let errors = errors_of(product(-1, 76.0, -2).validate());
    assert!(errors.contains("price"));
    assert!(errors.contains("discount"));
    assert!(errors.contains("stock"));
    assert_eq!(
        errors.get("discount").map(|e| e.message.as_str()),
        Some("Path `discount` (76) is more than maximum allowed value (75).")
    );
}

#[test]
fn blank_names_are_rejected() {
    let mut p = product(1, 0.0, 1);
    p.name = "   ".into();
    let errors = errors_of(p.validate());
    assert_eq!(
        errors.get("name").map(|e| e.message.as_str()),
        Some("Path `name` is required.")
    );
}

#[test]
fn contact_email_must_be_present_and_valid() {
    assert!(customer("ada@example.com", None).validate().is_ok());

    let errors = errors_of(customer("", None).validate());
    assert_eq!(
        errors.get("email").map(|e| e.message.as_str()),
        Some("email is required")
    );
    assert_eq!(errors.errors.len(), 1);

    let errors = errors_of(customer("ada", None).validate());
    assert_eq!(
        errors.get("email").map(|e| e.message.as_str()),
        Some("ada is not a valid email!")
    );

    let errors = errors_of(customer("ada@example.com", Some("123")).validate());
    assert!(errors.contains("phoneNumber"));
}

#[test]
fn review_rating_range() {
    let mut review = reviews::Model {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        customer_id: None,
        rating: 5,
        comment: None,
        created_at: now(),
        updated_at: now(),
    };
    assert!(review.validate().is_ok());
    review.rating = 0;
    assert!(errors_of(review.validate()).contains("rating"));
    review.rating = 6;
    assert!(errors_of(review.validate()).contains("rating"));
}

#[test]
fn shipping_address_needs_name_and_address() {
    let address = shipping_addresses::Model {
        id: Uuid::new_v4(),
        customer_id: None,
        full_name: String::new(),
        phone_number: Some(String::new()),
        address: " ".into(),
        created_at: now(),
        updated_at: now(),
    };
    let errors = errors_of(address.validate());
    assert!(errors.contains("fullName"));
    assert!(errors.contains("address"));
    // a present but empty phone is still checked
    assert!(errors.contains("phoneNumber"));
}

#[test]
fn short_password_is_rejected_without_echoing_it() {
    let register = CreateCustomerRequest {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        phone_number: None,
        address: None,
        password: "12345".into(),
    };
    let errors = errors_of(register.validate());
    let err = errors.get("password").expect("password error");
    assert_eq!(err.message, "password must be at least 6 characters");
    assert!(err.value.is_none());

    let patch = UpdateCustomerRequest {
        password: Some("123456".into()),
        ..Default::default()
    };
    assert!(patch.validate().is_ok());
    assert!(UpdateCustomerRequest::default().validate().is_ok());
}
