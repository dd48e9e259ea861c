use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use ecommerce_backoffice::{
    config::AppConfig,
    db::{Db, run_migrations},
    entity::{categories, customers, employees, products, sizes},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let db = Db::connect(&config.database_url, config.db_retry.clone()).await?;
    let conn = db.conn();
    // Ensure migrations are applied.
    run_migrations(&*conn).await?;

    let employee_id = ensure_employee(&*conn, "clerk@example.com", "clerk123").await?;
    let customer_id = ensure_customer(&*conn, "buyer@example.com", "buyer123").await?;
    let category_id = ensure_category(&*conn, "Apparel").await?;
    seed_sizes(&*conn).await?;
    seed_products(&*conn, category_id).await?;

    println!("Seed completed. Employee ID: {employee_id}, Customer ID: {customer_id}");
    Ok(())
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

async fn ensure_employee(
    conn: &DatabaseConnection,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = employees::Entity::find()
        .filter(employees::Column::Email.eq(email))
        .one(conn)
        .await?
    {
        println!("Employee {email} already present");
        return Ok(existing.id);
    }

    let model = employees::Model {
        id: Uuid::new_v4(),
        first_name: "Store".into(),
        last_name: "Clerk".into(),
        email: email.into(),
        phone_number: Some("0912345678".into()),
        address: None,
        password_hash: hash_password(password)?,
        created_at: now(),
        updated_at: now(),
    };
    let employee = employees::ActiveModel::from(model)
        .reset_all()
        .insert(conn)
        .await?;

    println!("Ensured employee {email}");
    Ok(employee.id)
}

async fn ensure_customer(
    conn: &DatabaseConnection,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = customers::Entity::find()
        .filter(customers::Column::Email.eq(email))
        .one(conn)
        .await?
    {
        println!("Customer {email} already present");
        return Ok(existing.id);
    }

    let model = customers::Model {
        id: Uuid::new_v4(),
        first_name: "Sample".into(),
        last_name: "Buyer".into(),
        email: email.into(),
        phone_number: None,
        address: Some("12 Market Street".into()),
        password_hash: hash_password(password)?,
        created_at: now(),
        updated_at: now(),
    };
    let customer = customers::ActiveModel::from(model)
        .reset_all()
        .insert(conn)
        .await?;

    println!("Ensured customer {email}");
    Ok(customer.id)
}

async fn ensure_category(conn: &DatabaseConnection, name: &str) -> anyhow::Result<Uuid> {
    if let Some(existing) = categories::Entity::find()
        .filter(categories::Column::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }

    let model = categories::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        created_at: now(),
        updated_at: now(),
    };
    let category = categories::ActiveModel::from(model)
        .reset_all()
        .insert(conn)
        .await?;
    Ok(category.id)
}

async fn seed_sizes(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for name in ["S", "M", "L", "XL"] {
        let exists = sizes::Entity::find()
            .filter(sizes::Column::Name.eq(name))
            .one(conn)
            .await?
            .is_some();
        if exists {
            continue;
        }
        let model = sizes::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            created_at: now(),
            updated_at: now(),
        };
        sizes::ActiveModel::from(model).reset_all().insert(conn).await?;
    }

    println!("Seeded sizes");
    Ok(())
}

async fn seed_products(conn: &DatabaseConnection, category_id: Uuid) -> anyhow::Result<()> {
    let catalog = vec![
        ("Linen Shirt", "Breathable summer shirt", 450000, 10.0, 40),
        ("Denim Jacket", "Washed blue denim", 890000, 0.0, 15),
        ("Canvas Tote", "Everyday carry bag", 150000, 25.0, 120),
        ("Wool Scarf", "Merino blend", 320000, 5.0, 60),
    ];

    for (name, desc, price, discount, stock) in catalog {
        let exists = products::Entity::find()
            .filter(products::Column::Name.eq(name))
            .one(conn)
            .await?
            .is_some();
        if exists {
            continue;
        }
        let model = products::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            description: Some(desc.into()),
            price,
            discount,
            stock,
            category_id: Some(category_id),
            created_at: now(),
            updated_at: now(),
        };
        products::ActiveModel::from(model)
            .reset_all()
            .insert(conn)
            .await?;
    }

    println!("Seeded products");
    Ok(())
}
