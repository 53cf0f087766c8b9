//! Wipe and repopulate the catalog with sample products and two users
//! (one admin, one regular). Intended for development databases.

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use storefront::config::Config;
use storefront::models::Category;

struct SampleProduct {
    name: &'static str,
    description: &'static str,
    category: Category,
    price: f64,
    quantity: i64,
    image: &'static str,
}

const SAMPLE_PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Wireless Mouse",
        description: "Ergonomic wireless mouse with long battery life",
        category: Category::Electronics,
        price: 25.99,
        quantity: 100,
        image: "https://images.unsplash.com/photo-1587825140708-dfaf72ae4b04?auto=format&fit=crop&w=500&q=80",
    },
    SampleProduct {
        name: "Running Shoes",
        description: "Lightweight and breathable shoes for everyday running",
        category: Category::Sports,
        price: 59.99,
        quantity: 50,
        image: "https://images.unsplash.com/photo-1600180758890-6e0e1d5e22f6?auto=format&fit=crop&w=500&q=80",
    },
    SampleProduct {
        name: "Bluetooth Headphones",
        description: "Noise-cancelling over-ear headphones with deep bass",
        category: Category::Electronics,
        price: 79.99,
        quantity: 40,
        image: "https://images.unsplash.com/photo-1585386959984-a4155228d3ec?auto=format&fit=crop&w=500&q=80",
    },
    SampleProduct {
        name: "Classic Novel",
        description: "A timeless literary classic that belongs on every bookshelf",
        category: Category::BooksStationery,
        price: 14.5,
        quantity: 200,
        image: "https://images.unsplash.com/photo-1512820790803-83ca734da794?auto=format&fit=crop&w=500&q=80",
    },
    SampleProduct {
        name: "Denim Jacket",
        description: "Stylish unisex denim jacket perfect for layering",
        category: Category::Clothing,
        price: 45.0,
        quantity: 30,
        image: "https://images.unsplash.com/photo-1618354691417-e0b27f2cdb06?auto=format&fit=crop&w=500&q=80",
    },
];

const SAMPLE_USERS: &[(&str, &str, &str, &str)] = &[
    ("Admin User", "admin@example.com", "123456", "admin"),
    ("Test User", "test@example.com", "123456", "regular"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    sqlx::query("DELETE FROM products").execute(&pool).await?;
    info!("existing products deleted");

    for product in SAMPLE_PRODUCTS {
        sqlx::query(
            "INSERT INTO products (id, name, description, category, price, quantity, image, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.description)
        .bind(product.category.as_str())
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.image)
        .execute(&pool)
        .await?;
    }
    info!(count = SAMPLE_PRODUCTS.len(), "sample products inserted");

    sqlx::query("DELETE FROM users").execute(&pool).await?;
    info!("existing users cleared");

    for (name, email, password, role) in SAMPLE_USERS {
        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(hash)
        .bind(role)
        .execute(&pool)
        .await?;
    }
    info!(count = SAMPLE_USERS.len(), "sample users inserted");

    Ok(())
}
