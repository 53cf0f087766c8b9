use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront::config::Config;
use storefront::handlers::{product_handlers, user_handlers};
use storefront::middleware::{AuthMiddleware, LoggingMiddleware};
use storefront::repository::{ProductRepository, UserRepository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let products = web::Data::new(ProductRepository::new(pool.clone()));
    let users = web::Data::new(UserRepository::new(pool));
    let config_data = web::Data::new(config.clone());
    let port = config.port;
    let secret = config.jwt_secret;

    info!(port, "starting server");

    HttpServer::new(move || {
        App::new()
            .app_data(products.clone())
            .app_data(users.clone())
            .app_data(config_data.clone())
            .wrap(AuthMiddleware::new(secret.clone()))
            .wrap(LoggingMiddleware)
            .configure(product_handlers::configure)
            .configure(user_handlers::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
