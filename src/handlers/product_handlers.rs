//! Product HTTP handlers.
//!
//! Listing and reads are public; create/update/delete require an
//! authenticated admin, enforced through the `Identity` extractor plus
//! the role gate before any repository call.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, RepositoryError};
use crate::middleware::auth::require_role;
use crate::models::{CreateProductRequest, Identity, Role, UpdateProductRequest};
use crate::pagination::{PageQuery, PageRequest, PaginatedProducts};
use crate::repository::ProductRepository;

/// Configure product routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/products")
            .service(list_products)
            .service(get_product)
            .service(create_product)
            .service(update_product)
            .service(delete_product),
    );
}

/// List products with optional search term and pagination.
#[get("")]
async fn list_products(
    repo: web::Data<ProductRepository>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = PageRequest::from_query(query.into_inner());
    let (products, total) = repo
        .search(request.search.as_deref(), request.skip(), request.limit as i64)
        .await?;

    Ok(HttpResponse::Ok().json(PaginatedProducts::new(products, &request, total)))
}

/// Get product by ID.
#[get("/{id}")]
async fn get_product(
    repo: web::Data<ProductRepository>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let product = repo.find_by_id(id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::ProductNotFound(id.to_string()),
        other => other.into(),
    })?;

    Ok(HttpResponse::Ok().json(product))
}

/// Create a product (admin only).
#[post("")]
async fn create_product(
    repo: web::Data<ProductRepository>,
    identity: Identity,
    body: web::Json<CreateProductRequest>,
) -> AppResult<HttpResponse> {
    require_role(Some(&identity), Role::Admin)?;

    let new = body.into_inner().validate().map_err(AppError::Validation)?;
    let product = repo.create(&new).await?;

    Ok(HttpResponse::Created().json(product))
}

/// Update a product (admin only).
#[put("/{id}")]
async fn update_product(
    repo: web::Data<ProductRepository>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> AppResult<HttpResponse> {
    require_role(Some(&identity), Role::Admin)?;

    let id = path.into_inner();
    let patch = body.into_inner().validate().map_err(AppError::Validation)?;
    let product = repo.update_by_id(id, &patch).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::ProductNotFound(id.to_string()),
        other => other.into(),
    })?;

    Ok(HttpResponse::Ok().json(product))
}

/// Delete a product (admin only).
#[delete("/{id}")]
async fn delete_product(
    repo: web::Data<ProductRepository>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_role(Some(&identity), Role::Admin)?;

    let id = path.into_inner();
    repo.delete_by_id(id).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::ProductNotFound(id.to_string()),
        other => other.into(),
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
