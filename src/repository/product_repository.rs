//! Product repository
//!
//! Listing with search + skip/limit, plus CRUD. The search filter matches
//! the term as a case-insensitive substring of the name OR the description
//! (`ILIKE '%term%'`); listing order is insertion order (`created_at, id`).

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::errors::{RepoResult, RepositoryError};
use crate::models::{Category, NewProduct, Product, ProductPatch};

const PRODUCT_COLUMNS: &str = "id, name, description, category, price, quantity, image, created_at";

pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Page of matching products plus the total matching count.
    pub async fn search(
        &self,
        term: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> RepoResult<(Vec<Product>, i64)> {
        match term.filter(|t| !t.is_empty()) {
            Some(term) => {
                let pattern = search_pattern(term);
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM products WHERE name ILIKE $1 OR description ILIKE $1",
                )
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

                let rows = sqlx::query(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products \
                     WHERE name ILIKE $1 OR description ILIKE $1 \
                     ORDER BY created_at, id LIMIT $2 OFFSET $3"
                ))
                .bind(&pattern)
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?;

                Ok((collect_products(rows)?, total))
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
                    .fetch_one(&self.pool)
                    .await?;

                let rows = sqlx::query(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products \
                     ORDER BY created_at, id LIMIT $1 OFFSET $2"
                ))
                .bind(limit)
                .bind(skip)
                .fetch_all(&self.pool)
                .await?;

                Ok((collect_products(rows)?, total))
            }
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> RepoResult<Product> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        product_from_row(&row)
    }

    pub async fn create(&self, new: &NewProduct) -> RepoResult<Product> {
        let row = sqlx::query(&format!(
            "INSERT INTO products (id, name, description, category, price, quantity, image, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.category.as_str())
        .bind(new.price)
        .bind(new.quantity)
        .bind(&new.image)
        .fetch_one(&self.pool)
        .await?;

        product_from_row(&row)
    }

    /// Partial update; absent patch fields keep their stored values.
    pub async fn update_by_id(&self, id: Uuid, patch: &ProductPatch) -> RepoResult<Product> {
        let row = sqlx::query(&format!(
            "UPDATE products SET \
               name = COALESCE($2, name), \
               description = COALESCE($3, description), \
               category = COALESCE($4, category), \
               price = COALESCE($5, price), \
               quantity = COALESCE($6, quantity), \
               image = COALESCE($7, image) \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.price)
        .bind(patch.quantity)
        .bind(&patch.image)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        product_from_row(&row)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// `%term%` with LIKE metacharacters escaped, so the term is always a
/// literal substring match.
fn search_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn collect_products(rows: Vec<PgRow>) -> RepoResult<Vec<Product>> {
    rows.iter().map(product_from_row).collect()
}

fn product_from_row(row: &PgRow) -> RepoResult<Product> {
    let raw_category: String = row.get("category");
    let category =
        Category::parse(&raw_category).ok_or_else(|| RepositoryError::Decode {
            column: "category",
            value: raw_category,
        })?;

    Ok(Product {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        category,
        price: row.get("price"),
        quantity: row.get("quantity"),
        image: row.get("image"),
        created_at: row.get("created_at"),
    })
}
