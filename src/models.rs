//! Domain models
//!
//! Typed structs for products, users and identities, plus the request
//! bodies accepted at the HTTP boundary. Request bodies use optional
//! fields so that missing or out-of-domain values surface as field-level
//! validation messages instead of opaque deserialization failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FieldError;

/// Closed set of product categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Electronics,
    #[serde(rename = "Clothing & Accessories")]
    ClothingAccessories,
    #[serde(rename = "Books & Stationery")]
    BooksStationery,
    Clothing,
    Sports,
    Home,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::ClothingAccessories,
        Category::BooksStationery,
        Category::Clothing,
        Category::Sports,
        Category::Home,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::ClothingAccessories => "Clothing & Accessories",
            Category::BooksStationery => "Books & Stationery",
            Category::Clothing => "Clothing",
            Category::Sports => "Sports",
            Category::Home => "Home",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role. Exact match only; no hierarchy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Regular,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Regular => "regular",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "regular" => Some(Role::Regular),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Product model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub quantity: i64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User model. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Compare a candidate password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// An authenticated caller: the user record minus the credential secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Identity {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// JWT claims. `sub` carries the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Validated data for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub quantity: i64,
    pub image: Option<String>,
}

/// Create product request. Fields are optional so validation can report
/// every problem at once.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub image: Option<String>,
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() {
            errors.push(FieldError::new("name", "Product name is required"));
        }

        let category = match self.category.as_deref() {
            None | Some("") => {
                errors.push(FieldError::new("category", "Product category is required"));
                None
            }
            Some(raw) => match Category::parse(raw) {
                Some(c) => Some(c),
                None => {
                    errors.push(FieldError::new(
                        "category",
                        format!("{raw} is not a valid category"),
                    ));
                    None
                }
            },
        };

        let price = match self.price {
            None => {
                errors.push(FieldError::new("price", "Product price is required"));
                None
            }
            Some(p) if !p.is_finite() || p < 0.0 => {
                errors.push(FieldError::new("price", "Price must be a positive number"));
                None
            }
            Some(p) => Some(p),
        };

        // Absent quantity defaults to 0; a present one must be a
        // non-negative integer.
        let quantity = match self.quantity {
            None => Some(0),
            Some(q) if !q.is_finite() || q.fract() != 0.0 => {
                errors.push(FieldError::new("quantity", "Quantity must be an integer"));
                None
            }
            Some(q) if q < 0.0 => {
                errors.push(FieldError::new("quantity", "Quantity cannot be negative"));
                None
            }
            Some(q) => Some(q as i64),
        };

        let image = match self.image {
            Some(url) if !url.is_empty() => {
                if is_valid_image_url(&url) {
                    Some(url)
                } else {
                    errors.push(FieldError::new("image", "Image must be a valid URL"));
                    None
                }
            }
            _ => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewProduct {
            name: name.to_string(),
            description: self.description.unwrap_or_default(),
            // Unwraps guarded by the errors check above.
            category: category.unwrap(),
            price: price.unwrap(),
            quantity: quantity.unwrap(),
            image,
        })
    }
}

/// Validated partial update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub image: Option<String>,
}

/// Update product request. Only supplied fields are validated.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
    pub image: Option<String>,
}

impl UpdateProductRequest {
    pub fn validate(self) -> Result<ProductPatch, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut patch = ProductPatch::default();

        if let Some(name) = self.name {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                errors.push(FieldError::new("name", "Product name is required"));
            } else {
                patch.name = Some(trimmed.to_string());
            }
        }

        patch.description = self.description;

        if let Some(raw) = self.category {
            match Category::parse(&raw) {
                Some(c) => patch.category = Some(c),
                None => errors.push(FieldError::new(
                    "category",
                    format!("{raw} is not a valid category"),
                )),
            }
        }

        if let Some(p) = self.price {
            if !p.is_finite() || p < 0.0 {
                errors.push(FieldError::new("price", "Price must be a positive number"));
            } else {
                patch.price = Some(p);
            }
        }

        if let Some(q) = self.quantity {
            if !q.is_finite() || q.fract() != 0.0 {
                errors.push(FieldError::new("quantity", "Quantity must be an integer"));
            } else if q < 0.0 {
                errors.push(FieldError::new("quantity", "Quantity cannot be negative"));
            } else {
                patch.quantity = Some(q as i64);
            }
        }

        if let Some(url) = self.image {
            if url.is_empty() || is_valid_image_url(&url) {
                patch.image = Some(url);
            } else {
                errors.push(FieldError::new("image", "Image must be a valid URL"));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(patch)
    }
}

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Validated signup data.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl SignupRequest {
    pub fn validate(self) -> Result<NewUser, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() {
            errors.push(FieldError::new("name", "User name is required"));
        }

        let email = self.email.as_deref().map(str::trim).unwrap_or("");
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !is_valid_email(email) {
            errors.push(FieldError::new("email", "Please enter a valid email"));
        }

        let password = self.password.as_deref().unwrap_or("");
        if password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        } else if password.len() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }

        let role = match self.role.as_deref() {
            None | Some("") => Role::Regular,
            Some(raw) => match Role::parse(raw) {
                Some(r) => r,
                None => {
                    errors.push(FieldError::new("role", format!("{raw} is not a valid role")));
                    Role::Regular
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        })
    }
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login/signup response: identity plus the credential token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// Image URLs must be absolute http(s) URLs.
fn is_valid_image_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Loose email shape check: something@something.something
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
