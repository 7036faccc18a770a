use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default number of products returned by one listing page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Audience a product is designed for.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Man,
    Woman,
    #[default]
    Unisex,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Man => "man",
            Gender::Woman => "woman",
            Gender::Unisex => "unisex",
        }
    }

    /// Parse the stored/wire representation, ignoring surrounding whitespace and case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "man" => Some(Gender::Man),
            "woman" => Some(Gender::Woman),
            "unisex" => Some(Gender::Unisex),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Gender> for &'static str {
    fn from(value: Gender) -> Self {
        value.as_str()
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Gender::parse(&value).unwrap_or_else(|| {
            log::warn!("Unknown stored gender `{value}`, using unisex");
            Gender::default()
        })
    }
}

/// Image attached to a product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    /// Relative `media/...` path of the stored file.
    pub image_url: String,
}

/// Free-form key/value attribute of a product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProductSpecification {
    pub id: i32,
    pub product_id: i32,
    pub key: String,
    pub value: String,
}

/// Domain representation of a product together with its child collections.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Optional longer description shown to users.
    pub description: Option<String>,
    /// Price with two fraction digits.
    pub price: Decimal,
    pub gender: Gender,
    /// Category the product is listed under; cleared when the category is deleted.
    pub category_id: Option<i32>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last mutation of the product or its children.
    pub updated_at: NaiveDateTime,
    pub specifications: Vec<ProductSpecification>,
    pub images: Vec<ProductImage>,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub gender: Gender,
    pub category_id: Option<i32>,
    /// Timestamp captured when the product payload was created.
    pub created_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new product payload with the supplied details and current timestamp.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            gender: Gender::default(),
            category_id: None,
            created_at: chrono::Local::now().naive_utc(),
        }
    }

    /// Attach a descriptive text to the product payload.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Place the product in a category.
    pub fn with_category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Patch data applied when updating an existing product.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    /// Optional name update.
    pub name: Option<String>,
    /// Optional description update; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// Optional price update.
    pub price: Option<Decimal>,
    pub gender: Option<Gender>,
    /// Optional category update; `Some(None)` detaches the product.
    pub category_id: Option<Option<i32>>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        Self {
            name: None,
            description: None,
            price: None,
            gender: None,
            category_id: None,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = Some(description.map(|value| value.into()));
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn category_id(mut self, category_id: Option<i32>) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Filters applied when listing products.
///
/// Every populated field narrows the result; unset fields impose no
/// constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListQuery {
    pub category_id: Option<i32>,
    pub gender: Option<Gender>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring matched against the product name.
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for ProductListQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductListQuery {
    /// Construct a query matching every product on the first page.
    pub fn new() -> Self {
        Self {
            category_id: None,
            gender: None,
            min_price: None,
            max_price: None,
            search: None,
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn min_price(mut self, price: Decimal) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn max_price(mut self, price: Decimal) -> Self {
        self.max_price = Some(price);
        self
    }

    /// Filter results by a search term applied to the name.
    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }

    /// Select the window of results, clamping the page size to [`MAX_PAGE_SIZE`].
    pub fn paginate(mut self, offset: i64, limit: i64) -> Self {
        self.offset = offset.max(0);
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_gender_round_trips() {
        assert_eq!(Gender::from("woman".to_string()), Gender::Woman);
        assert_eq!(Gender::from("man".to_string()), Gender::Man);
    }

    #[test]
    fn unknown_stored_gender_falls_back_to_unisex() {
        assert_eq!(Gender::from("alien".to_string()), Gender::Unisex);
    }
}
