use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money::cents_to_decimal;
use crate::domain::product::{
    Gender, Product as DomainProduct, ProductImage as DomainProductImage,
    ProductSpecification as DomainProductSpecification,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub gender: String,
    pub category_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub gender: &'a str,
    pub category_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub price_cents: Option<i64>,
    pub gender: Option<&'a str>,
    pub category_id: Option<Option<i32>>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image_url: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub image_url: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_specifications)]
pub struct ProductSpecification {
    pub id: i32,
    pub product_id: i32,
    pub key: String,
    pub value: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_specifications)]
pub struct NewProductSpecification {
    pub product_id: i32,
    pub key: String,
    pub value: String,
}

impl Product {
    pub fn into_domain(
        self,
        images: Vec<ProductImage>,
        specifications: Vec<ProductSpecification>,
    ) -> DomainProduct {
        DomainProduct {
            id: self.id,
            name: self.name,
            description: self.description,
            price: cents_to_decimal(self.price_cents),
            gender: Gender::from(self.gender),
            category_id: self.category_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            specifications: specifications.into_iter().map(Into::into).collect(),
            images: images.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ProductImage> for DomainProductImage {
    fn from(value: ProductImage) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            image_url: value.image_url,
        }
    }
}

impl From<ProductSpecification> for DomainProductSpecification {
    fn from(value: ProductSpecification) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            key: value.key,
            value: value.value,
        }
    }
}
