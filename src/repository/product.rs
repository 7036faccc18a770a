use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde_json::Value;

use crate::db::unicode_lower;
use crate::domain::money::{decimal_to_cents, lower_bound_cents, upper_bound_cents};
use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductListQuery,
    UpdateProduct as DomainUpdateProduct,
};
use crate::image_store::UploadedImage;
use crate::models::product::{
    NewProduct as DbNewProduct, NewProductImage as DbNewProductImage,
    NewProductSpecification as DbNewProductSpecification, Product as DbProduct,
    ProductImage as DbProductImage, ProductSpecification as DbProductSpecification,
    UpdateProduct as DbUpdateProduct,
};
use crate::repository::{
    DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult,
};

/// Folder below the media root holding the images of one product.
pub fn product_image_folder(product_id: i32) -> String {
    format!("products/product_{product_id}")
}

impl ProductReader for DieselRepository {
    fn get_product_by_id(&mut self, id: i32) -> RepositoryResult<DomainProduct> {
        load_product(self.conn(), id)
    }

    fn list_products(&mut self, query: &ProductListQuery) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        let conn = self.conn();

        let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(category_id) = query.category_id {
            items = items.filter(products::category_id.eq(category_id));
        }

        if let Some(gender) = query.gender {
            items = items.filter(products::gender.eq(gender.as_str()));
        }

        if let Some(min_price) = query.min_price {
            let cents = lower_bound_cents(min_price).ok_or_else(|| {
                RepositoryError::InvalidFormat(format!("min_price {min_price} is out of range"))
            })?;
            items = items.filter(products::price_cents.ge(cents));
        }

        if let Some(max_price) = query.max_price {
            let cents = upper_bound_cents(max_price).ok_or_else(|| {
                RepositoryError::InvalidFormat(format!("max_price {max_price} is out of range"))
            })?;
            items = items.filter(products::price_cents.le(cents));
        }

        if let Some(term) = query.search.as_ref() {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            items = items.filter(unicode_lower(products::name).like(pattern).escape('\\'));
        }

        let db_products = items
            .order(products::id.asc())
            .offset(query.offset)
            .limit(query.limit)
            .load::<DbProduct>(conn)?;

        with_children(conn, db_products)
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&mut self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let price_cents = to_price_cents(new_product.price)?;
        let db_new = DbNewProduct {
            name: new_product.name.as_str(),
            description: new_product.description.as_deref(),
            price_cents,
            gender: new_product.gender.as_str(),
            category_id: new_product.category_id,
            created_at: new_product.created_at,
            updated_at: new_product.created_at,
        };

        let created = diesel::insert_into(products::table)
            .values(&db_new)
            .get_result::<DbProduct>(self.conn())?;

        Ok(created.into_domain(Vec::new(), Vec::new()))
    }

    fn create_images(&mut self, image_paths: &[String], product_id: i32) -> RepositoryResult<()> {
        use crate::schema::product_images;

        if image_paths.is_empty() {
            return Ok(());
        }

        let rows: Vec<DbNewProductImage> = image_paths
            .iter()
            .map(|path| DbNewProductImage {
                product_id,
                image_url: path.as_str(),
            })
            .collect();

        diesel::insert_into(product_images::table)
            .values(&rows)
            .execute(self.conn())?;

        Ok(())
    }

    fn add_specifications(
        &mut self,
        specifications: &str,
        product_id: i32,
    ) -> RepositoryResult<()> {
        use crate::schema::product_specifications;

        let rows: Vec<DbNewProductSpecification> = parse_specifications(specifications)?
            .into_iter()
            .map(|(key, value)| DbNewProductSpecification {
                product_id,
                key,
                value,
            })
            .collect();

        if rows.is_empty() {
            return Ok(());
        }

        diesel::insert_into(product_specifications::table)
            .values(&rows)
            .execute(self.conn())?;

        Ok(())
    }

    fn update_product(
        &mut self,
        product_id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let price_cents = updates.price.map(to_price_cents).transpose()?;
        let db_updates = DbUpdateProduct {
            name: updates.name.as_deref(),
            description: updates
                .description
                .as_ref()
                .map(|description| description.as_deref()),
            price_cents,
            gender: updates.gender.map(|gender| gender.as_str()),
            category_id: updates.category_id,
            updated_at: updates.updated_at,
        };

        let conn = self.conn();

        diesel::update(products::table.find(product_id))
            .set(&db_updates)
            .execute(conn)
            .map_err(RepositoryError::from)
            .and_then(|updated| match updated {
                0 => Err(RepositoryError::NotFound),
                _ => Ok(()),
            })?;

        load_product(conn, product_id)
    }

    fn update_product_images(
        &mut self,
        product: &DomainProduct,
        uploads: &[UploadedImage],
    ) -> RepositoryResult<Vec<String>> {
        let saved = self
            .images
            .save_all(&product_image_folder(product.id), uploads)?;

        match self.replace_image_rows(product.id, &saved) {
            Ok(existing) => {
                for path in existing {
                    self.discard_image(path);
                }
                Ok(saved)
            }
            Err(err) => {
                self.images.delete_all(&saved);
                Err(err)
            }
        }
    }

    fn update_product_specifications(
        &mut self,
        product: &DomainProduct,
        specifications: &str,
    ) -> RepositoryResult<()> {
        use crate::schema::product_specifications;

        let conn = self.conn();

        diesel::delete(
            product_specifications::table
                .filter(product_specifications::product_id.eq(product.id)),
        )
        .execute(conn)?;
        touch_product(conn, product.id)?;

        if specifications.trim().is_empty() {
            return Ok(());
        }

        self.add_specifications(specifications, product.id)
    }

    fn delete_product(&mut self, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::products;

        let product = load_product(self.conn(), product_id)?;

        self.update_product_images(&product, &[])?;
        self.update_product_specifications(&product, "")?;

        let deleted = diesel::delete(products::table.find(product_id)).execute(self.conn())?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

impl DieselRepository {
    /// Swap the image rows of a product for `paths`, returning the old paths.
    fn replace_image_rows(
        &mut self,
        product_id: i32,
        paths: &[String],
    ) -> RepositoryResult<Vec<String>> {
        use crate::schema::product_images;

        let existing = product_images::table
            .filter(product_images::product_id.eq(product_id))
            .select(product_images::image_url)
            .load::<String>(self.conn())?;

        diesel::delete(product_images::table.filter(product_images::product_id.eq(product_id)))
            .execute(self.conn())?;
        touch_product(self.conn(), product_id)?;

        self.create_images(paths, product_id)?;

        Ok(existing)
    }
}

fn to_price_cents(price: rust_decimal::Decimal) -> RepositoryResult<i64> {
    decimal_to_cents(price)
        .ok_or_else(|| RepositoryError::InvalidFormat(format!("price {price} is out of range")))
}

/// Escape the `LIKE` wildcards so the term only matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn touch_product(conn: &mut SqliteConnection, product_id: i32) -> RepositoryResult<()> {
    use crate::schema::products;

    diesel::update(products::table.find(product_id))
        .set(products::updated_at.eq(chrono::Local::now().naive_utc()))
        .execute(conn)?;

    Ok(())
}

fn load_product(conn: &mut SqliteConnection, product_id: i32) -> RepositoryResult<DomainProduct> {
    use crate::schema::products;

    let product = products::table
        .find(product_id)
        .first::<DbProduct>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

    with_children(conn, vec![product])?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

fn with_children(
    conn: &mut SqliteConnection,
    db_products: Vec<DbProduct>,
) -> RepositoryResult<Vec<DomainProduct>> {
    use crate::schema::{product_images, product_specifications};

    if db_products.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<i32> = db_products.iter().map(|product| product.id).collect();

    let mut images: HashMap<i32, Vec<DbProductImage>> = HashMap::new();
    for image in product_images::table
        .filter(product_images::product_id.eq_any(&product_ids))
        .order(product_images::id.asc())
        .load::<DbProductImage>(conn)?
    {
        images.entry(image.product_id).or_default().push(image);
    }

    let mut specifications: HashMap<i32, Vec<DbProductSpecification>> = HashMap::new();
    for specification in product_specifications::table
        .filter(product_specifications::product_id.eq_any(&product_ids))
        .order(product_specifications::id.asc())
        .load::<DbProductSpecification>(conn)?
    {
        specifications
            .entry(specification.product_id)
            .or_default()
            .push(specification);
    }

    Ok(db_products
        .into_iter()
        .map(|product| {
            let id = product.id;
            product.into_domain(
                images.remove(&id).unwrap_or_default(),
                specifications.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

/// Parse a JSON object of specification pairs.
///
/// String values are kept verbatim; numbers and booleans are stored using
/// their JSON text.
fn parse_specifications(raw: &str) -> RepositoryResult<Vec<(String, String)>> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|err| RepositoryError::InvalidFormat(format!("specifications: {err}")))?;

    let Value::Object(entries) = parsed else {
        return Err(RepositoryError::InvalidFormat(
            "specifications must be a JSON object".to_string(),
        ));
    };

    entries
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key, text)),
            Value::Number(number) => Ok((key, number.to_string())),
            Value::Bool(flag) => Ok((key, flag.to_string())),
            _ => Err(RepositoryError::InvalidFormat(format!(
                "specification `{key}` must be a string, number or boolean"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_object() {
        let mut pairs = parse_specifications(r#"{"color":"red","size":"M","weight":1.5,"vegan":true}"#)
            .expect("valid specifications");
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                ("color".to_string(), "red".to_string()),
                ("size".to_string(), "M".to_string()),
                ("vegan".to_string(), "true".to_string()),
                ("weight".to_string(), "1.5".to_string()),
            ]
        );
    }

    #[test]
    fn empty_object_yields_no_pairs() {
        assert!(parse_specifications("{}").expect("valid").is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        let result = parse_specifications("{color: red");

        assert!(matches!(result, Err(RepositoryError::InvalidFormat(_))));
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(matches!(
            parse_specifications(r#"["color","red"]"#),
            Err(RepositoryError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_specifications(r#"{"dimensions":{"w":1}}"#),
            Err(RepositoryError::InvalidFormat(_))
        ));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\tmp"), "c:\\\\tmp");
        assert_eq!(escape_like("обувь"), "обувь");
    }

    #[test]
    fn product_folder_is_per_product() {
        assert_eq!(product_image_folder(42), "products/product_42");
    }
}
