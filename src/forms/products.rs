use std::str::FromStr;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::money::MONEY_SCALE;
use crate::domain::product::{
    DEFAULT_PAGE_SIZE, Gender, NewProduct, ProductListQuery, UpdateProduct,
};
use crate::forms::{read_upload, sanitize_inline_text, sanitize_multiline_text};
use crate::image_store::UploadedImage;

/// Maximum allowed length for a product name.
const NAME_MAX_LEN: usize = 255;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Maximum allowed length for a product description.
const DESCRIPTION_MAX_LEN: usize = 1000;
const DESCRIPTION_MAX_LEN_VALIDATOR: u64 = DESCRIPTION_MAX_LEN as u64;

/// Prices may carry at most this many digits before the decimal point.
const PRICE_MAX_INTEGER_DIGITS: u32 = 8;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product forms and filters.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("invalid price `{value}`")]
    InvalidPrice { value: String },
    #[error("{field} must not be negative")]
    NegativePrice { field: &'static str },
    #[error("price `{value}` has more than 8 integer digits")]
    PriceTooLarge { value: String },
    #[error("invalid gender `{value}`, expected man, woman or unisex")]
    InvalidGender { value: String },
    /// Supplied identifier field could not be parsed.
    #[error("invalid {field} `{value}`")]
    InvalidIdentifier { field: &'static str, value: String },
    #[error("failed to read uploaded file: {0}")]
    Upload(#[from] std::io::Error),
}

/// Multipart body accepted when creating or replacing a product.
#[derive(Debug, MultipartForm)]
pub struct ProductMultipartForm {
    pub name: Text<String>,
    pub description: Option<Text<String>>,
    pub price: Text<String>,
    pub gender: Option<Text<String>>,
    pub category_id: Option<Text<String>>,
    /// JSON object of specification key/value pairs.
    pub specifications: Option<Text<String>>,
    /// Zero or more image files.
    pub product_images: Vec<TempFile>,
}

impl ProductMultipartForm {
    /// Load the uploaded files into memory, skipping untouched file inputs.
    pub fn into_form(self) -> ProductFormResult<ProductForm> {
        let mut images = Vec::with_capacity(self.product_images.len());
        for upload in self.product_images {
            if let Some(image) = read_upload(upload)? {
                images.push(image);
            }
        }

        Ok(ProductForm {
            name: self.name.into_inner(),
            description: self.description.map(Text::into_inner),
            price: self.price.into_inner(),
            gender: self.gender.map(Text::into_inner),
            category_id: self.category_id.map(Text::into_inner),
            specifications: self.specifications.map(Text::into_inner),
            images,
        })
    }
}

/// Product fields decoded from a request, still in their textual form.
#[derive(Debug, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    #[validate(length(max = DESCRIPTION_MAX_LEN_VALIDATOR))]
    pub description: Option<String>,
    pub price: String,
    pub gender: Option<String>,
    pub category_id: Option<String>,
    pub specifications: Option<String>,
    pub images: Vec<UploadedImage>,
}

impl ProductForm {
    /// Validates, sanitizes and parses the form.
    pub fn into_payload(self) -> ProductFormResult<ProductPayload> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        let description = self
            .description
            .as_deref()
            .map(sanitize_multiline_text)
            .filter(|value| !value.is_empty());

        let gender = match non_blank(self.gender) {
            Some(value) => {
                Gender::parse(&value).ok_or(ProductFormError::InvalidGender { value })?
            }
            None => Gender::default(),
        };

        let category_id = non_blank(self.category_id)
            .map(|value| parse_identifier("category_id", value))
            .transpose()?;

        Ok(ProductPayload {
            name,
            description,
            price: parse_price(&self.price)?,
            gender,
            category_id,
            specifications: non_blank(self.specifications),
            images: self.images,
        })
    }
}

/// Validated product payload.
#[derive(Debug, Clone)]
pub struct ProductPayload {
    pub name: String,
    pub description: Option<String>,
    /// Price rounded to two fraction digits.
    pub price: Decimal,
    pub gender: Gender,
    pub category_id: Option<i32>,
    /// Raw specification JSON; `None` when the field was absent or blank.
    pub specifications: Option<String>,
    pub images: Vec<UploadedImage>,
}

impl ProductPayload {
    pub fn new_product(&self) -> NewProduct {
        let mut product = NewProduct::new(self.name.clone(), self.price).with_gender(self.gender);
        if let Some(description) = self.description.as_ref() {
            product = product.with_description(description.clone());
        }
        if let Some(category_id) = self.category_id {
            product = product.with_category_id(category_id);
        }
        product
    }

    /// Patch assigning every field; absent optional fields are cleared.
    pub fn update_product(&self) -> UpdateProduct {
        UpdateProduct::new()
            .name(self.name.clone())
            .description(self.description.clone())
            .price(self.price)
            .gender(self.gender)
            .category_id(self.category_id)
    }
}

/// Query string accepted by the product listing.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProductFilterQuery {
    pub category_id: Option<i32>,
    pub gender: Option<Gender>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl ProductFilterQuery {
    /// Validates the filters and converts them into a repository query.
    pub fn into_list_query(self) -> ProductFormResult<ProductListQuery> {
        self.validate()?;

        let mut query = ProductListQuery::new().paginate(
            self.offset.unwrap_or(0),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        );

        if let Some(category_id) = self.category_id {
            query = query.category_id(category_id);
        }
        if let Some(gender) = self.gender {
            query = query.gender(gender);
        }
        if let Some(min_price) = self.min_price {
            if min_price.is_sign_negative() && !min_price.is_zero() {
                return Err(ProductFormError::NegativePrice { field: "min_price" });
            }
            query = query.min_price(min_price);
        }
        if let Some(max_price) = self.max_price {
            if max_price.is_sign_negative() && !max_price.is_zero() {
                return Err(ProductFormError::NegativePrice { field: "max_price" });
            }
            query = query.max_price(max_price);
        }
        if let Some(search) = self.search.as_deref().map(sanitize_inline_text)
            && !search.is_empty()
        {
            query = query.search(search);
        }

        Ok(query)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_identifier(field: &'static str, value: String) -> ProductFormResult<i32> {
    match value.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ProductFormError::InvalidIdentifier { field, value }),
    }
}

fn parse_price(raw: &str) -> ProductFormResult<Decimal> {
    let trimmed = raw.trim();
    let price = Decimal::from_str(trimmed).map_err(|_| ProductFormError::InvalidPrice {
        value: trimmed.to_string(),
    })?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(ProductFormError::NegativePrice { field: "price" });
    }

    if price.trunc() >= Decimal::from(10_i64.pow(PRICE_MAX_INTEGER_DIGITS)) {
        return Err(ProductFormError::PriceTooLarge {
            value: trimmed.to_string(),
        });
    }

    Ok(price.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::tests::temp_upload;

    fn form(price: &str) -> ProductForm {
        ProductForm {
            name: " Trail  Runner ".to_string(),
            description: Some("\n Light \n\n\n shoe \n".to_string()),
            price: price.to_string(),
            gender: None,
            category_id: None,
            specifications: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn sanitizes_and_defaults() {
        let payload = form("19.999").into_payload().expect("valid form");

        assert_eq!(payload.name, "Trail Runner");
        assert_eq!(payload.description.as_deref(), Some("Light\n\nshoe"));
        assert_eq!(payload.price, Decimal::new(2000, 2));
        assert_eq!(payload.gender, Gender::Unisex);
        assert_eq!(payload.category_id, None);
        assert!(payload.specifications.is_none());
    }

    #[test]
    fn parses_optional_fields() {
        let mut input = form("49.90");
        input.gender = Some("Woman".to_string());
        input.category_id = Some(" 7 ".to_string());
        input.specifications = Some(r#"{"color":"red"}"#.to_string());

        let payload = input.into_payload().expect("valid form");
        let new_product = payload.new_product();

        assert_eq!(new_product.gender, Gender::Woman);
        assert_eq!(new_product.category_id, Some(7));
        assert_eq!(payload.specifications.as_deref(), Some(r#"{"color":"red"}"#));
    }

    #[test]
    fn rejects_bad_prices() {
        assert!(matches!(
            form("abc").into_payload(),
            Err(ProductFormError::InvalidPrice { .. })
        ));
        assert!(matches!(
            form("-1").into_payload(),
            Err(ProductFormError::NegativePrice { field: "price" })
        ));
        assert!(matches!(
            form("100000000").into_payload(),
            Err(ProductFormError::PriceTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_unknown_gender_and_category() {
        let mut input = form("1");
        input.gender = Some("child".to_string());
        assert!(matches!(
            input.into_payload(),
            Err(ProductFormError::InvalidGender { .. })
        ));

        let mut input = form("1");
        input.category_id = Some("shoes".to_string());
        assert!(matches!(
            input.into_payload(),
            Err(ProductFormError::InvalidIdentifier { field: "category_id", .. })
        ));
    }

    #[test]
    fn update_clears_absent_optional_fields() {
        let update = form("5").into_payload().expect("valid form").update_product();

        assert_eq!(update.name.as_deref(), Some("Trail Runner"));
        assert_eq!(update.category_id, Some(None));
        assert_eq!(update.price, Some(Decimal::new(500, 2)));
    }

    #[test]
    fn multipart_form_skips_empty_file_inputs() {
        let form = ProductMultipartForm {
            name: Text("Sneaker".to_string()),
            description: None,
            price: Text("10".to_string()),
            gender: None,
            category_id: None,
            specifications: Some(Text("  ".to_string())),
            product_images: vec![
                temp_upload("a.png", "image/png", b"a"),
                temp_upload("", "application/octet-stream", b""),
                temp_upload("b.png", "image/png", b"b"),
            ],
        };

        let payload = form
            .into_form()
            .and_then(ProductForm::into_payload)
            .expect("valid form");

        assert_eq!(payload.images.len(), 2);
        assert!(payload.specifications.is_none());
    }

    #[test]
    fn filter_query_defaults_to_first_page() {
        let query = ProductFilterQuery::default()
            .into_list_query()
            .expect("valid query");

        assert_eq!(query, ProductListQuery::new());
    }

    #[test]
    fn filter_query_validates_bounds() {
        let too_large = ProductFilterQuery {
            limit: Some(101),
            ..Default::default()
        };
        assert!(matches!(
            too_large.into_list_query(),
            Err(ProductFormError::Validation(_))
        ));

        let negative = ProductFilterQuery {
            min_price: Some(Decimal::new(-1, 0)),
            ..Default::default()
        };
        assert!(matches!(
            negative.into_list_query(),
            Err(ProductFormError::NegativePrice { field: "min_price" })
        ));
    }

    #[test]
    fn filter_query_carries_filters() {
        let query = ProductFilterQuery {
            category_id: Some(3),
            gender: Some(Gender::Man),
            min_price: Some(Decimal::new(20, 0)),
            max_price: Some(Decimal::new(55, 0)),
            search: Some("  runner ".to_string()),
            offset: Some(40),
            limit: Some(10),
        }
        .into_list_query()
        .expect("valid query");

        assert_eq!(query.category_id, Some(3));
        assert_eq!(query.gender, Some(Gender::Man));
        assert_eq!(query.search.as_deref(), Some("runner"));
        assert_eq!((query.offset, query.limit), (40, 10));
    }
}
