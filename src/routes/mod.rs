use actix_multipart::MultipartError;
use actix_multipart::form::MultipartFormConfig;
use actix_multipart::form::text::TextConfig;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Scope, web};
use serde_json::json;

use crate::db::DbPool;
use crate::image_store::ImageStore;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, ServiceResult};

pub mod categories;
pub mod products;

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) | ServiceError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::InvalidMediaType(_) | ServiceError::Persistence(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ServiceError::Persistence(details) = self {
            log::warn!("Request rolled back: {details}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

/// Run `action` on a blocking thread against a repository holding a fresh
/// transaction.
///
/// The transaction is rolled back when `action` returns without committing.
pub async fn with_repository<T, F>(
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
    action: F,
) -> ServiceResult<T>
where
    F: FnOnce(&mut DieselRepository, &ImageStore) -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(move || {
        let mut repo = DieselRepository::begin(&pool, images.get_ref().clone())?;
        action(&mut repo, &images)
    })
    .await?
}

/// Every catalog endpoint mounted under `/products`.
pub fn catalog_scope(max_upload_bytes: usize) -> Scope {
    web::scope("/products")
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(
            MultipartFormConfig::default()
                .total_limit(max_upload_bytes)
                .error_handler(multipart_error_handler),
        )
        .app_data(TextConfig::default().validate_content_type(false))
        .service(categories::list_categories)
        .service(categories::get_category)
        .service(categories::create_category)
        .service(categories::update_category)
        .service(categories::delete_category)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::create_product)
        .service(products::update_product)
        .service(products::delete_product)
}

fn unprocessable(detail: String) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(json!({ "detail": detail }))
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = unprocessable(err.to_string());
    InternalError::from_response(err, response).into()
}

fn multipart_error_handler(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    let response = unprocessable(err.to_string());
    InternalError::from_response(err, response).into()
}
