use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::db::DbPool;
use crate::forms::products::{ProductFilterQuery, ProductMultipartForm};
use crate::image_store::ImageStore;
use crate::routes::with_repository;
use crate::services::{ServiceError, products as product_service};

#[get("/products")]
pub async fn list_products(
    params: web::Query<ProductFilterQuery>,
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
) -> Result<HttpResponse, ServiceError> {
    let filters = params.into_inner();
    let products = with_repository(pool, images, move |repo, _| {
        product_service::load_products(repo, filters)
    })
    .await?;
    Ok(HttpResponse::Ok().json(products))
}

#[get("/products/{product_id}")]
pub async fn get_product(
    product_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
) -> Result<HttpResponse, ServiceError> {
    let product_id = product_id.into_inner();
    let product = with_repository(pool, images, move |repo, _| {
        product_service::load_product(repo, product_id)
    })
    .await?;
    Ok(HttpResponse::Ok().json(product))
}

#[post("/products")]
pub async fn create_product(
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
    MultipartForm(form): MultipartForm<ProductMultipartForm>,
) -> Result<HttpResponse, ServiceError> {
    let product = with_repository(pool, images, move |repo, images| {
        let form = form
            .into_form()
            .map_err(|err| ServiceError::Form(err.to_string()))?;
        product_service::create_product(repo, images, form)
    })
    .await?;
    Ok(HttpResponse::Created().json(product))
}

#[put("/products/{product_id}")]
pub async fn update_product(
    product_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
    MultipartForm(form): MultipartForm<ProductMultipartForm>,
) -> Result<HttpResponse, ServiceError> {
    let product_id = product_id.into_inner();
    let product = with_repository(pool, images, move |repo, images| {
        let form = form
            .into_form()
            .map_err(|err| ServiceError::Form(err.to_string()))?;
        product_service::modify_product(repo, images, product_id, form)
    })
    .await?;
    Ok(HttpResponse::Ok().json(product))
}

#[delete("/products/{product_id}")]
pub async fn delete_product(
    product_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
) -> Result<HttpResponse, ServiceError> {
    let product_id = product_id.into_inner();
    with_repository(pool, images, move |repo, _| {
        product_service::remove_product(repo, product_id)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}
