use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::db::DbPool;
use crate::forms::categories::CategoryMultipartForm;
use crate::image_store::ImageStore;
use crate::routes::with_repository;
use crate::services::{ServiceError, categories as category_service};

#[get("/categories")]
pub async fn list_categories(
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
) -> Result<HttpResponse, ServiceError> {
    let categories =
        with_repository(pool, images, |repo, _| category_service::load_categories(repo)).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/categories/{category_id}")]
pub async fn get_category(
    category_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
) -> Result<HttpResponse, ServiceError> {
    let category_id = category_id.into_inner();
    let category = with_repository(pool, images, move |repo, _| {
        category_service::load_category(repo, category_id)
    })
    .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[post("/categories")]
pub async fn create_category(
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
    MultipartForm(form): MultipartForm<CategoryMultipartForm>,
) -> Result<HttpResponse, ServiceError> {
    let category = with_repository(pool, images, move |repo, images| {
        let form = form
            .into_form()
            .map_err(|err| ServiceError::Form(err.to_string()))?;
        category_service::create_category(repo, images, form)
    })
    .await?;
    Ok(HttpResponse::Created().json(category))
}

#[put("/categories/{category_id}")]
pub async fn update_category(
    category_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
    MultipartForm(form): MultipartForm<CategoryMultipartForm>,
) -> Result<HttpResponse, ServiceError> {
    let category_id = category_id.into_inner();
    let category = with_repository(pool, images, move |repo, images| {
        let form = form
            .into_form()
            .map_err(|err| ServiceError::Form(err.to_string()))?;
        category_service::modify_category(repo, images, category_id, form)
    })
    .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/categories/{category_id}")]
pub async fn delete_category(
    category_id: web::Path<i32>,
    pool: web::Data<DbPool>,
    images: web::Data<ImageStore>,
) -> Result<HttpResponse, ServiceError> {
    let category_id = category_id.into_inner();
    with_repository(pool, images, move |repo, _| {
        category_service::remove_category(repo, category_id)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}
