use crate::domain::product::Product;
use crate::forms::products::{ProductFilterQuery, ProductForm, ProductPayload};
use crate::image_store::ImageStore;
use crate::repository::product::product_image_folder;
use crate::repository::{ProductReader, ProductWriter, RepositoryError, UnitOfWork};
use crate::services::{ServiceError, ServiceResult};

fn product_not_found(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound("Product not found".to_string()),
        other => other.into(),
    }
}

/// Fetches a product with its images and specifications.
pub fn load_product<R>(repo: &mut R, product_id: i32) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    repo.get_product_by_id(product_id).map_err(product_not_found)
}

/// Lists products matching the query string filters.
pub fn load_products<R>(repo: &mut R, filters: ProductFilterQuery) -> ServiceResult<Vec<Product>>
where
    R: ProductReader + ?Sized,
{
    let query = filters
        .into_list_query()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.list_products(&query).map_err(ServiceError::from)
}

/// Creates a product together with its images and specifications.
///
/// Files written for the product are removed again if any later step or
/// the commit fails.
pub fn create_product<R>(
    repo: &mut R,
    images: &ImageStore,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + UnitOfWork + ?Sized,
{
    let payload = form
        .into_payload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let product = repo
        .create_product(&payload.new_product())
        .map_err(ServiceError::from)?;

    let mut saved = Vec::new();
    if let Err(err) = attach_children(repo, images, product.id, &payload, &mut saved)
        .and_then(|_| {
            repo.commit()
                .map_err(|err| ServiceError::Persistence(err.to_string()))
        })
    {
        images.delete_all(&saved);
        return Err(err);
    }

    repo.get_product_by_id(product.id)
        .map_err(ServiceError::from)
}

fn attach_children<R>(
    repo: &mut R,
    images: &ImageStore,
    product_id: i32,
    payload: &ProductPayload,
    saved: &mut Vec<String>,
) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    if !payload.images.is_empty() {
        *saved = images.save_all(&product_image_folder(product_id), &payload.images)?;
        repo.create_images(saved, product_id)?;
    }
    if let Some(specifications) = payload.specifications.as_deref() {
        repo.add_specifications(specifications, product_id)?;
    }
    Ok(())
}

/// Replaces every field, image and specification of a product.
pub fn modify_product<R>(
    repo: &mut R,
    images: &ImageStore,
    product_id: i32,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + UnitOfWork + ?Sized,
{
    let payload = form
        .into_payload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let product = repo
        .update_product(product_id, &payload.update_product())
        .map_err(product_not_found)?;

    let saved = repo.update_product_images(&product, &payload.images)?;

    let result = repo
        .update_product_specifications(&product, payload.specifications.as_deref().unwrap_or(""))
        .map_err(ServiceError::from)
        .and_then(|_| {
            repo.commit()
                .map_err(|err| ServiceError::Persistence(err.to_string()))
        });

    if let Err(err) = result {
        images.delete_all(&saved);
        return Err(err);
    }

    repo.get_product_by_id(product.id)
        .map_err(ServiceError::from)
}

/// Deletes a product with its images and specifications.
pub fn remove_product<R>(repo: &mut R, product_id: i32) -> ServiceResult<()>
where
    R: ProductWriter + UnitOfWork + ?Sized,
{
    repo.delete_product(product_id)
        .and_then(|_| repo.commit())
        .map_err(|err| ServiceError::Persistence(err.to_string()))
}
