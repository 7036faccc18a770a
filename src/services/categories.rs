use crate::domain::category::Category;
use crate::forms::categories::CategoryForm;
use crate::image_store::ImageStore;
use crate::repository::category::CATEGORY_IMAGE_FOLDER;
use crate::repository::{CategoryReader, CategoryWriter, RepositoryError, UnitOfWork};
use crate::services::{ServiceError, ServiceResult};

/// Fetches a single category.
pub fn load_category<R>(repo: &mut R, category_id: i32) -> ServiceResult<Category>
where
    R: CategoryReader + ?Sized,
{
    repo.get_category_by_id(category_id)
        .map_err(|err| match err {
            RepositoryError::NotFound => ServiceError::NotFound("Category not found".to_string()),
            other => other.into(),
        })
}

/// Lists every category.
pub fn load_categories<R>(repo: &mut R) -> ServiceResult<Vec<Category>>
where
    R: CategoryReader + ?Sized,
{
    repo.list_categories().map_err(ServiceError::from)
}

/// Creates a category, storing its image first.
///
/// The stored image is removed again when the insert or the commit fails.
pub fn create_category<R>(
    repo: &mut R,
    images: &ImageStore,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + UnitOfWork + ?Sized,
{
    let payload = form
        .into_payload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let image_path = payload
        .image
        .as_ref()
        .map(|upload| images.save(CATEGORY_IMAGE_FOLDER, upload))
        .transpose()?;

    let result = repo
        .create_category(&payload.new_category(image_path.clone()))
        .map_err(ServiceError::from)
        .and_then(|category| {
            repo.commit()
                .map_err(|err| ServiceError::Persistence(err.to_string()))?;
            Ok(category)
        });

    if result.is_err()
        && let Some(path) = image_path.as_deref()
    {
        images.delete(path);
    }

    result
}

/// Replaces the name and image of a category.
pub fn modify_category<R>(
    repo: &mut R,
    images: &ImageStore,
    category_id: i32,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + UnitOfWork + ?Sized,
{
    let payload = form
        .into_payload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let replaces_image = payload.image.is_some();

    let updated = repo
        .update_category(category_id, &payload.into_update_category())
        .map_err(|err| match err {
            RepositoryError::NotFound => ServiceError::Form("Category not found".to_string()),
            other => other.into(),
        })?;

    if let Err(err) = repo.commit() {
        if replaces_image && let Some(path) = updated.image.as_deref() {
            images.delete(path);
        }
        return Err(ServiceError::Persistence(err.to_string()));
    }

    Ok(updated)
}

/// Deletes a category; products in it are kept without a category.
pub fn remove_category<R>(repo: &mut R, category_id: i32) -> ServiceResult<()>
where
    R: CategoryWriter + UnitOfWork + ?Sized,
{
    repo.delete_category(category_id)
        .and_then(|_| repo.commit())
        .map_err(|err| ServiceError::Persistence(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::image_store::UploadedImage;
    use crate::repository::mock::MockCategoryRepo;

    fn png(name: &str) -> UploadedImage {
        UploadedImage::new(
            Some(name.to_string()),
            Some("image/png".to_string()),
            b"png".to_vec(),
        )
    }

    fn stored_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path().join(CATEGORY_IMAGE_FOLDER))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[test]
    fn load_category_maps_missing_to_not_found() {
        let mut repo = MockCategoryRepo::new();
        repo.expect_get_category_by_id()
            .returning(|_| Err(RepositoryError::NotFound));

        let result = load_category(&mut repo, 5);

        assert!(matches!(result, Err(ServiceError::NotFound(message)) if message == "Category not found"));
    }

    #[test]
    fn create_category_saves_image_and_commits() {
        let media = TempDir::new().expect("temp dir");
        let images = ImageStore::new(media.path());
        let mut repo = MockCategoryRepo::new();

        repo.expect_create_category()
            .times(1)
            .withf(|new_category| {
                new_category.name == "Shoes"
                    && new_category
                        .image
                        .as_deref()
                        .is_some_and(|path| path.starts_with("media/categories/"))
            })
            .returning(|new_category| {
                Ok(Category {
                    id: 1,
                    name: new_category.name.clone(),
                    image: new_category.image.clone(),
                })
            });
        repo.expect_commit().times(1).returning(|| Ok(()));

        let form = CategoryForm {
            name: " Shoes ".to_string(),
            image: Some(png("shoes.png")),
        };

        let category = create_category(&mut repo, &images, form).expect("created");

        assert_eq!(category.name, "Shoes");
        assert_eq!(stored_files(&media), 1);
    }

    #[test]
    fn create_category_conflict_removes_saved_image() {
        let media = TempDir::new().expect("temp dir");
        let images = ImageStore::new(media.path());
        let mut repo = MockCategoryRepo::new();

        repo.expect_create_category().returning(|_| {
            Err(RepositoryError::Conflict(
                "Category with provided name already exists!".to_string(),
            ))
        });
        repo.expect_commit().never();

        let form = CategoryForm {
            name: "Shoes".to_string(),
            image: Some(png("shoes.png")),
        };

        let result = create_category(&mut repo, &images, form);

        assert!(matches!(result, Err(ServiceError::Conflict(message)) if message.contains("already exists")));
        assert_eq!(stored_files(&media), 0);
    }

    #[test]
    fn create_category_commit_failure_removes_saved_image() {
        let media = TempDir::new().expect("temp dir");
        let images = ImageStore::new(media.path());
        let mut repo = MockCategoryRepo::new();

        repo.expect_create_category().returning(|new_category| {
            Ok(Category {
                id: 1,
                name: new_category.name.clone(),
                image: new_category.image.clone(),
            })
        });
        repo.expect_commit().returning(|| {
            Err(RepositoryError::Persistence(
                diesel::result::Error::RollbackTransaction,
            ))
        });

        let form = CategoryForm {
            name: "Shoes".to_string(),
            image: Some(png("shoes.png")),
        };

        let result = create_category(&mut repo, &images, form);

        assert!(matches!(result, Err(ServiceError::Persistence(_))));
        assert_eq!(stored_files(&media), 0);
    }

    #[test]
    fn create_category_rejects_non_image_before_touching_repo() {
        let media = TempDir::new().expect("temp dir");
        let images = ImageStore::new(media.path());
        let mut repo = MockCategoryRepo::new();
        repo.expect_create_category().never();

        let form = CategoryForm {
            name: "Shoes".to_string(),
            image: Some(UploadedImage::new(
                Some("notes.txt".to_string()),
                Some("text/plain".to_string()),
                b"hi".to_vec(),
            )),
        };

        let result = create_category(&mut repo, &images, form);

        assert!(matches!(result, Err(ServiceError::InvalidMediaType(_))));
    }

    #[test]
    fn modify_missing_category_is_unprocessable() {
        let media = TempDir::new().expect("temp dir");
        let images = ImageStore::new(media.path());
        let mut repo = MockCategoryRepo::new();
        repo.expect_update_category()
            .returning(|_, _| Err(RepositoryError::NotFound));
        repo.expect_commit().never();

        let form = CategoryForm {
            name: "Boots".to_string(),
            image: None,
        };

        let result = modify_category(&mut repo, &images, 9, form);

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn modify_category_commit_failure_removes_new_image() {
        let media = TempDir::new().expect("temp dir");
        let images = ImageStore::new(media.path());
        let saved = images
            .save(CATEGORY_IMAGE_FOLDER, &png("boots.png"))
            .expect("saved");
        let mut repo = MockCategoryRepo::new();

        let returned_path = saved.clone();
        repo.expect_update_category()
            .withf(|id, updates| *id == 3 && matches!(updates.image, Some(Some(_))))
            .returning(move |id, _| {
                Ok(Category {
                    id,
                    name: "Boots".to_string(),
                    image: Some(returned_path.clone()),
                })
            });
        repo.expect_commit().returning(|| {
            Err(RepositoryError::Persistence(
                diesel::result::Error::RollbackTransaction,
            ))
        });

        let form = CategoryForm {
            name: "Boots".to_string(),
            image: Some(png("boots.png")),
        };

        let result = modify_category(&mut repo, &images, 3, form);

        assert!(matches!(result, Err(ServiceError::Persistence(_))));
        assert_eq!(stored_files(&media), 0);
    }

    #[test]
    fn remove_category_maps_every_failure_to_persistence() {
        let mut repo = MockCategoryRepo::new();
        repo.expect_delete_category()
            .returning(|_| Err(RepositoryError::NotFound));
        repo.expect_commit().never();

        let result = remove_category(&mut repo, 1);

        assert!(matches!(result, Err(ServiceError::Persistence(_))));
    }
}
