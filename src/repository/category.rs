use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::category::{
    Category as DomainCategory, NewCategory as DomainNewCategory,
    UpdateCategory as DomainUpdateCategory,
};
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, UpdateCategory as DbUpdateCategory,
};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, RepositoryError, RepositoryResult,
};

/// Folder below the media root holding category images.
pub const CATEGORY_IMAGE_FOLDER: &str = "categories";

impl CategoryReader for DieselRepository {
    fn get_category_by_id(&mut self, id: i32) -> RepositoryResult<DomainCategory> {
        let category = find_category(self.conn(), id)?;
        Ok(category.into())
    }

    fn list_categories(&mut self) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let categories = categories::table.load::<DbCategory>(self.conn())?;
        Ok(categories.into_iter().map(DomainCategory::from).collect())
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(
        &mut self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let conn = self.conn();

        // The unique index still guards against a concurrent insert that
        // slips in between this check and the insert below.
        if category_name_taken(conn, &new_category.name)? {
            return Err(RepositoryError::Conflict(
                "Category with provided name already exists!".to_string(),
            ));
        }

        let insertable = DbNewCategory::from(new_category);

        let created = diesel::insert_into(categories::table)
            .values(&insertable)
            .get_result::<DbCategory>(conn)?;

        Ok(created.into())
    }

    fn update_category(
        &mut self,
        category_id: i32,
        updates: &DomainUpdateCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let current = find_category(&mut *self.conn, category_id)?;

        if updates.is_empty() {
            return Ok(current.into());
        }

        let image_path = match &updates.image {
            None => None,
            Some(Some(upload)) => Some(Some(self.images.save(CATEGORY_IMAGE_FOLDER, upload)?)),
            Some(None) => Some(None),
        };

        let db_updates = DbUpdateCategory {
            name: updates.name.as_deref(),
            image: image_path.as_ref().map(|path| path.as_deref()),
        };

        let updated = diesel::update(categories::table.find(category_id))
            .set(&db_updates)
            .get_result::<DbCategory>(&mut *self.conn);

        match updated {
            Ok(updated) => {
                if image_path.is_some()
                    && let Some(old_image) = current.image
                {
                    self.discard_image(old_image);
                }
                Ok(updated.into())
            }
            Err(err) => {
                if let Some(Some(path)) = &image_path {
                    self.images.delete(path);
                }
                Err(err.into())
            }
        }
    }

    fn delete_category(&mut self, category_id: i32) -> RepositoryResult<()> {
        use crate::schema::categories;

        let current = find_category(&mut *self.conn, category_id)?;

        let deleted =
            diesel::delete(categories::table.find(category_id)).execute(&mut *self.conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        if let Some(image) = current.image {
            self.discard_image(image);
        }

        Ok(())
    }
}

fn find_category(conn: &mut SqliteConnection, category_id: i32) -> RepositoryResult<DbCategory> {
    use crate::schema::categories;

    categories::table
        .find(category_id)
        .first::<DbCategory>(conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)
}

fn category_name_taken(conn: &mut SqliteConnection, name: &str) -> RepositoryResult<bool> {
    use crate::schema::categories;

    let taken = select(exists(categories::table.filter(categories::name.eq(name))))
        .get_result::<bool>(conn)?;

    Ok(taken)
}
