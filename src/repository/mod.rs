use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::sqlite::SqliteConnection;

use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory, UpdateCategory};
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::product::{NewProduct, Product, ProductListQuery, UpdateProduct};
use crate::image_store::{ImageStore, UploadedImage};

pub mod category;
pub mod errors;
pub mod order;
pub mod product;

#[cfg(test)]
pub mod mock;

pub use errors::{RepositoryError, RepositoryResult};

/// Diesel-backed repository bound to one pooled connection and one
/// transaction.
///
/// [`DieselRepository::begin`] opens the transaction. It ends with
/// [`UnitOfWork::commit`] or [`UnitOfWork::rollback`]; if the repository is
/// dropped while the transaction is still open it is rolled back. The
/// connection goes back to the pool on drop in every case.
///
/// Image files replaced or removed inside the transaction are only deleted
/// from disk once it commits.
pub struct DieselRepository {
    conn: DbConnection,
    images: ImageStore,
    discarded: Vec<String>,
}

impl DieselRepository {
    /// Check a connection out of `pool` and begin a transaction on it.
    pub fn begin(pool: &DbPool, images: ImageStore) -> RepositoryResult<Self> {
        let mut conn = pool.get()?;
        AnsiTransactionManager::begin_transaction(&mut *conn)?;
        Ok(Self {
            conn,
            images,
            discarded: Vec::new(),
        })
    }

    fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Schedule the file behind `path` for deletion on commit.
    fn discard_image(&mut self, path: impl Into<String>) {
        let path = path.into();
        if self.in_transaction() {
            self.discarded.push(path);
        } else {
            self.images.delete(&path);
        }
    }

    fn in_transaction(&mut self) -> bool {
        matches!(
            AnsiTransactionManager::transaction_manager_status_mut(&mut *self.conn)
                .transaction_depth(),
            Ok(Some(_))
        )
    }
}

impl Drop for DieselRepository {
    fn drop(&mut self) {
        if self.in_transaction() {
            if let Err(err) = AnsiTransactionManager::rollback_transaction(&mut *self.conn) {
                log::error!("Failed to roll back abandoned transaction: {err}");
            }
        }
    }
}

/// Transaction boundary of a repository session.
pub trait UnitOfWork {
    /// Make every change of the session durable.
    fn commit(&mut self) -> RepositoryResult<()>;
    /// Discard every change of the session.
    fn rollback(&mut self) -> RepositoryResult<()>;
}

impl UnitOfWork for DieselRepository {
    fn commit(&mut self) -> RepositoryResult<()> {
        if !self.in_transaction() {
            return Ok(());
        }
        AnsiTransactionManager::commit_transaction(&mut *self.conn)?;
        let discarded = std::mem::take(&mut self.discarded);
        self.images.delete_all(&discarded);
        Ok(())
    }

    fn rollback(&mut self) -> RepositoryResult<()> {
        self.discarded.clear();
        if !self.in_transaction() {
            return Ok(());
        }
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)?;
        Ok(())
    }
}

/// Read-only operations over category records.
pub trait CategoryReader {
    fn get_category_by_id(&mut self, id: i32) -> RepositoryResult<Category>;
    fn list_categories(&mut self) -> RepositoryResult<Vec<Category>>;
}

/// Write operations over category records.
pub trait CategoryWriter {
    fn create_category(&mut self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(
        &mut self,
        category_id: i32,
        updates: &UpdateCategory,
    ) -> RepositoryResult<Category>;
    fn delete_category(&mut self, category_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over product records.
pub trait ProductReader {
    /// Fetch a product with its images and specifications.
    fn get_product_by_id(&mut self, id: i32) -> RepositoryResult<Product>;
    fn list_products(&mut self, query: &ProductListQuery) -> RepositoryResult<Vec<Product>>;
}

/// Write operations over product records and their child collections.
pub trait ProductWriter {
    fn create_product(&mut self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn create_images(&mut self, image_paths: &[String], product_id: i32) -> RepositoryResult<()>;
    /// Insert one specification per pair of the JSON object in `specifications`.
    fn add_specifications(&mut self, specifications: &str, product_id: i32)
    -> RepositoryResult<()>;
    fn update_product(
        &mut self,
        product_id: i32,
        updates: &UpdateProduct,
    ) -> RepositoryResult<Product>;
    /// Replace every image of `product` and return the paths of the new files.
    fn update_product_images(
        &mut self,
        product: &Product,
        uploads: &[UploadedImage],
    ) -> RepositoryResult<Vec<String>>;
    /// Replace every specification of `product`; a blank payload only clears them.
    fn update_product_specifications(
        &mut self,
        product: &Product,
        specifications: &str,
    ) -> RepositoryResult<()>;
    fn delete_product(&mut self, product_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over order records.
pub trait OrderReader {
    fn get_order_by_id(&mut self, id: i32) -> RepositoryResult<Order>;
}

/// Write operations over order records.
pub trait OrderWriter {
    fn create_order(&mut self, new_order: &NewOrder) -> RepositoryResult<Order>;
    fn update_order_status(&mut self, order_id: i32, status: OrderStatus)
    -> RepositoryResult<Order>;
}
