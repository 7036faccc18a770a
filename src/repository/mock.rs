use mockall::mock;

use super::{
    CategoryReader, CategoryWriter, ProductReader, ProductWriter, RepositoryResult, UnitOfWork,
};
use crate::domain::{
    category::{Category, NewCategory, UpdateCategory},
    product::{NewProduct, Product, ProductListQuery, UpdateProduct},
};
use crate::image_store::UploadedImage;

mock! {
    pub CategoryRepo {}

    impl CategoryReader for CategoryRepo {
        fn get_category_by_id(&mut self, id: i32) -> RepositoryResult<Category>;
        fn list_categories(&mut self) -> RepositoryResult<Vec<Category>>;
    }

    impl CategoryWriter for CategoryRepo {
        fn create_category(&mut self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(&mut self, category_id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
        fn delete_category(&mut self, category_id: i32) -> RepositoryResult<()>;
    }

    impl UnitOfWork for CategoryRepo {
        fn commit(&mut self) -> RepositoryResult<()>;
        fn rollback(&mut self) -> RepositoryResult<()>;
    }
}

mock! {
    pub ProductRepo {}

    impl ProductReader for ProductRepo {
        fn get_product_by_id(&mut self, id: i32) -> RepositoryResult<Product>;
        fn list_products(&mut self, query: &ProductListQuery) -> RepositoryResult<Vec<Product>>;
    }

    impl ProductWriter for ProductRepo {
        fn create_product(&mut self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn create_images(&mut self, image_paths: &[String], product_id: i32) -> RepositoryResult<()>;
        fn add_specifications(&mut self, specifications: &str, product_id: i32) -> RepositoryResult<()>;
        fn update_product(&mut self, product_id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
        fn update_product_images(&mut self, product: &Product, uploads: &[UploadedImage]) -> RepositoryResult<Vec<String>>;
        fn update_product_specifications(&mut self, product: &Product, specifications: &str) -> RepositoryResult<()>;
        fn delete_product(&mut self, product_id: i32) -> RepositoryResult<()>;
    }

    impl UnitOfWork for ProductRepo {
        fn commit(&mut self) -> RepositoryResult<()>;
        fn rollback(&mut self) -> RepositoryResult<()>;
    }
}
