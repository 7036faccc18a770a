//! Product catalog backend: categories and products with image uploads,
//! plus the order records that reference them.

pub mod config;
pub mod db;
pub mod domain;
pub mod forms;
pub mod image_store;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;
