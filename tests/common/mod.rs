//! Helpers for integration tests.
#![allow(dead_code)]

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

use pushkind_catalog::db::{DbPool, establish_connection_pool};
use pushkind_catalog::image_store::{ImageStore, UploadedImage};
use pushkind_catalog::repository::DieselRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

/// Database plus a throw-away media root.
pub struct TestCatalog {
    pub db: TestDb,
    pub media: TempDir,
}

impl TestCatalog {
    pub fn new(filename: &str) -> Self {
        TestCatalog {
            db: TestDb::new(filename),
            media: TempDir::new().expect("Failed to create media root."),
        }
    }

    pub fn images(&self) -> ImageStore {
        ImageStore::new(self.media.path())
    }

    /// Open a repository with a fresh transaction.
    pub fn repo(&self) -> DieselRepository {
        DieselRepository::begin(&self.db.pool(), self.images()).expect("Failed to begin transaction.")
    }

    /// Whether the stored `media/...` path exists on disk.
    pub fn media_exists(&self, path: &str) -> bool {
        let relative = path.strip_prefix("media/").expect("path below media root");
        self.media.path().join(relative).exists()
    }
}

pub fn png(name: &str) -> UploadedImage {
    UploadedImage::new(
        Some(name.to_string()),
        Some("image/png".to_string()),
        b"\x89PNG\r\n\x1a\n".to_vec(),
    )
}

/// Hand-built `multipart/form-data` request body.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        MultipartBody {
            boundary: "catalog-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the `Content-Type` header value and the encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
