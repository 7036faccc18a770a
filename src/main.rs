use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use pushkind_catalog::config::ServerConfig;
use pushkind_catalog::db::establish_connection_pool;
use pushkind_catalog::image_store::ImageStore;
use pushkind_catalog::routes::catalog_scope;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.media_root) {
        log::error!(
            "Failed to create media root {}: {e}",
            config.media_root.display()
        );
        std::process::exit(1);
    }
    let images = ImageStore::new(config.media_root.clone());

    let media_root = config.media_root.clone();
    let max_upload_bytes = config.max_upload_bytes;

    log::info!("Listening on {}:{}", config.address, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/media", media_root.clone()))
            .service(catalog_scope(max_upload_bytes))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(images.clone()))
    })
    .bind((config.address.as_str(), config.port))?
    .run()
    .await
}
