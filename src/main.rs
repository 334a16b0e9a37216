use std::process::ExitCode;
use std::sync::Arc;

use dotenvy::dotenv;
use storefront_service::application::Storefront;
use storefront_service::infrastructure::DieselStore;
use storefront_service::{build_server, create_pool, run_migrations, AppConfig};

#[actix_web::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pool = match create_pool(&config.database_url, config.pool_size) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("cannot connect to database: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = run_migrations(&pool) {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }

    let store = DieselStore::new(pool, config.retry);
    let api = Arc::new(Storefront::new(store, config.order_ids()));

    log::info!(
        "Starting server at http://{}:{} (order prefix {})",
        config.host,
        config.port,
        config.order_id_prefix
    );

    let server = match build_server(api, &config.host, config.port) {
        Ok(server) => server,
        Err(e) => {
            log::error!("cannot bind {}:{}: {}", config.host, config.port, e);
            return ExitCode::FAILURE;
        }
    };
    match server.await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
