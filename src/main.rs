use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use taskgate::auth::{PasswordHasher, TokenService};
use taskgate::config::{Config, StoreBackend};
use taskgate::repository::{
    postgres, InMemoryTaskRepository, InMemoryUserRepository, PgTaskRepository, PgUserRepository,
    TaskRepository, UserRepository,
};
use taskgate::routes::{self, health};
use taskgate::usecases::{TaskUsecases, UserUsecases};
use taskgate::AppError;

async fn build_repositories(
    config: &Config,
) -> Result<(Arc<dyn TaskRepository>, Arc<dyn UserRepository>), AppError> {
    let hasher = PasswordHasher::new(config.bcrypt_cost);

    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Unconfigured("DATABASE_URL must be set".into()))?;
            let pool =
                postgres::connect(url, config.database_name.as_deref(), config.store_timeout)
                    .await?;
            Ok((
                Arc::new(PgTaskRepository::new(pool.clone(), config.store_timeout)),
                Arc::new(PgUserRepository::new(pool, config.store_timeout, hasher)),
            ))
        }
        StoreBackend::Memory => {
            log::warn!("using the in-memory store; data is lost on restart");
            Ok((
                Arc::new(InMemoryTaskRepository::new()),
                Arc::new(InMemoryUserRepository::new(hasher)),
            ))
        }
    }
}

fn exit_on(err: AppError) -> ! {
    log::error!("startup failed: {}", err);
    std::process::exit(1)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().unwrap_or_else(|e| exit_on(e));
    let tokens = web::Data::new(TokenService::new(&config.jwt_secret).unwrap_or_else(|e| exit_on(e)));
    let (task_repo, user_repo) = build_repositories(&config)
        .await
        .unwrap_or_else(|e| exit_on(e));

    let task_usecases = web::Data::new(TaskUsecases::new(task_repo));
    let user_usecases = web::Data::new(UserUsecases::new(user_repo));

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(task_usecases.clone())
            .app_data(user_usecases.clone())
            .app_data(tokens.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
