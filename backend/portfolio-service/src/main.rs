/// Portfolio Service - HTTP Server
///
/// Serves the section hierarchy, media metadata, pre-signed uploads, gallery
/// layout, accounts and followers.
use actix_cors::Cors;
use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use anyhow::Context;
use crypto_core::jwt;
use portfolio_service::config::CorsConfig;
use portfolio_service::handlers;
use portfolio_service::services::{ObjectStorage, S3Storage};
use portfolio_service::Config;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    init_jwt(&config)?;

    let storage = S3Storage::from_config(&config.s3).await;

    if let Some(tls) = &config.database_tls {
        let pem = storage
            .download(&tls.bucket, &tls.key)
            .await
            .context("Failed to fetch database CA bundle")?;
        tracing::info!(bucket = %tls.bucket, key = %tls.key, "Loaded database CA bundle");
        config.database = config.database.clone().with_ssl_root_cert(pem);
    }

    config.database.log_config();
    let db_pool = db_pool::create_pool(config.database.clone())
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(
        address = %bind_address,
        env = %config.app.env,
        bucket = %config.s3.bucket,
        "Portfolio service starting HTTP server"
    );

    let storage: Arc<dyn ObjectStorage> = Arc::new(storage);
    let storage = web::Data::from(storage);
    let pool = web::Data::new(db_pool);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .app_data(pool.clone())
            .app_data(storage.clone())
            .wrap(cors(&config.cors))
            .wrap(actix_middleware::Logger::default())
            .wrap(TracingLogger::default())
            .configure(portfolio_service::configure_routes)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&bind_address)?
    .run()
    .await?;

    tracing::info!("Portfolio service shutting down");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,aws_config=warn"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn init_jwt(config: &Config) -> anyhow::Result<()> {
    match (&config.jwt.private_key_pem, &config.jwt.public_key_pem) {
        (Some(private_key), Some(public_key)) => {
            jwt::initialize_jwt_keys(private_key, public_key)
                .context("Failed to initialize JWT keys")?;
        }
        (None, Some(public_key)) => {
            jwt::initialize_jwt_validation_only(public_key)
                .context("Failed to initialize JWT public key")?;
            tracing::warn!("JWT_PRIVATE_KEY_PEM not set; register and login will fail");
        }
        _ => {
            tracing::warn!("JWT_PUBLIC_KEY_PEM not set; requests carrying a bearer token will fail");
        }
    }
    Ok(())
}

fn cors(config: &CorsConfig) -> Cors {
    if config.allowed_origins.is_empty() {
        return Cors::permissive();
    }

    config
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}
