use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use hr_pro::config::Config;
use hr_pro::db::{init_db, run_migrations};
use hr_pro::docs::ApiDoc;
use hr_pro::routes;
use hr_pro::telemetry;
use hr_pro::utils::employee_number_index::EMPLOYEE_NUMBERS;

#[get("/")]
async fn index() -> impl Responder {
    "Junior Joy HR Pro"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = telemetry::init(&config, "app.log");

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Database migrations applied");
    }

    let pool_for_warmup = pool.clone();

    actix_web::rt::spawn(async move {
        // batches of 250; numbers from the last 30 days also go into the cache
        if let Err(e) = EMPLOYEE_NUMBERS.warmup(&pool_for_warmup, 250, 30).await {
            warn!(error = %e, "Failed to warm up employee number index");
        }
    });

    let limiter = routes::build_rate_limiter(config.rate_api_per_min)
        .context("Invalid rate limiter configuration")?;
    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} matches JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limiter))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
