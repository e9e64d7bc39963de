//! `seed <file.json>`: fill the database from a JSON seed file.

use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing::info;

use hr_pro::config::Config;
use hr_pro::db::{init_db, run_migrations};
use hr_pro::{seed, telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: seed <file.json>");
    };

    let config = Config::from_env()?;
    let _guard = telemetry::init(&config, "seed.log");

    let data = seed::load_file(&path)?;
    info!(
        path = %path.display(),
        employees = data.employees.len(),
        trainers = data.trainers.len(),
        programs = data.programs.len(),
        "Seed file loaded"
    );

    let pool = init_db(&config)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let report = seed::apply(&pool, &data).await?;
    info!(?report, "Seeding finished");
    println!(
        "inserted: {}, skipped: {}, failed: {}",
        report.inserted, report.skipped, report.failed
    );

    Ok(())
}
