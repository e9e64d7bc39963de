//! Loads employees, trainers and training programs from a JSON file.
//!
//! The file is parsed as data, never evaluated. Records go through the same
//! insert routines the API uses, so validation and zeroed leave usage apply.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{info, warn};

use crate::api::employee::{CreateEmployee, employee_number_exists, insert_employee};
use crate::error::is_duplicate_key;
use crate::api::trainer::{CreateTrainer, insert_trainer};
use crate::api::training_program::{CreateProgram, insert_program};
use crate::utils::employee_number_index::normalize;

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub employees: Vec<CreateEmployee>,
    #[serde(default)]
    pub trainers: Vec<CreateTrainer>,
    #[serde(default)]
    pub programs: Vec<CreateProgram>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn parse(raw: &str) -> Result<SeedData> {
    serde_json::from_str(raw).context("Seed file is not valid seed JSON")
}

pub fn load_file(path: &Path) -> Result<SeedData> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    parse(&raw)
}

/// Inserts every record; a failing record is logged and counted, not fatal.
pub async fn apply(pool: &MySqlPool, data: &SeedData) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    // The filter and cache are not warmed here, so existence is checked
    // against the table itself.
    let mut seen = HashSet::new();

    for employee in &data.employees {
        if let Err(e) = employee.validate() {
            warn!(employee_number = %employee.employee_number, error = %e, "Invalid employee skipped");
            report.failed += 1;
            continue;
        }
        if !seen.insert(normalize(&employee.employee_number))
            || employee_number_exists(pool, &employee.employee_number).await?
        {
            info!(employee_number = %employee.employee_number, "Employee already present");
            report.skipped += 1;
            continue;
        }
        match insert_employee(pool, employee).await {
            Ok(id) => {
                info!(id, employee_number = %employee.employee_number, "Employee seeded");
                report.inserted += 1;
            }
            Err(e) if is_duplicate_key(&e) => {
                info!(employee_number = %employee.employee_number, "Employee already present");
                report.skipped += 1;
            }
            Err(e) => {
                warn!(employee_number = %employee.employee_number, error = %e, "Employee insert failed");
                report.failed += 1;
            }
        }
    }

    for trainer in &data.trainers {
        match insert_trainer(pool, trainer).await {
            Ok(id) => {
                info!(id, name = %trainer.name, "Trainer seeded");
                report.inserted += 1;
            }
            Err(e) => {
                warn!(name = %trainer.name, error = %e, "Trainer insert failed");
                report.failed += 1;
            }
        }
    }

    for program in &data.programs {
        match insert_program(pool, program).await {
            Ok(id) => {
                info!(id, title = %program.title, "Training program seeded");
                report.inserted += 1;
            }
            Err(e) => {
                warn!(title = %program.title, error = %e, "Training program insert failed");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
