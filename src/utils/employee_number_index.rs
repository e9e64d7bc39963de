//! Fast answers to "is this employee number taken?".
//!
//! The cuckoo filter holds every number and rules free ones out; the moka
//! cache holds numbers known to be taken recently. Anything the two cannot
//! settle goes to the database.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use autoscale_cuckoo_filter::CuckooFilter;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use tracing::info;

/// Tune to the expected headcount.
const FILTER_CAPACITY: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;
const CACHE_CAPACITY: u64 = 50_000;
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub static EMPLOYEE_NUMBERS: Lazy<EmployeeNumberIndex> =
    Lazy::new(|| EmployeeNumberIndex::new(FILTER_CAPACITY, CACHE_CAPACITY));

/// Stored form of an employee number.
#[inline]
pub fn normalize(employee_number: &str) -> String {
    employee_number.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Certainly not in use.
    Free,
    /// Recently confirmed as in use.
    Taken,
    /// Possibly in use; ask the database.
    Unknown,
}

pub struct EmployeeNumberIndex {
    filter: RwLock<CuckooFilter<String>>,
    taken: Cache<String, ()>,
}

impl EmployeeNumberIndex {
    pub fn new(filter_capacity: usize, cache_capacity: u64) -> Self {
        Self {
            filter: RwLock::new(CuckooFilter::new(filter_capacity, FALSE_POSITIVE_RATE)),
            taken: Cache::builder()
                .max_capacity(cache_capacity)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    // The filter is only a hint, so a poisoned lock is still usable.
    fn read_filter(&self) -> RwLockReadGuard<'_, CuckooFilter<String>> {
        self.filter.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_filter(&self) -> RwLockWriteGuard<'_, CuckooFilter<String>> {
        self.filter.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lookup(&self, employee_number: &str) -> Lookup {
        let key = normalize(employee_number);

        if !self.read_filter().contains(&key) {
            Lookup::Free
        } else if self.taken.contains_key(&key) {
            Lookup::Taken
        } else {
            Lookup::Unknown
        }
    }

    /// A new employee now holds this number.
    pub async fn record(&self, employee_number: &str) {
        let key = normalize(employee_number);
        self.write_filter().add(&key);
        self.taken.insert(key, ()).await;
    }

    /// The database reported the number as taken.
    pub async fn confirm(&self, employee_number: &str) {
        self.taken.insert(normalize(employee_number), ()).await;
    }

    /// The number is free again after a delete.
    pub async fn release(&self, employee_number: &str) {
        let key = normalize(employee_number);
        self.write_filter().remove(&key);
        self.taken.invalidate(&key).await;
    }

    pub async fn rename(&self, previous: &str, current: &str) {
        if normalize(previous) != normalize(current) {
            self.release(previous).await;
        }
        self.record(current).await;
    }

    /// Loads every number into the filter in one pass over `employees`;
    /// numbers created within `recent_days` also go into the cache.
    pub async fn warmup(&self, pool: &MySqlPool, batch_size: usize, recent_days: i64) -> Result<usize> {
        let since = Utc::now() - chrono::Duration::days(recent_days);
        let mut stream = sqlx::query_as::<_, (String, DateTime<Utc>)>(
            "SELECT employee_number, created_at FROM employees",
        )
        .fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total = 0usize;

        while let Some(row) = stream.next().await {
            let (employee_number, created_at) = row.context("Employee number fetch failed")?;
            batch.push((normalize(&employee_number), created_at >= since));
            total += 1;

            if batch.len() >= batch_size {
                self.add_batch(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.add_batch(&batch).await;
        }

        info!(
            "Employee number index warmup complete: {} employees (cache window {} days)",
            total,
            recent_days
        );
        Ok(total)
    }

    /// Each entry is a normalized number and whether it belongs in the cache.
    async fn add_batch(&self, batch: &[(String, bool)]) {
        {
            let mut filter = self.write_filter();
            for (key, _) in batch {
                filter.add(key);
            }
        }

        let inserts: Vec<_> = batch
            .iter()
            .filter(|(_, recent)| *recent)
            .map(|(key, _)| self.taken.insert(key.clone(), ()))
            .collect();
        futures::future::join_all(inserts).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> EmployeeNumberIndex {
        EmployeeNumberIndex::new(1_000, 1_000)
    }

    #[test]
    fn test_normalize_trims_and_upper_cases() {
        assert_eq!(normalize("  jj-0042 "), "JJ-0042");
    }

    #[actix_web::test]
    async fn test_unknown_number_is_free() {
        assert_eq!(index().lookup("JJ-0001"), Lookup::Free);
    }

    #[actix_web::test]
    async fn test_recorded_number_is_taken_regardless_of_case() {
        let index = index();
        index.record("jj-0001").await;

        assert_eq!(index.lookup(" JJ-0001 "), Lookup::Taken);
    }

    #[actix_web::test]
    async fn test_old_numbers_defer_to_the_database() {
        let index = index();
        index
            .add_batch(&[("JJ-0100".to_string(), false), ("JJ-0200".to_string(), true)])
            .await;

        assert_eq!(index.lookup("JJ-0100"), Lookup::Unknown);
        assert_eq!(index.lookup("JJ-0200"), Lookup::Taken);

        index.confirm("JJ-0100").await;
        assert_eq!(index.lookup("JJ-0100"), Lookup::Taken);
    }

    #[actix_web::test]
    async fn test_released_number_is_free_again() {
        let index = index();
        index.record("JJ-0300").await;
        index.release("jj-0300").await;

        assert_eq!(index.lookup("JJ-0300"), Lookup::Free);
    }

    #[actix_web::test]
    async fn test_rename_frees_the_previous_number() {
        let index = index();
        index.record("JJ-0400").await;
        index.rename("JJ-0400", "JJ-0401").await;

        assert_eq!(index.lookup("JJ-0400"), Lookup::Free);
        assert_eq!(index.lookup("JJ-0401"), Lookup::Taken);

        // same number in a different case stays taken
        index.rename("JJ-0401", "jj-0401").await;
        assert_eq!(index.lookup("JJ-0401"), Lookup::Taken);
    }
}
