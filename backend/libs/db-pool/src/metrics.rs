//! Pool gauges and acquisition timing, exported through the default
//! prometheus registry.

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use std::time::Instant;

lazy_static::lazy_static! {
    static ref POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Connections held by the pool, by state",
        &["service", "state"]
    ).expect("db_pool_connections registers once");

    static ref ACQUIRE_SECONDS: HistogramVec = register_histogram_vec!(
        "db_pool_acquire_duration_seconds",
        "Time spent waiting for a pooled connection",
        &["service"],
        vec![0.001, 0.005, 0.025, 0.1, 0.5, 2.0, 10.0]
    ).expect("db_pool_acquire_duration_seconds registers once");

    static ref ACQUIRE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "db_pool_acquire_failures_total",
        "Failed connection acquisitions, by cause",
        &["service", "cause"]
    ).expect("db_pool_acquire_failures_total registers once");
}

/// Point-in-time view of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolSnapshot {
    pub idle: i64,
    pub in_use: i64,
    pub max: i64,
}

impl PoolSnapshot {
    pub(crate) fn of(pool: &PgPool) -> Self {
        Self::from_counts(
            pool.size(),
            pool.num_idle(),
            pool.options().get_max_connections(),
        )
    }

    fn from_counts(size: u32, idle: usize, max: u32) -> Self {
        let idle = idle as i64;
        Self {
            idle,
            in_use: (size as i64 - idle).max(0),
            max: max as i64,
        }
    }

    fn record(&self, service: &str) {
        for (state, value) in [("idle", self.idle), ("in_use", self.in_use), ("max", self.max)] {
            POOL_CONNECTIONS.with_label_values(&[service, state]).set(value);
        }
    }
}

pub(crate) fn update_pool_metrics(pool: &PgPool, service: &str) {
    PoolSnapshot::of(pool).record(service);
}

fn failure_cause(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "timeout",
        sqlx::Error::PoolClosed => "closed",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "network",
        _ => "other",
    }
}

/// `pool.acquire()` with wait time and failures recorded under `service`.
///
/// Readiness probes go through here so a saturated pool shows in the metrics.
pub async fn acquire_with_metrics(
    pool: &PgPool,
    service: &str,
) -> Result<PoolConnection<Postgres>, sqlx::Error> {
    let started = Instant::now();
    let result = pool.acquire().await;
    ACQUIRE_SECONDS
        .with_label_values(&[service])
        .observe(started.elapsed().as_secs_f64());

    if let Err(err) = &result {
        ACQUIRE_FAILURES
            .with_label_values(&[service, failure_cause(err)])
            .inc();
    }
    update_pool_metrics(pool, service);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_counts_in_use_connections() {
        let snapshot = PoolSnapshot::from_counts(7, 3, 20);
        assert_eq!(
            snapshot,
            PoolSnapshot {
                idle: 3,
                in_use: 4,
                max: 20
            }
        );
    }

    #[test]
    fn snapshot_never_reports_negative_usage() {
        // size and idle are read separately and can race
        assert_eq!(PoolSnapshot::from_counts(2, 3, 5).in_use, 0);
    }

    #[test]
    fn failure_causes() {
        assert_eq!(failure_cause(&sqlx::Error::PoolTimedOut), "timeout");
        assert_eq!(failure_cause(&sqlx::Error::PoolClosed), "closed");
        assert_eq!(failure_cause(&sqlx::Error::RowNotFound), "other");
    }
}
