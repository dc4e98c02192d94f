//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the course-ledger service
//! using Prometheus metrics.

use crate::store::book::RatingBookStats;
use anyhow::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the ledger service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Dispatched-call metrics
    call_metrics: CallMetrics,

    /// Rating book metrics
    book_metrics: BookMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,
}

/// Dispatched-call metrics
#[derive(Clone)]
pub struct CallMetrics {
    /// Total calls dispatched by method and status
    pub calls_total: IntCounterVec,

    /// Total failed calls by method
    pub call_errors_total: IntCounterVec,
}

/// Rating book metrics
#[derive(Clone)]
pub struct BookMetrics {
    /// First-time submissions since service start
    pub ratings_submitted: IntGauge,

    /// In-place updates since service start
    pub ratings_updated: IntGauge,

    /// Queries served since service start
    pub queries_served: IntGauge,

    /// Records currently in the ledger
    pub ledger_records: IntGauge,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Call dispatch duration by method
    pub call_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let call_metrics = CallMetrics::new(&registry)?;
        let book_metrics = BookMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            call_metrics,
            book_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get call metrics
    pub fn calls(&self) -> &CallMetrics {
        &self.call_metrics
    }

    /// Get rating book metrics
    pub fn book(&self) -> &BookMetrics {
        &self.book_metrics
    }

    /// Get performance metrics
    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a dispatched call
    pub fn record_call(&self, method: &str, success: bool, duration: Duration) {
        let status = if success { "success" } else { "error" };

        self.call_metrics
            .calls_total
            .with_label_values(&[method, status])
            .inc();

        if !success {
            self.call_metrics
                .call_errors_total
                .with_label_values(&[method])
                .inc();
        }

        self.performance_metrics
            .call_duration
            .with_label_values(&[method])
            .observe(duration.as_secs_f64());
    }

    /// Update gauges from a rating book stats snapshot
    pub fn update_from_book_stats(&self, stats: &RatingBookStats) {
        self.book_metrics
            .ratings_submitted
            .set(stats.ratings_submitted as i64);
        self.book_metrics
            .ratings_updated
            .set(stats.ratings_updated as i64);
        self.book_metrics
            .queries_served
            .set(stats.queries_served as i64);
        self.book_metrics
            .ledger_records
            .set(stats.records_total as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("course_ledger_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "course_ledger_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("course_ledger_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
        })
    }
}

impl CallMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let calls_total = IntCounterVec::new(
            Opts::new("course_ledger_calls_total", "Total calls dispatched"),
            &["method", "status"],
        )?;
        registry.register(Box::new(calls_total.clone()))?;

        let call_errors_total = IntCounterVec::new(
            Opts::new("course_ledger_call_errors_total", "Total failed calls"),
            &["method"],
        )?;
        registry.register(Box::new(call_errors_total.clone()))?;

        Ok(Self {
            calls_total,
            call_errors_total,
        })
    }
}

impl BookMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let ratings_submitted = IntGauge::new(
            "course_ledger_ratings_submitted",
            "First-time rating submissions since service start",
        )?;
        registry.register(Box::new(ratings_submitted.clone()))?;

        let ratings_updated = IntGauge::new(
            "course_ledger_ratings_updated",
            "In-place rating updates since service start",
        )?;
        registry.register(Box::new(ratings_updated.clone()))?;

        let queries_served = IntGauge::new(
            "course_ledger_queries_served",
            "Queries served since service start",
        )?;
        registry.register(Box::new(queries_served.clone()))?;

        let ledger_records = IntGauge::new(
            "course_ledger_records",
            "Records currently stored in the ledger",
        )?;
        registry.register(Box::new(ledger_records.clone()))?;

        Ok(Self {
            ratings_submitted,
            ratings_updated,
            queries_served,
            ledger_records,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let call_duration = HistogramVec::new(
            HistogramOpts::new(
                "course_ledger_call_duration_seconds",
                "Call dispatch duration",
            ),
            &["method"],
        )?;
        registry.register(Box::new(call_duration.clone()))?;

        Ok(Self { call_duration })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_creation_and_registry() {
        let collector = MetricsCollector::new().expect("Failed to create collector");
        assert!(collector.registry().gather().len() > 0);
    }

    #[test]
    fn test_record_call_increments_counters() {
        let collector = MetricsCollector::new().expect("Failed to create collector");

        collector.record_call("addRating", true, Duration::from_millis(1));
        collector.record_call("addRating", false, Duration::from_millis(1));

        assert_eq!(
            collector
                .calls()
                .calls_total
                .with_label_values(&["addRating", "success"])
                .get(),
            1
        );
        assert_eq!(
            collector
                .calls()
                .call_errors_total
                .with_label_values(&["addRating"])
                .get(),
            1
        );
    }

    #[test]
    fn test_update_from_book_stats() {
        let collector = MetricsCollector::new().expect("Failed to create collector");

        let stats = RatingBookStats {
            ratings_submitted: 3,
            ratings_updated: 1,
            queries_served: 7,
            records_total: 3,
        };
        collector.update_from_book_stats(&stats);

        assert_eq!(collector.book().ratings_submitted.get(), 3);
        assert_eq!(collector.book().ratings_updated.get(), 1);
        assert_eq!(collector.book().queries_served.get(), 7);
        assert_eq!(collector.book().ledger_records.get(), 3);
    }

    #[test]
    fn test_timer_measures_elapsed() {
        let collector = MetricsCollector::new().expect("Failed to create collector");
        let timer = collector.start_timer();
        let duration = timer.stop();
        assert!(duration >= Duration::ZERO);
    }
}
