//! Main application state and service coordination
//!
//! This module contains the production AppState that wires the rating book,
//! call dispatch, metrics endpoints, and background tasks together.

use crate::config::AppConfig;
use crate::host::context::{AnonymousCallContext, StaticCallContext};
use crate::host::dispatch::CallDispatcher;
use crate::metrics::health::HealthServerConfig;
use crate::metrics::{HealthServer, MetricsCollector, MetricsService};
use crate::store::book::RatingBook;
use crate::store::ledger::InMemoryLedger;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// The process-wide rating book singleton
    book: Arc<RatingBook>,

    /// Metrics service for monitoring and health checks
    metrics_service: Arc<MetricsService>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing course-ledger service");
        info!(
            "Configuration: service={}, ledger_prefix={}",
            config.service.name, config.store.key_prefix
        );

        // Initialize metrics service
        let metrics_service = Self::initialize_metrics(&config)?;

        // Initialize the ledger and the book over it; the book lives for the
        // whole deployment, the host never tears it down explicitly
        let ledger = Arc::new(InMemoryLedger::new(config.store.key_prefix.clone()));
        let book = Arc::new(RatingBook::new(ledger));

        Ok(Self {
            config,
            book,
            metrics_service,
            background_tasks: Vec::new(),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Start all background services
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting course-ledger service");

        // Mark as running
        *self.is_running.write().await = true;

        // Start metrics service first
        self.start_metrics_service().await?;

        // Start background tasks
        self.start_background_tasks().await?;

        info!("Course-ledger service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of course-ledger service");

        // Mark as not running
        *self.is_running.write().await = false;

        // Stop background tasks
        self.stop_background_tasks().await;

        // Stop metrics service
        info!("Stopping metrics service...");
        if let Err(e) = self.metrics_service.stop().await {
            warn!("Failed to stop metrics service: {}", e);
        }

        // Get final statistics
        let final_stats = self
            .book
            .stats()
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;

        info!("Final service statistics: {:?}", final_stats);
        info!("Course-ledger service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get the rating book singleton
    pub fn book(&self) -> Arc<RatingBook> {
        self.book.clone()
    }

    /// Get metrics service
    pub fn metrics_service(&self) -> Arc<MetricsService> {
        self.metrics_service.clone()
    }

    /// Bind a dispatcher for calls attested to the given principal
    ///
    /// This is how the host attaches per-call identity: one dispatcher per
    /// attested sender, all sharing the singleton book.
    pub fn dispatcher_for(&self, sender: &str) -> CallDispatcher {
        CallDispatcher::new(
            self.book.clone(),
            Arc::new(StaticCallContext::new(sender)),
            self.metrics_service.collector(),
        )
    }

    /// Bind a dispatcher with no attested identity (queries only)
    pub fn anonymous_dispatcher(&self) -> CallDispatcher {
        CallDispatcher::new(
            self.book.clone(),
            Arc::new(AnonymousCallContext),
            self.metrics_service.collector(),
        )
    }

    /// Initialize metrics service
    fn initialize_metrics(config: &AppConfig) -> Result<Arc<MetricsService>, ServiceError> {
        info!(
            "Initializing metrics service on port {}",
            config.service.metrics_port
        );

        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let health_config = HealthServerConfig {
            port: config.service.metrics_port,
            host: "0.0.0.0".to_string(),
        };

        let health_server = Arc::new(HealthServer::new(health_config, metrics_collector.clone()));
        let metrics_service = Arc::new(MetricsService::new(metrics_collector, health_server));

        Ok(metrics_service)
    }

    /// Start metrics service
    async fn start_metrics_service(&mut self) -> Result<(), ServiceError> {
        info!("Starting metrics and health endpoints");

        let metrics_service = self.metrics_service.clone();
        let port = self.config.service.metrics_port;

        let metrics_handle = tokio::spawn(async move {
            if let Err(e) = metrics_service.start().await {
                error!("Metrics service failed: {}", e);
            } else {
                info!("Metrics service task completed");
            }
        });

        self.background_tasks.push(metrics_handle);

        // Give the server a moment to start up
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        info!("Metrics service started on port {}", port);
        Ok(())
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(&mut self) -> Result<(), ServiceError> {
        info!("Starting background maintenance tasks...");

        // Book stats -> metrics gauges task
        let stats_task = {
            let book = self.book.clone();
            let metrics_collector = self.metrics_service.collector();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(30));
                info!("Book stats update task started");

                while *is_running.read().await {
                    interval.tick().await;

                    match book.stats() {
                        Ok(stats) => {
                            debug!(
                                "Updating metrics - records: {}, submitted: {}, updated: {}",
                                stats.records_total, stats.ratings_submitted, stats.ratings_updated
                            );
                            metrics_collector.update_from_book_stats(&stats);
                        }
                        Err(e) => {
                            warn!("Failed to get book stats for metrics update: {}", e);
                        }
                    }
                }

                info!("Book stats update task stopped");
            })
        };

        // Service health metrics task
        let health_metrics_task = {
            let metrics_collector = self.metrics_service.collector();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(60));
                let start_time = tokio::time::Instant::now();
                info!("Health metrics task started");

                while *is_running.read().await {
                    interval.tick().await;

                    let uptime_seconds = start_time.elapsed().as_secs() as i64;
                    metrics_collector
                        .service()
                        .uptime_seconds
                        .set(uptime_seconds);

                    metrics_collector.update_health_status(2); // 2 = healthy
                    metrics_collector.update_component_health("rating_book", true);
                    metrics_collector.update_component_health("metrics", true);
                }

                info!("Health metrics task stopped");
            })
        };

        self.background_tasks.push(stats_task);
        self.background_tasks.push(health_metrics_task);

        info!("Background maintenance tasks started successfully");
        Ok(())
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&mut self) {
        let task_count = self.background_tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);

        for (i, task) in self.background_tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        // Give tasks time to clean up gracefully
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        info!("All {} background tasks stopped", task_count);
    }
}
