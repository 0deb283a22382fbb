use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token lifecycle
    pub token_probes: IntCounterVec,
    pub token_strategy_attempts: IntCounterVec,
    pub token_refresh_phases: IntCounterVec,
    pub token_refresh_duration: HistogramVec,
    pub token_persist_failures: IntCounter,
    pub token_last_refresh_unix: IntGauge,

    // Webhook / leads
    pub webhook_requests: IntCounterVec,
    pub leads_processed: IntCounterVec,
    pub crm_duration: HistogramVec,

    // Config/runtime
    pub config_parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("leadgen_relay".into()), None)
            .expect("static registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token lifecycle
            token_probes: IntCounterVec::new(Opts::new("token_probes_total", "Liveness probes by credential role and result"), &["role", "result"]).unwrap(),
            token_strategy_attempts: IntCounterVec::new(Opts::new("token_strategy_attempts_total", "Acquisition strategy attempts by outcome"), &["strategy", "result"]).unwrap(),
            token_refresh_phases: IntCounterVec::new(Opts::new("token_refresh_phases_total", "Refresh state machine phase entries"), &["phase"]).unwrap(),
            token_refresh_duration: HistogramVec::new(HistogramOpts::new("token_refresh_duration_seconds", "get_valid_token duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["outcome"]).unwrap(),
            token_persist_failures: IntCounter::new("token_persist_failures_total", "Failed env file rewrites").unwrap(),
            token_last_refresh_unix: IntGauge::new("token_last_refresh_unix_seconds", "Unix time of the last successful mint").unwrap(),

            // Webhook / leads
            webhook_requests: IntCounterVec::new(Opts::new("webhook_requests_total", "Webhook requests by method and status"), &["method", "status"]).unwrap(),
            leads_processed: IntCounterVec::new(Opts::new("leads_processed_total", "Leads by processing result"), &["result"]).unwrap(),
            crm_duration: HistogramVec::new(HistogramOpts::new("crm_forward_duration_seconds", "CRM forwarding time").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["result"]).unwrap(),

            // Config/runtime
            config_parse_failures: IntCounter::new("config_parse_failures_total", "Config files that failed to parse").unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_probes.clone())).unwrap();
        reg.register(Box::new(metrics.token_strategy_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_phases.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_persist_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_last_refresh_unix.clone())).unwrap();
        reg.register(Box::new(metrics.webhook_requests.clone())).unwrap();
        reg.register(Box::new(metrics.leads_processed.clone())).unwrap();
        reg.register(Box::new(metrics.crm_duration.clone())).unwrap();
        reg.register(Box::new(metrics.config_parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
