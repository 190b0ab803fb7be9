//! Request metrics for the generate pipeline
//!
//! Metrics are emitted through the `metrics` facade and are no-ops unless a
//! recorder is installed (see [`init_metrics_exporter`]).
//!
//! # Metrics
//!
//! - `codeproxy_exchanges_total`: Counter of completed exchanges by message type
//! - `codeproxy_exchange_duration_seconds`: Histogram of exchange latency by outcome
//! - `codeproxy_exchange_errors_total`: Counter of failed exchanges by error kind
//! - `codeproxy_exchanges_active`: Gauge of in-flight exchanges
//! - `codeproxy_provider_attempts_total`: Counter of provider attempts by status
//!
//! # Examples
//!
//! ```
//! use codeproxy::metrics::ExchangeMetrics;
//! use codeproxy::exchange::MessageType;
//!
//! let metrics = ExchangeMetrics::start();
//! metrics.record_success(MessageType::Conversation);
//! ```

use crate::exchange::MessageType;
use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};
use std::cell::Cell;
use std::time::Instant;

/// Metrics guard for a single exchange
///
/// Increments the active gauge on creation; recording an outcome (or
/// dropping the guard) decrements it exactly once.
#[derive(Debug)]
pub struct ExchangeMetrics {
    start: Instant,
    recorded: Cell<bool>,
}

impl ExchangeMetrics {
    /// Start tracking an exchange
    pub fn start() -> Self {
        increment_gauge!("codeproxy_exchanges_active", 1.0);

        Self {
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Record a successful exchange
    pub fn record_success(&self, message_type: MessageType) {
        if self.recorded.replace(true) {
            return;
        }

        let label = match message_type {
            MessageType::Conversation => "conversation",
            MessageType::Code => "code",
        };

        increment_counter!("codeproxy_exchanges_total", "message_type" => label);
        histogram!(
            "codeproxy_exchange_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "outcome" => "success"
        );
        decrement_gauge!("codeproxy_exchanges_active", 1.0);
    }

    /// Record a failed exchange with an error kind label
    pub fn record_error(&self, kind: &str) {
        if self.recorded.replace(true) {
            return;
        }

        increment_counter!("codeproxy_exchange_errors_total", "kind" => kind.to_string());
        histogram!(
            "codeproxy_exchange_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "outcome" => "error"
        );
        decrement_gauge!("codeproxy_exchanges_active", 1.0);
    }

    /// Whether an outcome has been recorded
    pub fn is_recorded(&self) -> bool {
        self.recorded.get()
    }

    /// Time since the exchange started
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for ExchangeMetrics {
    fn drop(&mut self) {
        if !self.recorded.get() {
            decrement_gauge!("codeproxy_exchanges_active", 1.0);
        }
    }
}

/// Count one provider attempt, labeled by HTTP status or failure kind
pub fn record_provider_attempt(status: &str) {
    increment_counter!("codeproxy_provider_attempts_total", "status" => status.to_string());
}

/// Initializes the metrics exporter for Prometheus
///
/// Only has an effect when compiled with the `prometheus` feature.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_success_marks_recorded() {
        let metrics = ExchangeMetrics::start();
        assert!(!metrics.is_recorded());
        metrics.record_success(MessageType::Code);
        assert!(metrics.is_recorded());
    }

    #[test]
    fn test_record_error_marks_recorded() {
        let metrics = ExchangeMetrics::start();
        metrics.record_error("timeout");
        assert!(metrics.is_recorded());
    }

    #[test]
    fn test_second_record_is_ignored() {
        let metrics = ExchangeMetrics::start();
        metrics.record_error("provider");
        metrics.record_success(MessageType::Conversation);
        assert!(metrics.is_recorded());
    }

    #[test]
    fn test_elapsed_is_small() {
        let metrics = ExchangeMetrics::start();
        assert!(metrics.elapsed().as_millis() < 100);
    }

    #[test]
    fn test_drop_without_recording() {
        let _metrics = ExchangeMetrics::start();
    }

    #[test]
    fn test_init_metrics_exporter_is_safe() {
        init_metrics_exporter();
    }
}
