//! Performance metrics and statistics tracking for the prediction service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the serving pipeline
pub struct ServiceMetrics {
    /// Total requests served successfully
    pub requests_processed: AtomicU64,
    /// Total requests that ended in an error response
    pub errors_total: AtomicU64,
    /// Handling times per endpoint (in microseconds)
    endpoint_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Error counts per endpoint
    errors_by_endpoint: RwLock<HashMap<String, u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_processed: AtomicU64::new(0),
            errors_total: AtomicU64::new(0),
            endpoint_times: RwLock::new(HashMap::new()),
            errors_by_endpoint: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a successfully served request. Returns the running total.
    pub fn record_request(&self, endpoint: &str, handling_time: Duration) -> u64 {
        let count = self.requests_processed.fetch_add(1, Ordering::Relaxed) + 1;

        if let Ok(mut times) = self.endpoint_times.write() {
            let endpoint_times = times.entry(endpoint.to_string()).or_insert_with(Vec::new);
            endpoint_times.push(handling_time.as_micros() as u64);
            // Keep only recent samples for memory efficiency
            if endpoint_times.len() > 10000 {
                endpoint_times.drain(0..5000);
            }
        }

        count
    }

    /// Record a request that was answered with the error shape
    pub fn record_error(&self, endpoint: &str) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_endpoint) = self.errors_by_endpoint.write() {
            *by_endpoint.entry(endpoint.to_string()).or_insert(0) += 1;
        }
    }

    /// Get handling time statistics per endpoint
    pub fn get_endpoint_stats(&self) -> HashMap<String, EndpointStats> {
        let times = self.endpoint_times.read().unwrap();
        let mut stats = HashMap::new();

        for (endpoint, endpoint_times) in times.iter() {
            if endpoint_times.is_empty() {
                continue;
            }

            let mut sorted: Vec<u64> = endpoint_times.clone();
            sorted.sort();

            let sum: u64 = sorted.iter().sum();
            let count = sorted.len();

            stats.insert(
                endpoint.clone(),
                EndpointStats {
                    requests: count as u64,
                    mean_us: sum / count as u64,
                    p50_us: sorted[count / 2],
                    p99_us: sorted[(count as f64 * 0.99) as usize],
                },
            );
        }

        stats
    }

    /// Get error counts per endpoint
    pub fn get_errors_by_endpoint(&self) -> HashMap<String, u64> {
        self.errors_by_endpoint.read().unwrap().clone()
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let served = self.requests_processed.load(Ordering::Relaxed);
        let errors = self.errors_total.load(Ordering::Relaxed);
        let total = served + errors;
        let error_rate = if total > 0 {
            (errors as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        info!(
            served = served,
            errors = errors,
            error_rate = format!("{:.1}%", error_rate),
            throughput = format!("{:.1} req/s", self.get_throughput()),
            "Prediction service metrics"
        );

        for (endpoint, stats) in &self.get_endpoint_stats() {
            info!(
                endpoint = %endpoint,
                requests = stats.requests,
                mean_us = stats.mean_us,
                p50_us = stats.p50_us,
                p99_us = stats.p99_us,
                "Endpoint handling times"
            );
        }

        for (endpoint, count) in &self.get_errors_by_endpoint() {
            info!(endpoint = %endpoint, errors = count, "Endpoint errors");
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-endpoint handling time statistics
#[derive(Debug)]
pub struct EndpointStats {
    pub requests: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_request("predict-price", Duration::from_micros(100));
        metrics.record_request("predict-price", Duration::from_micros(200));
        metrics.record_request("predict-demand", Duration::from_micros(150));
        metrics.record_error("predict-disease");

        assert_eq!(metrics.requests_processed.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.errors_total.load(Ordering::Relaxed), 1);
        assert_eq!(
            metrics.get_errors_by_endpoint().get("predict-disease"),
            Some(&1)
        );
    }

    #[test]
    fn test_endpoint_stats() {
        let metrics = ServiceMetrics::new();

        metrics.record_request("predict-price", Duration::from_micros(100));
        metrics.record_request("predict-price", Duration::from_micros(300));

        let stats = metrics.get_endpoint_stats();
        let price = stats.get("predict-price").unwrap();

        assert_eq!(price.requests, 2);
        assert_eq!(price.mean_us, 200);
    }

    #[test]
    fn test_request_count_returned() {
        let metrics = ServiceMetrics::new();

        assert_eq!(
            metrics.record_request("predict-demand", Duration::from_micros(50)),
            1
        );
        assert_eq!(
            metrics.record_request("predict-demand", Duration::from_micros(50)),
            2
        );
    }
}
