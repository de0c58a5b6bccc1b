use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Default Prometheus histogram buckets, in seconds.
pub const LATENCY_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

#[derive(Debug, Clone, Default)]
struct Histogram {
    /// Per-bucket (non-cumulative) counts; the last slot is `+Inf`.
    buckets: [u64; LATENCY_BUCKETS.len() + 1],
    sum: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, seconds: f64) {
        let idx = LATENCY_BUCKETS
            .iter()
            .position(|&le| seconds <= le)
            .unwrap_or(LATENCY_BUCKETS.len());
        self.buckets[idx] += 1;
        self.sum += seconds;
        self.count += 1;
    }
}

/// Request counter, latency histogram and prediction counter of the
/// inference service.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    requests: Mutex<BTreeMap<(String, String), u64>>,
    latency: Mutex<BTreeMap<String, Histogram>>,
    predictions: Mutex<BTreeMap<String, u64>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, method: &str, endpoint: &str) {
        *lock(&self.requests)
            .entry((method.to_string(), endpoint.to_string()))
            .or_insert(0) += 1;
    }

    pub fn observe_latency(&self, endpoint: &str, elapsed: Duration) {
        lock(&self.latency)
            .entry(endpoint.to_string())
            .or_default()
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_prediction(&self, prediction: &str) {
        *lock(&self.predictions)
            .entry(prediction.to_string())
            .or_insert(0) += 1;
    }

    pub fn request_count(&self, method: &str, endpoint: &str) -> u64 {
        lock(&self.requests)
            .get(&(method.to_string(), endpoint.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn latency_count(&self, endpoint: &str) -> u64 {
        lock(&self.latency).get(endpoint).map_or(0, |h| h.count)
    }

    pub fn prediction_count(&self, prediction: &str) -> u64 {
        lock(&self.predictions).get(prediction).copied().unwrap_or(0)
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# HELP app_request_count_total Total number of requests to the app");
        let _ = writeln!(out, "# TYPE app_request_count_total counter");
        for ((method, endpoint), value) in lock(&self.requests).iter() {
            let _ = writeln!(
                out,
                "app_request_count_total{{method=\"{}\",endpoint=\"{}\"}} {value}",
                escape(method),
                escape(endpoint)
            );
        }

        let _ = writeln!(out, "# HELP app_request_latency_seconds Latency of requests in seconds");
        let _ = writeln!(out, "# TYPE app_request_latency_seconds histogram");
        for (endpoint, histogram) in lock(&self.latency).iter() {
            let endpoint = escape(endpoint);
            let mut cumulative = 0;
            for (i, count) in histogram.buckets.iter().enumerate() {
                cumulative += count;
                let le = LATENCY_BUCKETS
                    .get(i)
                    .map_or_else(|| "+Inf".to_string(), |b| b.to_string());
                let _ = writeln!(
                    out,
                    "app_request_latency_seconds_bucket{{endpoint=\"{endpoint}\",le=\"{le}\"}} {cumulative}"
                );
            }
            let _ = writeln!(
                out,
                "app_request_latency_seconds_sum{{endpoint=\"{endpoint}\"}} {}",
                histogram.sum
            );
            let _ = writeln!(
                out,
                "app_request_latency_seconds_count{{endpoint=\"{endpoint}\"}} {}",
                histogram.count
            );
        }

        let _ = writeln!(out, "# HELP model_prediction_count_total Count of predictions for each class");
        let _ = writeln!(out, "# TYPE model_prediction_count_total counter");
        for (prediction, value) in lock(&self.predictions).iter() {
            let _ = writeln!(
                out,
                "model_prediction_count_total{{prediction=\"{}\"}} {value}",
                escape(prediction)
            );
        }

        out
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment_per_label() {
        let metrics = ServiceMetrics::new();
        metrics.record_request("POST", "/predict");
        metrics.record_request("POST", "/predict");
        metrics.record_request("GET", "/");
        metrics.record_prediction("1");

        assert_eq!(metrics.request_count("POST", "/predict"), 2);
        assert_eq!(metrics.request_count("GET", "/"), 1);
        assert_eq!(metrics.request_count("GET", "/predict"), 0);
        assert_eq!(metrics.prediction_count("1"), 1);
        assert_eq!(metrics.prediction_count("0"), 0);
    }

    #[test]
    fn test_histogram_buckets_are_cumulative() {
        let metrics = ServiceMetrics::new();
        metrics.observe_latency("/", Duration::from_millis(3));
        metrics.observe_latency("/", Duration::from_millis(300));
        metrics.observe_latency("/", Duration::from_secs(30));

        let text = metrics.render();
        assert!(text.contains("app_request_latency_seconds_bucket{endpoint=\"/\",le=\"0.005\"} 1\n"));
        assert!(text.contains("app_request_latency_seconds_bucket{endpoint=\"/\",le=\"0.5\"} 2\n"));
        assert!(text.contains("app_request_latency_seconds_bucket{endpoint=\"/\",le=\"10\"} 2\n"));
        assert!(text.contains("app_request_latency_seconds_bucket{endpoint=\"/\",le=\"+Inf\"} 3\n"));
        assert!(text.contains("app_request_latency_seconds_count{endpoint=\"/\"} 3\n"));
        assert_eq!(metrics.latency_count("/"), 3);
    }

    #[test]
    fn test_render_lists_every_family() {
        let metrics = ServiceMetrics::new();
        metrics.record_request("GET", "/");
        metrics.record_prediction("0");
        let text = metrics.render();
        assert!(text.contains("# TYPE app_request_count_total counter"));
        assert!(text.contains("app_request_count_total{method=\"GET\",endpoint=\"/\"} 1"));
        assert!(text.contains("# TYPE app_request_latency_seconds histogram"));
        assert!(text.contains("model_prediction_count_total{prediction=\"0\"} 1"));
    }
}
