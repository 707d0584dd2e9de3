/// Prometheus metrics for the multiplexing layer
///
/// Metrics are registered in the default registry on first use and can be
/// exported in text format with [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{
    histogram_opts, opts, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    /// Total number of requests submitted on transaction streams
    ///
    /// Labels:
    /// - kind: single, multiple or continue
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!(
            "glink_requests_total",
            "Total number of requests submitted on transaction streams"
        ),
        &["kind"]
    )
    .unwrap();

    /// Number of requests registered and awaiting their terminal response
    pub static ref INFLIGHT_REQUESTS: IntGauge = register_int_gauge!(
        opts!(
            "glink_inflight_requests",
            "Number of requests awaiting their terminal response"
        )
    )
    .unwrap();

    /// Total number of frames written to transaction streams
    pub static ref FRAMES_SENT_TOTAL: IntCounter = register_int_counter!(
        opts!(
            "glink_frames_sent_total",
            "Total number of frames written to transaction streams"
        )
    )
    .unwrap();

    /// Requests per outbound frame
    ///
    /// Buckets: 1, 2, 4, 8, 16, 32, 64, 128, 256, 512
    pub static ref FRAME_REQUESTS: Histogram = register_histogram!(
        histogram_opts!(
            "glink_frame_requests",
            "Number of requests carried by one outbound frame",
            vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0, 256.0, 512.0]
        )
    )
    .unwrap();

    /// Number of transaction streams currently open
    pub static ref OPEN_TRANSACTIONS: IntGauge = register_int_gauge!(
        opts!(
            "glink_open_transactions",
            "Number of transaction streams currently open"
        )
    )
    .unwrap();

    /// Total number of transaction streams closed, by reason
    ///
    /// Labels:
    /// - reason: requested, remote_completed, remote_error, unknown_request_id, worker_shutdown
    pub static ref TRANSACTIONS_CLOSED_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!(
            "glink_transactions_closed_total",
            "Total number of transaction streams closed"
        ),
        &["reason"]
    )
    .unwrap();
}

/// Encode metrics in Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_registered_metrics() {
        REQUESTS_TOTAL.with_label_values(&["single"]).inc();
        FRAMES_SENT_TOTAL.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("glink_requests_total"));
        assert!(text.contains("glink_frames_sent_total"));
    }
}
