//! Metric instruments emitted by the service.
//!
//! Measurements go to the opentelemetry global meter; configuring a meter
//! provider and exporting the data is the embedding application's job.

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram};

/// Counters and histograms recorded along the search and query paths.
pub struct Metrics {
    /// Total number of search calls.
    pub search_requests: Counter<u64>,
    /// Total number of embedding failures.
    pub embedding_failures: Counter<u64>,
    /// End-to-end query latency in seconds.
    pub query_latency: Histogram<f64>,
    /// Completion-model latency in seconds.
    pub llm_latency: Histogram<f64>,
    /// Approximate prompt size in tokens.
    pub prompt_tokens: Histogram<u64>,
}

impl Metrics {
    /// Create the instruments on the global meter.
    pub fn new() -> Self {
        let meter = global::meter("grist-service");
        Self {
            search_requests: meter
                .u64_counter("api_search_requests_total")
                .with_description("Total number of search API calls")
                .init(),
            embedding_failures: meter
                .u64_counter("embedding_failures_total")
                .with_description("Total number of embedding failures")
                .init(),
            query_latency: meter
                .f64_histogram("ai_query_latency_seconds")
                .with_description("End-to-end query latency (seconds)")
                .init(),
            llm_latency: meter
                .f64_histogram("ai_llm_latency_seconds")
                .with_description("Completion model latency (seconds)")
                .init(),
            prompt_tokens: meter
                .u64_histogram("ai_prompt_tokens")
                .with_description("Approximate prompt size in tokens")
                .init(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Rough token estimate used for the prompt-size histogram: four
/// characters per token.
pub(crate) fn approximate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}
