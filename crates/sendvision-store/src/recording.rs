// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store metrics, recorded through the metrics-rs facade.

use metrics::{describe_counter, describe_histogram};

/// Register descriptions for every store metric.
pub fn describe_metrics() {
    describe_counter!("sendvision_store_queries_total", "Queries issued by stores");
    describe_counter!(
        "sendvision_store_stale_results_total",
        "Query results discarded because a newer generation was issued"
    );
    describe_counter!(
        "sendvision_store_query_errors_total",
        "Queries rejected by the record source"
    );
    describe_histogram!(
        "sendvision_store_query_duration_seconds",
        "Time from issuing a query to its result arriving"
    );
}

pub(crate) fn record_query(collection: &str) {
    metrics::counter!("sendvision_store_queries_total", "collection" => collection.to_string())
        .increment(1);
}

pub(crate) fn record_stale(collection: &str) {
    metrics::counter!("sendvision_store_stale_results_total", "collection" => collection.to_string())
        .increment(1);
}

pub(crate) fn record_query_error(collection: &str) {
    metrics::counter!("sendvision_store_query_errors_total", "collection" => collection.to_string())
        .increment(1);
}

pub(crate) fn record_query_duration(collection: &str, seconds: f64) {
    metrics::histogram!("sendvision_store_query_duration_seconds", "collection" => collection.to_string())
        .record(seconds);
}
