use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Ingestion attempts by outcome (success, or the error kind).
    pub static ref POST_INGESTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posting_ingestions_total",
        "Post ingestion attempts segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register posting_ingestions_total");

    /// Detector calls that degraded to an empty tag set (error, timeout).
    pub static ref LABEL_DETECTION_DEGRADED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posting_label_detection_degraded_total",
        "Label detections degraded to an empty tag set segmented by reason",
        &["reason"]
    )
    .expect("failed to register posting_label_detection_degraded_total");

    /// Tag resolutions that had to re-fetch after losing an insert race.
    pub static ref TAG_RESOLUTION_RETRIES_TOTAL: IntCounter = register_int_counter!(
        "posting_tag_resolution_retries_total",
        "Tag resolution retries after losing a concurrent insert race"
    )
    .expect("failed to register posting_tag_resolution_retries_total");

    /// Post transactions re-run from the start after an abort or outage.
    pub static ref POST_TRANSACTION_RETRIES_TOTAL: IntCounter = register_int_counter!(
        "posting_post_transaction_retries_total",
        "Post transactions retried with a fresh transaction"
    )
    .expect("failed to register posting_post_transaction_retries_total");

    /// Uploaded blobs left without a post after a database failure.
    pub static ref ORPHANED_BLOBS_TOTAL: IntCounter = register_int_counter!(
        "posting_orphaned_blobs_total",
        "Blobs uploaded whose post transaction did not commit"
    )
    .expect("failed to register posting_orphaned_blobs_total");

    /// Follow/like edge writes (edge, action, outcome).
    pub static ref GRAPH_EDGE_WRITES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posting_graph_edge_writes_total",
        "Social graph edge writes segmented by edge, action and outcome",
        &["edge", "action", "outcome"]
    )
    .expect("failed to register posting_graph_edge_writes_total");
}
