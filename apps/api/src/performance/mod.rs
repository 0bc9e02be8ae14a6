pub mod handlers;
pub mod metrics;
pub mod reconcile;
pub mod report;
