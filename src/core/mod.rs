pub mod alerts;
pub mod config;
pub mod ingest;
pub mod model;
pub mod notifications;
