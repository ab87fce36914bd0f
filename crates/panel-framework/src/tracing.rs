//! # Observability & Tracing
//!
//! The runtime logs through `tracing` with structured fields. Every event
//! emitted by a panel actor carries a `panel` field with the short type name.
//!
//! - **info**: actor started, prefab loaded, instance created, opened, closed, shutdown
//! - **debug**: request received, guard rejections (`Already open`, `Already closed`)
//! - **warn**: a lifecycle call failed (`error` field holds the cause)
//!
//! ```bash
//! RUST_LOG=info cargo run -p panel-sample
//! RUST_LOG=panel_framework=debug cargo run -p panel-sample
//! ```

/// Initializes the tracing subscriber for a binary.
///
/// Uses a compact format without module paths; verbosity comes from
/// `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
