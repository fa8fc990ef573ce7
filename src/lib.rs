#![doc(test(attr(deny(warnings))))]

//! Household Core implements the monthly ledger aggregation engine behind a
//! household finance tracker: cash-flow kind classification, recurring
//! expense expansion with per-month overrides, virtual/real deduplication,
//! effective-dated income resolution, and one aggregated ledger row per
//! month for every downstream view.

pub mod core;
pub mod domain;
pub mod errors;
pub mod ingest;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Household Core tracing initialized.");
    });
}
