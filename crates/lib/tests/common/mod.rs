//! Shared helpers for the `prodmatch` integration tests.

#![allow(unused)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes a tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();
    });
}
