//! Shared test setup: install a tracing subscriber exactly once per test
//! process. Call [`setup`] at the top of tests whose traces you want to see
//! with `RUST_LOG=trace cargo test -- --nocapture`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Once;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber, once per process.
///
/// The filter comes from `RUST_LOG` when set and parseable, otherwise
/// everything at trace level. Output goes through the libtest capture
/// writer so passing tests stay quiet.
pub fn setup() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .ok()
            .and_then(|spec| spec.parse::<Targets>().ok())
            .unwrap_or_else(|| Targets::new().with_default(LevelFilter::TRACE));

        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .with(filter)
            .init();
    });
}
