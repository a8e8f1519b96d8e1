//! Shared test scaffolding for the rowkv workspace.
//!
//! The table layer emits `tracing` events: index fan-out at debug level
//! when a table is created, and warn-level events when a secondary hit
//! finds no primary row during a join. Test binaries link this crate with
//! the `auto-init` feature to get those events on stderr, filtered for the
//! rowkv targets; `RUST_LOG` overrides the defaults as usual.

use std::sync::Once;

static INIT: Once = Once::new();

/// Default directives: quiet except for the rowkv crates, whose events are
/// the ones a failing engine test needs on screen.
const DEFAULT_DIRECTIVES: &str = "warn,rowkv_table=debug";

/// Initialize tracing for test binaries. Safe to call multiple times.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
        // keep targets visible so a warn can be traced back to its crate
        fmt().with_env_filter(filter).with_target(true).init();
    });
}

#[cfg(feature = "auto-init")]
mod auto {
    // Runs at binary init time so individual tests need no setup call.
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}
