//! Tracing setup for embedded use
//!
//! Driver test suites embed the mock in-process; this installs a fmt
//! subscriber exactly once so repeated harness setup calls stay cheap and
//! quiet. Hosts that install their own subscriber can skip this entirely.

use once_cell::sync::OnceCell;

static INIT: OnceCell<()> = OnceCell::new();

/// Install a global fmt subscriber at `INFO`. Idempotent; loses quietly if
/// another subscriber is already installed.
pub fn init() {
    init_with_level(tracing::Level::INFO);
}

/// Install a global fmt subscriber at the given level. Idempotent.
pub fn init_with_level(level: tracing::Level) {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(true)
            .try_init();
    });
}
