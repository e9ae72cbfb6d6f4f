//! `tracing-subscriber` installation, mirroring the teacher's split between
//! library crates that only ever call `tracing::{info,warn,error}` and a
//! single facade-owned subscriber installed once at the edge.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Installs a global `tracing_subscriber::fmt` subscriber filtered by
/// `RUST_LOG` (default `info`). Idempotent: later calls are no-ops, so
/// embedders that already installed their own subscriber before calling
/// into this crate won't get a panic from a second global-default set.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}
