//! Global `tokio` runtime, grounded on the teacher's `runtime()` helper
//! (`src/lib.rs` calls `runtime().spawn_blocking(...)` to push the fs-event
//! watcher and processor onto dedicated blocking threads rather than
//! requiring every caller to be inside an async context). `shardsearch`'s
//! own background work — the shard directory watcher — is likewise
//! blocking, sleep-and-poll work, so it runs the same way.

use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;

static RUNTIME: OnceCell<Runtime> = OnceCell::new();

pub fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        Runtime::new().expect("failed to start shardsearch's background tokio runtime")
    })
}
