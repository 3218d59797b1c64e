mod propagation_tests;

use crate::core::execution::config::SessionConfig;
use crate::core::session::Session;

/// Route engine logs through the test harness; `RUST_LOG=debug` shows them
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session(rows: usize, cols: usize) -> Session {
    init_logging();
    Session::new(SessionConfig::new().with_grid(rows, cols))
}
