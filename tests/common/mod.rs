//! Shared helpers for integration tests.

use std::sync::Once;

use metrica::ast::Declaration;
use metrica::ast::build::program;
use metrica::diagnostics::CompileError;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Route checker logs to the test harness. Filter with `RUST_LOG=metrica=trace`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_test_writer()
            .try_init();
    });
}

pub fn check_decls(declarations: Vec<Declaration>) -> Vec<CompileError> {
    init_tracing();
    metrica::analyze(&program(declarations)).errors
}

pub fn messages(errors: &[CompileError]) -> Vec<&str> {
    errors.iter().map(|e| e.message.as_str()).collect()
}
