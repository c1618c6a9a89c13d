//! Integration test helpers for principal-ext.

use std::sync::Once;

use principal_ext::prelude::*;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Domain context used across tests.
pub fn test_context() -> PrincipalContext {
    PrincipalContext::domain("example.com")
}

/// A saved principal with the given pre-existing values.
pub fn principal_with(
    attribute: &str,
    values: Vec<ExtensionValue>,
) -> UserExtPrincipal<MemoryEntry> {
    init_test_logging();
    let entry = MemoryEntry::new("CN=jdoe,CN=Users,DC=example,DC=com").with_values(attribute, values);
    UserExtPrincipal::new(entry)
}
