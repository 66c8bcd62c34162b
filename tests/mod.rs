//! Integration tests for the One Pace addon
//!
//! Tests are organized by component:
//! - catalog_test: Episode registry lookups
//! - torbox_test: Torbox API client (mockito)
//! - resolver_test: Resolution workflow against a scripted debrid service
//! - server_test: HTTP dispatcher end to end
//!
//! Shared fixtures live in `common/`.

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
