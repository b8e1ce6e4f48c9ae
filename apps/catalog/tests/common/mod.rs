#![allow(dead_code)]

// tests/common/mod.rs
use serde_json::Value;

// Logging is auto-installed for every test binary that declares `mod common;`
#[ctor::ctor]
fn init_logging() {
    catalog_test_support::logging::init();
}

/// Check the problem+json body carries `code` and `status`.
pub fn assert_problem(json: &Value, status: u16, code: &str) {
    assert_eq!(json["status"].as_u64(), Some(u64::from(status)), "{json}");
    assert_eq!(json["code"].as_str(), Some(code), "{json}");
    assert!(json["trace_id"].as_str().is_some_and(|t| !t.is_empty()), "{json}");
}
