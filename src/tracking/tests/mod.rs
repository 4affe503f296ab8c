//! Unit tests for workflow task tracking.

mod domain_tests;
mod service_tests;
