//! Shared utilities.
//!
//! Currently only test helpers: an in-memory repository for exercising the
//! resolution core without a real git checkout.
