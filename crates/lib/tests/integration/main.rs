//! Integration tests for mbt-lib against real git repositories.


mod builder_tests;
mod strategies_tests;
