//! End-to-end pipeline suite entry point.

mod full_stack;
mod scenarios;
