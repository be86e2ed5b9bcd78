//! End-to-end workflow tests against the `layoutd` binary

mod check;
mod compile;
mod config;
