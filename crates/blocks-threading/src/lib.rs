#![doc = include_str!("../README.md")]

pub mod cancellation_token;
mod thread_bound_runner;

pub use thread_bound_runner::{CallError, ThreadBoundRunner};
