//! Limiter Module
//!
//! Client-side throttling for upstream calls.

mod dispatcher;

pub use dispatcher::Dispatcher;
