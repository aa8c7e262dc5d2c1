//! Application layer for the media crate.
//!
//! One use case lives here: [`call_session::CallSession`], the per-call state
//! machine. It depends only on the `devices` and `transport` trait seams and
//! on domain types, so the whole call lifecycle is unit-testable against the
//! mock infrastructure.

pub mod call_session;
