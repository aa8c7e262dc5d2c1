//! Domain types for the media session.
//!
//! Everything in this module is pure data with no I/O dependencies:
//!
//! - **`media`** – local/remote media sources, tracks, and capture
//!   constraints.
//! - **`signaling`** – the three artifacts an external channel exchanges to
//!   establish a call (offer, answer, candidate) and the call state machine.

pub mod media;
pub mod signaling;
