//! Infrastructure seams for the media session.
//!
//! Both seams follow the same pattern: a trait the application layer depends
//! on, plus a mock implementation used by tests and headless development.
//!
//! - **`devices`** – capture hardware (camera, microphone, display).
//! - **`transport`** – the real-time peer connection.

pub mod devices;
pub mod transport;
