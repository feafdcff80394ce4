//! # IPC Router Test Suite
//!
//! Cross-component integration flows: port lifecycles, name resolution,
//! and remote delivery over loopback transports. Unit tests live next to
//! the code they cover inside the `ipc-router` crate; everything here
//! exercises several components together through the public API.

pub mod integration;
