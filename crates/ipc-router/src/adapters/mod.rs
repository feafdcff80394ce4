//! Concrete adapters: the configured-out router stub and an in-process
//! transport for wiring routers together without hardware links.

pub mod disabled;
pub mod loopback;

pub use disabled::DisabledRouter;
pub use loopback::LoopbackTransport;
