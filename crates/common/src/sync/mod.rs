//! Synchronization primitives
//!
//! ## Submodules
//!
//! - **`single_flight`**: collapse concurrent requests for the same
//!   operation into one execution whose outcome is shared with every waiter

pub mod single_flight;

pub use single_flight::{Flight, FlightAbandoned, FlightGuard, FlightWaiter, SingleFlight};
