//! Route to stop matching.
//!
//! Everything in here is pure: callers hand in the stop positions, a polyline and the
//! tolerance policy and get matched segments back. Nothing is fetched, cached across
//! runs or persisted.
pub mod assembler;
pub mod coordinate;
pub mod route_matcher;
pub mod stop_index;

pub use assembler::*;
pub use coordinate::*;
pub use route_matcher::*;
pub use stop_index::*;
