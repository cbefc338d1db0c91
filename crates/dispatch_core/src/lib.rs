//! Medical-transport matching and route-chaining engine.
//!
//! Given a pool of pending transport requests (Hospital partition) and a
//! pool of agencies with units (EMS partition), this crate scores and ranks
//! candidate agencies for a single request and finds opportunities to chain
//! independent requests into one multi-stop vehicle route. All operations
//! are synchronous, stateless computations over freshly fetched partition
//! data; the engine never writes.

pub mod chaining;
pub mod matching;
pub mod model;
pub mod partitions;
pub mod routing;
pub mod scenario;
pub mod spatial;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
