//! Loads module

mod distributed;
mod node_load;

pub use distributed::{CoordSystem, DistributedLoad};
pub use node_load::NodalLoads;
