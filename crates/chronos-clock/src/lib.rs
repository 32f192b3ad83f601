pub mod vector_clock;

pub use vector_clock::{ClockOrdering, NodeId, VectorClock};
