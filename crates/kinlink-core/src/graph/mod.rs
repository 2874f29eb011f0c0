mod memory;
mod store;
mod types;

pub use memory::MemoryLinkGraph;
pub use store::LinkGraph;
pub use types::{GraphEdge, OpenTriangle, TRIANGLE_PROVENANCE};
