pub mod record;
pub mod sink;

pub use record::{GeoPoint, PointRecord};
pub use sink::{MemorySink, ProductSink};
