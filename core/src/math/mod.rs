pub mod antenna;
pub mod beam;
pub mod projection;
pub mod stats;

pub use antenna::{antenna_to_local_cartesian, local_cartesian_to_antenna, AntennaCoords};
pub use beam::beam_height_above_radar;
pub use projection::{geographic_to_local_cartesian, local_cartesian_to_geographic};
pub use stats::StatsHelper;
