//! Volume device adapters (BluOS) and the seam the controller talks through

pub mod bluos;
mod dead_time;
mod traits;

pub use dead_time::DeadTime;
pub use traits::{VolumeChange, VolumeDevice};
