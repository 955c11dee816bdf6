//! Per-tool and global configuration (spec.md §3 `ProcessSpec`/`GlobalSpec`).

mod global;
mod process;
mod voxel_profile;

pub use global::{GlobalSpec, ManualScheduleEntry, SchedulingMode};
pub use process::{InfillingMode, ProcessSpec};
pub use voxel_profile::VoxelProfile;
