/// Audio effects module
///
/// Volume shaping applied on top of the output backend: category levels
/// and tick-driven fade-outs.

pub mod fade;
pub mod volume;

pub use fade::{FadeEffect, FadeScheduler, FadeStep};
pub use volume::{CategoryVolumes, VolumeEffect};
