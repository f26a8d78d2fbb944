#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod presets;

pub use channel::{CodeType, MemoryChannel, StepSetting, ToneConfig};
