use sequential_storage::map::StorageItem;
use serde::{Deserialize, Serialize};

/// Memory channels occupy slots 0..=199; the per-band frequency channels
/// follow immediately after.
pub const MR_CHANNEL_COUNT: u16 = 200;
pub const FREQ_CHANNEL_FIRST: u16 = 200;

pub fn is_mr_channel(channel: u16) -> bool {
    channel < MR_CHANNEL_COUNT
}

/// Squelch code family reported by the external tone decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodeType {
    None,
    Ctcss,
    Dcs,
    ReverseDcs,
}

/// A decoded squelch configuration. The code index is opaque to this crate;
/// it is copied verbatim from the detector into the channel record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToneConfig {
    pub code_type: CodeType,
    pub code: u8,
}

impl ToneConfig {
    pub const NONE: ToneConfig = ToneConfig {
        code_type: CodeType::None,
        code: 0,
    };
}

impl Default for ToneConfig {
    fn default() -> Self {
        ToneConfig::NONE
    }
}

/// Channel spacing grid, in units of 10 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepSetting {
    Step2_5kHz,
    Step6_25kHz,
}

impl StepSetting {
    pub fn increment(&self) -> u32 {
        match self {
            StepSetting::Step2_5kHz => 250,
            StepSetting::Step6_25kHz => 625,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryChannel {
    pub num: u16,
    pub rx_frequency: u32,
    pub tx_frequency: u32,
    pub step: StepSetting,
    pub rx_tone: ToneConfig,
    pub tx_tone: ToneConfig,
    pub band: u8,
}

impl MemoryChannel {
    /// A fresh simplex channel with no squelch codes, the shape the scanner
    /// starts from when it captures a bare frequency.
    pub fn simplex(num: u16, frequency: u32, band: u8, step: StepSetting) -> Self {
        MemoryChannel {
            num,
            rx_frequency: frequency,
            tx_frequency: frequency,
            step,
            rx_tone: ToneConfig::NONE,
            tx_tone: ToneConfig::NONE,
            band,
        }
    }
}

impl StorageItem for MemoryChannel {
    type Key = u16;

    type Error = ();

    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        if let Ok(used) = postcard::to_slice(self, buffer) {
            return Ok(used.len());
        } else {
            return Err(());
        }
    }

    fn deserialize_from(buffer: &[u8]) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        postcard::from_bytes(buffer).map_err(|_| ())
    }

    fn key(&self) -> Self::Key {
        self.num
    }
}
