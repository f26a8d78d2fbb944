use openk5_codeplug::MemoryChannel;

/// One-shot flags and identifiers for the external presentation and
/// persistence layers. The core only ever sets these; consumers clear them
/// at their own cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Beep {
    Single1kHz60ms,
    Double500Hz60ms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Voice {
    Digit(u8),
    Cancel,
    ScanningBegin,
    ScanningStop,
    MemoryChannel,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    Main,
    Fm,
    Scanner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelSaveMode {
    /// Store the record as-is into the slot.
    Full,
    /// Reload the slot's existing configuration and merge only the tones.
    ToneOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSave {
    pub slot: u16,
    pub channel: MemoryChannel,
    pub mode: ChannelSaveMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notifications {
    pub screen: Option<Screen>,
    pub beep: Option<Beep>,
    pub voice: Option<Voice>,
    pub status_changed: bool,

    pub save_fm: bool,
    pub save_channel: Option<ChannelSave>,

    pub start_scan: bool,
    pub stop_scan: bool,
    /// Host should reload the VFO configuration from settings.
    pub reconfigure_vfo: bool,
    /// Host should bring its registers to an FM-compatible state before the
    /// broadcast receiver starts.
    pub reconfigure_radio: bool,

    /// Audio path state, owned by this core while FM is active.
    pub speaker_enabled: bool,
}

impl Notifications {
    pub fn new() -> Notifications {
        Notifications::default()
    }
}
