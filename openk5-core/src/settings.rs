/// What the host radio is currently doing. FM switching is refused while
/// transmitting or monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    Idle,
    Receive,
    Monitor,
    Transmit,
    PowerSave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrossBand {
    Off,
    Band1,
    Band2,
}

/// In-memory mirror of the persisted radio settings this core touches.
/// External persistence happens through the save-request flags; the mirror
/// is authoritative between saves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub fm_lower_limit: u16,
    pub fm_upper_limit: u16,
    pub fm_selected_frequency: u16,
    pub fm_selected_channel: u8,
    pub fm_is_mr_mode: bool,
    /// What the tuner was last asked to play. Diverges from the selection
    /// transiently during autoscan and fallback.
    pub fm_frequency_playing: u16,

    pub cross_band: CrossBand,
    /// Index of the VFO scanner results save into.
    pub tx_vfo: usize,
    pub mr_channel: [u16; 2],
    pub freq_channel: [u16; 2],
    pub screen_channel: [u16; 2],
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            fm_lower_limit: 760,
            fm_upper_limit: 1080,
            fm_selected_frequency: 760,
            fm_selected_channel: 0,
            fm_is_mr_mode: false,
            fm_frequency_playing: 760,
            cross_band: CrossBand::Off,
            tx_vfo: 0,
            mr_channel: [0; 2],
            freq_channel: [0; 2],
            screen_channel: [0; 2],
        }
    }
}
