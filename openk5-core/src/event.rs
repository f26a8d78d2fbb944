use openk5_codeplug::ToneConfig;

use crate::keypad::{KeyState, KeypadKey};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Key(KeypadKey, KeyState),
    Ptt(bool),

    /// Periodic system tick; drives the countdown timers.
    Tick,

    // Reports from the external scan driver.
    ScanFrequencyFound(u32),
    ScanToneFound(ToneConfig),
}
