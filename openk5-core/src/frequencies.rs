//! Transceiver frequencies are in units of 10 Hz; FM broadcast frequencies
//! are in tenths of a megahertz (881 = 88.1 MHz).

/// The seven hardware bands of the transceiver front end, in ascending
/// frequency order. The discriminant doubles as the frequency-bank offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrequencyBand {
    Band1_50MHz = 0,
    Band2_108MHz = 1,
    Band3_136MHz = 2,
    Band4_174MHz = 3,
    Band5_350MHz = 4,
    Band6_400MHz = 5,
    Band7_470MHz = 6,
}

impl FrequencyBand {
    pub fn of(frequency: u32) -> FrequencyBand {
        if frequency >= 47_000_000 {
            FrequencyBand::Band7_470MHz
        } else if frequency >= 40_000_000 {
            FrequencyBand::Band6_400MHz
        } else if frequency >= 35_000_000 {
            FrequencyBand::Band5_350MHz
        } else if frequency >= 17_400_000 {
            FrequencyBand::Band4_174MHz
        } else if frequency >= 13_600_000 {
            FrequencyBand::Band3_136MHz
        } else if frequency >= 10_800_000 {
            FrequencyBand::Band2_108MHz
        } else {
            FrequencyBand::Band1_50MHz
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

pub fn floor_to_step(frequency: u32, step: u32, lower: u32) -> u32 {
    lower + ((frequency - lower) / step) * step
}

/// Moves a cursor by `delta`, wrapping past either end of the inclusive
/// range to the opposite end.
pub fn add_with_wraparound(value: u16, delta: i8, min: u16, max: u16) -> u16 {
    let moved = value as i32 + delta as i32;
    if moved < min as i32 {
        max
    } else if moved > max as i32 {
        min
    } else {
        moved as u16
    }
}

/// Band-limit wraparound for the FM receiver: below the lower limit lands on
/// the upper limit and vice versa.
pub fn wrap_fm_frequency(frequency: u16, lower: u16, upper: u16) -> u16 {
    if frequency < lower {
        upper
    } else if frequency > upper {
        lower
    } else {
        frequency
    }
}
