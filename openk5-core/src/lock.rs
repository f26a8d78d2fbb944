use crate::bk1080::{FmTuner, RSSI_REGISTER, SNR_REGISTER};

/// Signal-quality classifier for the broadcast receiver. Carries the
/// previous poll's base frequency and raw deviation so single-step sweeps
/// can reject transient readings at a station's edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LockDetector {
    base_frequency: u16,
    deviation: i16,
}

impl LockDetector {
    pub fn new() -> LockDetector {
        LockDetector::default()
    }

    /// Decides whether `frequency` is receiving a station. The stored state
    /// is rewritten with this poll's measurement on every path, rejects
    /// included; the next poll's hysteresis must compare against the
    /// immediately preceding step, never a stale one.
    pub fn check(&mut self, tuner: &mut impl FmTuner, frequency: u16, lower_limit: u16) -> bool {
        let snr = tuner.read_register(SNR_REGISTER);
        let deviation = (snr as i16) >> 4;
        let locked = self.classify(tuner, snr, deviation, frequency, lower_limit);
        self.deviation = deviation;
        self.base_frequency = frequency;
        locked
    }

    fn classify(
        &self,
        tuner: &mut impl FmTuner,
        snr: u16,
        deviation: i16,
        frequency: u16,
        lower_limit: u16,
    ) -> bool {
        if (snr & 0xF) < 2 {
            return false;
        }
        let rssi = tuner.read_register(RSSI_REGISTER);
        if rssi & 0x1000 != 0 || (rssi & 0xFF) < 10 {
            return false;
        }
        // A deviation inside the capture window means the tuner is still
        // pulling toward the carrier; only a settled reading counts.
        if (280..=3815).contains(&deviation) {
            return false;
        }
        if lower_limit < frequency && frequency.wrapping_sub(self.base_frequency) == 1 {
            if self.deviation & 0x800 != 0 {
                return false;
            }
            if self.deviation < 20 {
                return false;
            }
        }
        if lower_limit <= frequency && self.base_frequency.wrapping_sub(frequency) == 1 {
            if self.deviation & 0x800 == 0 {
                return false;
            }
            if self.deviation > 4075 {
                return false;
            }
        }
        true
    }
}
