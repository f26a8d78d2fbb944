//! Contract required from the broadcast tuner driver (a BK1080 on the
//! target hardware). Register I/O and the physical tune live with the
//! host firmware; this core only consumes the two status registers below.

/// Low nibble carries the signal-to-noise indicator; the upper bits carry
/// the signed frequency deviation consumed by the lock detector.
pub const SNR_REGISTER: u8 = 0x07;

/// Bit 12 is a guard bit; the low byte is the received signal strength.
pub const RSSI_REGISTER: u8 = 0x10;

pub trait FmTuner {
    fn init(&mut self, frequency: u16, enable: bool);
    fn set_frequency(&mut self, frequency: u16);
    fn read_register(&mut self, register: u8) -> u16;
}
