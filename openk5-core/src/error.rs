use thiserror::Error;

/// Non-fatal rejections surfaced by the control core. None of these abort
/// anything; they either fall back to direct-frequency mode or turn into a
/// reject beep at the input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[error("channel index or stored frequency out of range")]
    InvalidChannel,
    #[error("frequency outside the configured band limits")]
    OutOfBandFrequency,
    #[error("no valid channel in the preset table")]
    NoValidChannel,
}
