/// Queries against the transceiver's memory-channel bank. The scanner only
/// needs to know whether a slot is programmed, to drive the channel-number
/// prefix on its edit screen.
pub trait ChannelBank {
    fn is_programmed(&self, channel: u16) -> bool;
}
