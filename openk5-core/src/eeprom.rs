//! Block-granular non-volatile storage primitive. The preset table persists
//! through this; everything else is a fire-and-forget save request consumed
//! by the host firmware's own scheduler.

pub const EEPROM_BLOCK_LEN: usize = 8;

pub trait Eeprom {
    fn read_block(&mut self, address: u16, block: &mut [u8; EEPROM_BLOCK_LEN]);
    fn write_block(&mut self, address: u16, block: &[u8; EEPROM_BLOCK_LEN]);
}
