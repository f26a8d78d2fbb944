//! Persisted layout of the broadcast preset table: five sequential 8-byte
//! EEPROM blocks starting at a fixed base address, each holding four
//! little-endian 16-bit frequencies. An erased slot reads back 0xFFFF.

pub const PRESET_COUNT: usize = 20;
pub const PRESET_BASE_ADDRESS: u16 = 0x0E40;
pub const PRESET_BLOCK_LEN: usize = 8;
pub const PRESET_BLOCK_COUNT: usize = 5;
pub const EMPTY_PRESET: u16 = 0xFFFF;
pub const ERASED_BLOCK: [u8; PRESET_BLOCK_LEN] = [0xFF; PRESET_BLOCK_LEN];

const SLOTS_PER_BLOCK: usize = PRESET_BLOCK_LEN / 2;

pub fn block_address(block: usize) -> u16 {
    PRESET_BASE_ADDRESS + (block * PRESET_BLOCK_LEN) as u16
}

pub fn pack_block(slots: &[u16; PRESET_COUNT], block: usize) -> [u8; PRESET_BLOCK_LEN] {
    let mut bytes = [0u8; PRESET_BLOCK_LEN];
    for i in 0..SLOTS_PER_BLOCK {
        let value = slots[block * SLOTS_PER_BLOCK + i].to_le_bytes();
        bytes[i * 2] = value[0];
        bytes[i * 2 + 1] = value[1];
    }
    bytes
}

pub fn unpack_block(slots: &mut [u16; PRESET_COUNT], block: usize, bytes: &[u8; PRESET_BLOCK_LEN]) {
    for i in 0..SLOTS_PER_BLOCK {
        slots[block * SLOTS_PER_BLOCK + i] = u16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]);
    }
}
