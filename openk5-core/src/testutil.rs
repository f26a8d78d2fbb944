//! Mock hardware for the unit tests.

use std::collections::BTreeMap;

use crate::bk1080::{FmTuner, RSSI_REGISTER, SNR_REGISTER};
use crate::eeprom::{Eeprom, EEPROM_BLOCK_LEN};
use crate::radio::ChannelBank;

pub struct MockTuner {
    pub frequency: u16,
    pub tuned: Vec<u16>,
    pub init_calls: Vec<(u16, bool)>,
    pub snr: u16,
    pub rssi: u16,
}

impl MockTuner {
    /// Starts out reporting no usable signal.
    pub fn new() -> MockTuner {
        MockTuner {
            frequency: 0,
            tuned: Vec::new(),
            init_calls: Vec::new(),
            snr: 0,
            rssi: 0,
        }
    }
}

impl FmTuner for MockTuner {
    fn init(&mut self, frequency: u16, enable: bool) {
        self.frequency = frequency;
        self.init_calls.push((frequency, enable));
    }

    fn set_frequency(&mut self, frequency: u16) {
        self.frequency = frequency;
        self.tuned.push(frequency);
    }

    fn read_register(&mut self, register: u8) -> u16 {
        match register {
            SNR_REGISTER => self.snr,
            RSSI_REGISTER => self.rssi,
            _ => 0,
        }
    }
}

#[derive(Default)]
pub struct MockEeprom {
    pub mem: BTreeMap<u16, [u8; EEPROM_BLOCK_LEN]>,
    pub writes: Vec<(u16, [u8; EEPROM_BLOCK_LEN])>,
}

impl Eeprom for MockEeprom {
    fn read_block(&mut self, address: u16, block: &mut [u8; EEPROM_BLOCK_LEN]) {
        *block = self.mem.get(&address).copied().unwrap_or([0xFF; EEPROM_BLOCK_LEN]);
    }

    fn write_block(&mut self, address: u16, block: &[u8; EEPROM_BLOCK_LEN]) {
        self.mem.insert(address, *block);
        self.writes.push((address, *block));
    }
}

#[derive(Default)]
pub struct MockBank {
    pub programmed: Vec<u16>,
}

impl ChannelBank for MockBank {
    fn is_programmed(&self, channel: u16) -> bool {
        self.programmed.contains(&channel)
    }
}
