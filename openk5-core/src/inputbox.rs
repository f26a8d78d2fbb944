//! The digit accumulator shared by the FM and scanner key handlers. Only one
//! state machine receives key events at a time; whichever does gets the box
//! as an explicit `&mut` borrow for the duration of its dispatch call.
//!
//! Digits fill left to right; a vacated slot holds the filler value so the
//! renderer can draw a dash. Completion thresholds belong to the consumers
//! (FM: 2 digits for channel select, 4+ for a frequency; scanner: 3).
pub const INPUT_BOX_LEN: usize = 8;
pub const EMPTY_DIGIT: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputBox {
    digits: [u8; INPUT_BOX_LEN],
    index: usize,
}

impl InputBox {
    pub fn new() -> InputBox {
        InputBox {
            digits: [EMPTY_DIGIT; INPUT_BOX_LEN],
            index: 0,
        }
    }

    pub fn append(&mut self, digit: u8) {
        if self.index >= INPUT_BOX_LEN {
            return;
        }
        if self.index == 0 {
            self.digits = [EMPTY_DIGIT; INPUT_BOX_LEN];
        }
        self.digits[self.index] = digit;
        self.index += 1;
    }

    pub fn backspace(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.digits[self.index] = EMPTY_DIGIT;
        }
    }

    pub fn clear(&mut self) {
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.index == 0
    }

    pub fn digit(&self, position: usize) -> u8 {
        self.digits[position]
    }

    /// Shifts a lone entered digit right and prefixes a zero, leaving the box
    /// two digits full. Used by the FM handler's channel-shortcut heuristic.
    pub fn prefix_zero(&mut self) {
        self.digits[1] = self.digits[0];
        self.digits[0] = 0;
        self.index = 2;
    }

    /// Reads the box as a left-aligned decimal number over all eight slots,
    /// stopping at the first filler. "0881" therefore reads as 8_810_000.
    pub fn value(&self) -> u32 {
        let mut multiplier = 10_000_000;
        let mut value = 0;
        for &digit in &self.digits {
            if digit > 9 {
                break;
            }
            value += digit as u32 * multiplier;
            multiplier /= 10;
        }
        value
    }
}

impl Default for InputBox {
    fn default() -> Self {
        InputBox::new()
    }
}
