/// Physical keys, debounced by the host firmware. The digit keys occupy a
/// contiguous discriminant range so handlers can treat them as one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeypadKey {
    Num0 = 0,
    Num1 = 1,
    Num2 = 2,
    Num3 = 3,
    Num4 = 4,
    Num5 = 5,
    Num6 = 6,
    Num7 = 7,
    Num8 = 8,
    Num9 = 9,
    Menu = 10,
    Up = 11,
    Down = 12,
    Exit = 13,
    Star = 14,
    Pound = 15,
    Function = 16,
    Ptt = 17,
}

impl KeypadKey {
    pub fn digit(self) -> Option<u8> {
        let code = self as u8;
        if code <= 9 {
            Some(code)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyState {
    NewlyPressed,
    Held,
    NewlyReleased,
    NotPressed,
}

impl KeyState {
    pub fn advance(self, pressed_now: bool) -> KeyState {
        let was_pressed = matches!(self, KeyState::NewlyPressed | KeyState::Held);
        match (pressed_now, was_pressed) {
            (true, true) => KeyState::Held,
            (true, false) => KeyState::NewlyPressed,
            (false, true) => KeyState::NewlyReleased,
            (false, false) => KeyState::NotPressed,
        }
    }

    /// The `(pressed, held)` pair the key handlers consume. Releases report
    /// not-pressed so handlers act once per debounced transition.
    pub fn pressed_held(self) -> (bool, bool) {
        match self {
            KeyState::NewlyPressed => (true, false),
            KeyState::Held => (true, true),
            KeyState::NewlyReleased | KeyState::NotPressed => (false, false),
        }
    }
}
