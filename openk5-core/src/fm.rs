use openk5_codeplug::presets::{
    block_address, unpack_block, EMPTY_PRESET, ERASED_BLOCK, PRESET_BLOCK_COUNT, PRESET_BLOCK_LEN,
    PRESET_COUNT,
};

use crate::app::Shell;
use crate::bk1080::FmTuner;
use crate::eeprom::Eeprom;
use crate::error::Error;
use crate::frequencies::{add_with_wraparound, wrap_fm_frequency};
use crate::keypad::{KeyState, KeypadKey};
use crate::lock::LockDetector;
use crate::notify::{Beep, Notifications, Screen, Voice};
use crate::settings::{Function, Settings};

/// Ticks before the first lock classification after a cold tune, and after
/// a tune that is already part of a sweep.
const PLAY_COUNTDOWN_COLD: u16 = 120;
const PLAY_COUNTDOWN_SWEEP: u16 = 10;

/// The broadcast preset table: twenty slots of tenth-of-a-megahertz
/// frequencies, mirrored in RAM and persisted as five 8-byte blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FmChannelTable {
    slots: [u16; PRESET_COUNT],
}

impl FmChannelTable {
    pub fn new() -> FmChannelTable {
        FmChannelTable {
            slots: [EMPTY_PRESET; PRESET_COUNT],
        }
    }

    pub fn get(&self, channel: u8) -> u16 {
        self.slots[channel as usize]
    }

    pub fn set(&mut self, channel: u8, frequency: u16) {
        self.slots[channel as usize] = frequency;
    }

    pub fn slots(&self) -> &[u16; PRESET_COUNT] {
        &self.slots
    }

    pub fn is_valid_channel(&self, channel: u8) -> bool {
        (channel as usize) < PRESET_COUNT && (760..1080).contains(&self.slots[channel as usize])
    }

    /// Finds the first valid preset starting at `start`, probing at most one
    /// full revolution in `direction` with modulo wraparound.
    pub fn find_next_channel(&self, start: i16, direction: i8) -> Option<u8> {
        let mut channel = start;
        for _ in 0..PRESET_COUNT {
            channel = channel.rem_euclid(PRESET_COUNT as i16);
            if self.is_valid_channel(channel as u8) {
                return Some(channel as u8);
            }
            channel += direction as i16;
        }
        None
    }

    /// Clears every slot, persisting the erased blocks before the mirror is
    /// reset; callers never observe a partially erased table.
    pub fn erase_all(&mut self, eeprom: &mut impl Eeprom) {
        for block in 0..PRESET_BLOCK_COUNT {
            eeprom.write_block(block_address(block), &ERASED_BLOCK);
        }
        self.slots = [EMPTY_PRESET; PRESET_COUNT];
    }

    pub fn load(&mut self, eeprom: &mut impl Eeprom) {
        let mut bytes = [0u8; PRESET_BLOCK_LEN];
        for block in 0..PRESET_BLOCK_COUNT {
            eeprom.read_block(block_address(block), &mut bytes);
            unpack_block(&mut self.slots, block, &bytes);
        }
    }
}

impl Default for FmChannelTable {
    fn default() -> Self {
        FmChannelTable::new()
    }
}

/// Which commit the accumulated digits are heading toward.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DigitEntry {
    Frequency,
    Memory,
    SaveSlot,
}

/// The FM broadcast engine and its key-driven input state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FmRadio {
    pub channels: FmChannelTable,
    lock: LockDetector,

    /// Whether the broadcast receiver currently owns the radio.
    pub radio_mode: bool,
    /// Sweep direction; 0 means not stepping or scanning.
    pub step: i8,
    pub auto_scan: bool,
    /// Destination cursor while autoscan populates presets, reused as the
    /// overwrite-slot cursor during a save confirmation.
    pub channel_position: u8,
    pub ask_to_save: bool,
    pub ask_to_delete: bool,

    /// A manual sweep stopped on a station that has not been claimed yet.
    found_station: bool,
    play_countdown: u16,
    schedule_play: bool,
}

impl FmRadio {
    pub fn new() -> FmRadio {
        FmRadio {
            channels: FmChannelTable::new(),
            lock: LockDetector::new(),
            radio_mode: false,
            step: 0,
            auto_scan: false,
            channel_position: 0,
            ask_to_save: false,
            ask_to_delete: false,
            found_station: false,
            play_countdown: 0,
            schedule_play: false,
        }
    }

    pub fn found_station(&self) -> bool {
        self.found_station
    }

    /// Retunes the receiver. Relative tunes apply `step` with band-limit
    /// wraparound first; every tune cancels pending confirmations and rearms
    /// the lock-classification countdown (longer from a cold start).
    pub fn tune(
        &mut self,
        shell: &mut Shell<'_>,
        tuner: &mut impl FmTuner,
        frequency: u16,
        step: i8,
        absolute: bool,
    ) {
        shell.notify.speaker_enabled = false;
        self.play_countdown = if self.step == 0 {
            PLAY_COUNTDOWN_COLD
        } else {
            PLAY_COUNTDOWN_SWEEP
        };
        self.schedule_play = false;
        self.found_station = false;
        self.ask_to_save = false;
        self.ask_to_delete = false;

        shell.settings.fm_frequency_playing = frequency;
        if !absolute {
            let stepped = wrap_fm_frequency(
                frequency.wrapping_add_signed(step as i16),
                shell.settings.fm_lower_limit,
                shell.settings.fm_upper_limit,
            );
            shell.settings.fm_frequency_playing = stepped;
        }
        self.step = step;
        tuner.set_frequency(shell.settings.fm_frequency_playing);
    }

    /// Finalizes playback after a sweep or selection: resolves the effective
    /// channel, commits the tuner, requests persistence, opens the audio
    /// path.
    pub fn play_and_update(&mut self, shell: &mut Shell<'_>, tuner: &mut impl FmTuner) {
        self.step = 0;
        if self.auto_scan {
            shell.settings.fm_is_mr_mode = true;
            shell.settings.fm_selected_channel = 0;
        }
        let _ = self.configure_channel_state(shell.settings);
        tuner.set_frequency(shell.settings.fm_frequency_playing);
        shell.notify.save_fm = true;
        self.play_countdown = 0;
        self.schedule_play = false;
        self.ask_to_save = false;
        shell.notify.speaker_enabled = true;
    }

    /// Commits a directly entered frequency. Out-of-band values are refused
    /// and leave the selection untouched.
    pub fn select_frequency(
        &mut self,
        settings: &mut Settings,
        tuner: &mut impl FmTuner,
        frequency: u32,
    ) -> Result<(), Error> {
        if frequency < settings.fm_lower_limit as u32
            || (settings.fm_upper_limit as u32) < frequency
        {
            return Err(Error::OutOfBandFrequency);
        }
        settings.fm_selected_frequency = frequency as u16;
        settings.fm_frequency_playing = settings.fm_selected_frequency;
        tuner.set_frequency(settings.fm_frequency_playing);
        Ok(())
    }

    /// Commits a preset selection by number.
    pub fn select_channel(
        &mut self,
        settings: &mut Settings,
        tuner: &mut impl FmTuner,
        channel: u8,
    ) -> Result<(), Error> {
        if !self.channels.is_valid_channel(channel) {
            return Err(Error::InvalidChannel);
        }
        settings.fm_selected_channel = channel;
        settings.fm_frequency_playing = self.channels.get(channel);
        tuner.set_frequency(settings.fm_frequency_playing);
        Ok(())
    }

    /// Resolves the playing frequency from the current mode. In memory mode
    /// an unusable selection falls back to direct-frequency mode.
    pub fn configure_channel_state(&mut self, settings: &mut Settings) -> Result<(), Error> {
        settings.fm_frequency_playing = settings.fm_selected_frequency;
        if settings.fm_is_mr_mode {
            match self
                .channels
                .find_next_channel(settings.fm_selected_channel as i16, 1)
            {
                None => {
                    settings.fm_is_mr_mode = false;
                    return Err(Error::NoValidChannel);
                }
                Some(channel) => {
                    settings.fm_selected_channel = channel;
                    settings.fm_frequency_playing = self.channels.get(channel);
                }
            }
        }
        Ok(())
    }

    pub fn turn_off(&mut self, tuner: &mut impl FmTuner, notify: &mut Notifications) {
        self.radio_mode = false;
        self.step = 0;
        notify.speaker_enabled = false;
        tuner.init(0, false);
        notify.status_changed = true;
    }

    pub fn start(&mut self, shell: &mut Shell<'_>, tuner: &mut impl FmTuner) {
        self.radio_mode = true;
        self.step = 0;
        tuner.init(shell.settings.fm_frequency_playing, true);
        shell.notify.speaker_enabled = true;
        shell.notify.status_changed = true;
    }

    /// Toggles the broadcast receiver against the host radio's normal mode.
    /// Refused while the host is transmitting or monitoring.
    pub fn switch(&mut self, shell: &mut Shell<'_>, tuner: &mut impl FmTuner, function: Function) {
        if function == Function::Transmit || function == Function::Monitor {
            return;
        }
        if self.radio_mode {
            self.turn_off(tuner, shell.notify);
            shell.input.clear();
            shell.notify.screen = Some(Screen::Main);
            return;
        }
        shell.notify.reconfigure_radio = true;
        self.start(shell, tuner);
        shell.input.clear();
        shell.notify.screen = Some(Screen::Fm);
    }

    /// Starts a sweep. `populate` erases the presets and refills them from
    /// the bottom of the band; otherwise this is a plain station seek from
    /// the current frequency. Pressing again mid-sweep finalizes instead.
    pub fn start_scan(
        &mut self,
        populate: bool,
        shell: &mut Shell<'_>,
        tuner: &mut impl FmTuner,
        eeprom: &mut impl Eeprom,
        function: Function,
    ) {
        if function == Function::Transmit || function == Function::Monitor {
            return;
        }
        shell.notify.screen = Some(Screen::Fm);
        if self.step != 0 {
            self.play_and_update(shell, tuner);
            shell.notify.voice = Some(Voice::ScanningStop);
            return;
        }
        self.auto_scan = populate;
        self.channel_position = 0;
        let frequency = if populate {
            self.channels.erase_all(eeprom);
            shell.settings.fm_lower_limit
        } else {
            shell.settings.fm_frequency_playing
        };
        self.tune(shell, tuner, frequency, 1, populate);
        shell.notify.voice = Some(Voice::ScanningBegin);
    }

    pub fn tick(&mut self) {
        if self.play_countdown > 0 {
            self.play_countdown -= 1;
            if self.play_countdown == 0 {
                self.schedule_play = true;
            }
        }
    }

    /// Runs the deferred lock classification if the countdown expired since
    /// the last poll.
    pub fn poll(&mut self, shell: &mut Shell<'_>, tuner: &mut impl FmTuner) {
        if !self.schedule_play {
            return;
        }
        self.schedule_play = false;
        self.play(shell, tuner);
    }

    fn play(&mut self, shell: &mut Shell<'_>, tuner: &mut impl FmTuner) {
        let locked = self.lock.check(
            tuner,
            shell.settings.fm_frequency_playing,
            shell.settings.fm_lower_limit,
        );
        if locked {
            if !self.auto_scan {
                // Settle here; the sweep step stays recorded so the next
                // UP/DOWN resumes from it.
                self.play_countdown = 0;
                self.found_station = true;
                if !shell.settings.fm_is_mr_mode {
                    shell.settings.fm_selected_frequency = shell.settings.fm_frequency_playing;
                }
                shell.notify.speaker_enabled = true;
            } else if (self.channel_position as usize) < PRESET_COUNT {
                self.channels
                    .set(self.channel_position, shell.settings.fm_frequency_playing);
                self.channel_position += 1;
                if shell.settings.fm_upper_limit > shell.settings.fm_frequency_playing {
                    let playing = shell.settings.fm_frequency_playing;
                    let step = self.step;
                    self.tune(shell, tuner, playing, step, false);
                } else {
                    self.play_and_update(shell, tuner);
                }
            } else {
                self.play_and_update(shell, tuner);
            }
        } else if self.auto_scan {
            if shell.settings.fm_upper_limit > shell.settings.fm_frequency_playing {
                let playing = shell.settings.fm_frequency_playing;
                let step = self.step;
                self.tune(shell, tuner, playing, step, false);
            } else {
                self.play_and_update(shell, tuner);
            }
        } else {
            let playing = shell.settings.fm_frequency_playing;
            let step = self.step;
            self.tune(shell, tuner, playing, step, false);
        }
        shell.notify.screen = Some(Screen::Fm);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn process_keys(
        &mut self,
        key: KeypadKey,
        state: KeyState,
        f_key_latched: &mut bool,
        function: Function,
        shell: &mut Shell<'_>,
        tuner: &mut impl FmTuner,
        eeprom: &mut impl Eeprom,
    ) {
        let (pressed, held) = state.pressed_held();
        if let Some(digit) = key.digit() {
            self.key_digit(key, digit, pressed, held, f_key_latched, function, shell, tuner, eeprom);
            return;
        }
        match key {
            KeypadKey::Menu => self.key_menu(pressed, held, shell, tuner),
            KeypadKey::Up => self.key_up_down(pressed, held, 1, shell, tuner),
            KeypadKey::Down => self.key_up_down(pressed, held, -1, shell, tuner),
            KeypadKey::Exit => self.key_exit(pressed, held, function, shell, tuner),
            KeypadKey::Function => key_function(pressed, held, f_key_latched, shell),
            KeypadKey::Ptt => {
                // PTT is the host's generic handler's business.
            }
            _ => {
                if pressed && !held {
                    shell.notify.beep = Some(Beep::Double500Hz60ms);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn key_digit(
        &mut self,
        key: KeypadKey,
        digit: u8,
        pressed: bool,
        held: bool,
        f_key_latched: &mut bool,
        function: Function,
        shell: &mut Shell<'_>,
        tuner: &mut impl FmTuner,
        eeprom: &mut impl Eeprom,
    ) {
        if held || !pressed {
            return;
        }
        if !*f_key_latched {
            let entry = if self.ask_to_delete {
                shell.notify.beep = Some(Beep::Double500Hz60ms);
                return;
            } else if self.ask_to_save {
                DigitEntry::SaveSlot
            } else if self.step != 0 {
                shell.notify.beep = Some(Beep::Double500Hz60ms);
                return;
            } else if shell.settings.fm_is_mr_mode {
                DigitEntry::Memory
            } else {
                DigitEntry::Frequency
            };

            shell.input.append(digit);
            shell.notify.screen = Some(Screen::Fm);

            if entry == DigitEntry::Frequency {
                if shell.input.len() == 1 {
                    // A first digit above 1 cannot begin an in-band
                    // frequency, so reinterpret it as a channel shortcut.
                    if shell.input.digit(0) > 1 {
                        shell.input.prefix_zero();
                    }
                } else if shell.input.len() > 3 {
                    let frequency = shell.input.value() / 10_000;
                    shell.input.clear();
                    if self.select_frequency(shell.settings, tuner, frequency).is_err() {
                        shell.notify.beep = Some(Beep::Double500Hz60ms);
                        shell.notify.screen = Some(Screen::Fm);
                        return;
                    }
                    shell.notify.voice = Some(Voice::Digit(digit));
                    shell.notify.save_fm = true;
                    return;
                }
            } else if shell.input.len() == 2 {
                let channel =
                    (shell.input.digit(0) as i16 * 10 + shell.input.digit(1) as i16) - 1;
                shell.input.clear();
                if entry == DigitEntry::Memory {
                    if channel >= 0
                        && self
                            .select_channel(shell.settings, tuner, channel as u8)
                            .is_ok()
                    {
                        shell.notify.voice = Some(Voice::Digit(digit));
                        shell.notify.save_fm = true;
                        return;
                    }
                } else if (0..PRESET_COUNT as i16).contains(&channel) {
                    shell.notify.voice = Some(Voice::Digit(digit));
                    shell.notify.screen = Some(Screen::Fm);
                    self.channel_position = channel as u8;
                    return;
                }
                shell.notify.beep = Some(Beep::Double500Hz60ms);
                return;
            }
            shell.notify.voice = Some(Voice::Digit(digit));
            return;
        }

        // Function-latched digit commands, dispatched on key identity.
        shell.notify.beep = Some(Beep::Single1kHz60ms);
        *f_key_latched = false;
        shell.notify.status_changed = true;
        shell.notify.screen = Some(Screen::Fm);
        match key {
            KeypadKey::Num0 => self.switch(shell, tuner, function),
            KeypadKey::Num1 => {
                shell.settings.fm_is_mr_mode = !shell.settings.fm_is_mr_mode;
                if self.configure_channel_state(shell.settings).is_ok() {
                    tuner.set_frequency(shell.settings.fm_frequency_playing);
                    shell.notify.save_fm = true;
                    return;
                }
                shell.notify.beep = Some(Beep::Double500Hz60ms);
            }
            KeypadKey::Num2 => self.start_scan(true, shell, tuner, eeprom, function),
            KeypadKey::Num3 => self.start_scan(false, shell, tuner, eeprom, function),
            _ => shell.notify.beep = Some(Beep::Double500Hz60ms),
        }
    }

    fn key_menu(&mut self, pressed: bool, held: bool, shell: &mut Shell<'_>, tuner: &mut impl FmTuner) {
        if held || !pressed {
            return;
        }
        shell.notify.screen = Some(Screen::Fm);
        shell.notify.beep = Some(Beep::Single1kHz60ms);

        if self.step == 0 {
            if !shell.settings.fm_is_mr_mode {
                if self.ask_to_save {
                    self.channels
                        .set(self.channel_position, shell.settings.fm_frequency_playing);
                    self.ask_to_save = false;
                    shell.notify.save_fm = true;
                } else {
                    self.ask_to_save = true;
                }
            } else if self.ask_to_delete {
                self.channels
                    .set(shell.settings.fm_selected_channel, EMPTY_PRESET);
                let _ = self.configure_channel_state(shell.settings);
                tuner.set_frequency(shell.settings.fm_frequency_playing);
                shell.notify.save_fm = true;
                self.ask_to_delete = false;
            } else {
                self.ask_to_delete = true;
            }
        } else {
            // Mid-sweep, MENU only claims an unclaimed find.
            if self.auto_scan || !self.found_station {
                shell.notify.beep = Some(Beep::Double500Hz60ms);
                shell.input.clear();
                return;
            }
            if self.ask_to_save {
                self.channels
                    .set(self.channel_position, shell.settings.fm_frequency_playing);
                self.ask_to_save = false;
                shell.notify.save_fm = true;
            } else {
                self.ask_to_save = true;
            }
        }
    }

    fn key_up_down(
        &mut self,
        pressed: bool,
        held: bool,
        step: i8,
        shell: &mut Shell<'_>,
        tuner: &mut impl FmTuner,
    ) {
        if held || !pressed {
            if !shell.input.is_empty() {
                return;
            }
            if !pressed {
                return;
            }
        } else {
            if !shell.input.is_empty() {
                shell.notify.beep = Some(Beep::Double500Hz60ms);
                return;
            }
            shell.notify.beep = Some(Beep::Single1kHz60ms);
        }

        if self.ask_to_save {
            shell.notify.screen = Some(Screen::Fm);
            self.channel_position =
                add_with_wraparound(self.channel_position as u16, step, 0, 19) as u8;
            return;
        }
        if self.step != 0 {
            if self.auto_scan {
                shell.notify.beep = Some(Beep::Double500Hz60ms);
                return;
            }
            let playing = shell.settings.fm_frequency_playing;
            self.tune(shell, tuner, playing, step, false);
            shell.notify.screen = Some(Screen::Fm);
            return;
        }

        let mut moved = true;
        if shell.settings.fm_is_mr_mode {
            let start = shell.settings.fm_selected_channel as i16 + step as i16;
            match self.channels.find_next_channel(start, step) {
                Some(channel) if channel != shell.settings.fm_selected_channel => {
                    shell.settings.fm_selected_channel = channel;
                    shell.settings.fm_frequency_playing = self.channels.get(channel);
                }
                _ => moved = false,
            }
        } else {
            let frequency = wrap_fm_frequency(
                shell.settings.fm_selected_frequency.wrapping_add_signed(step as i16),
                shell.settings.fm_lower_limit,
                shell.settings.fm_upper_limit,
            );
            shell.settings.fm_frequency_playing = frequency;
            shell.settings.fm_selected_frequency = frequency;
        }
        if moved {
            shell.notify.save_fm = true;
        }
        tuner.set_frequency(shell.settings.fm_frequency_playing);
        shell.notify.screen = Some(Screen::Fm);
    }

    fn key_exit(
        &mut self,
        pressed: bool,
        held: bool,
        function: Function,
        shell: &mut Shell<'_>,
        tuner: &mut impl FmTuner,
    ) {
        if held || !pressed {
            return;
        }
        shell.notify.beep = Some(Beep::Single1kHz60ms);
        if self.step == 0 {
            if shell.input.is_empty() {
                if !self.ask_to_save && !self.ask_to_delete {
                    self.switch(shell, tuner, function);
                    return;
                }
                self.ask_to_save = false;
                self.ask_to_delete = false;
            } else {
                shell.input.backspace();
                if !shell.input.is_empty() {
                    if shell.input.len() != 1 {
                        shell.notify.screen = Some(Screen::Fm);
                        return;
                    }
                    if shell.input.digit(0) != 0 {
                        shell.notify.screen = Some(Screen::Fm);
                        return;
                    }
                }
                shell.input.clear();
            }
            shell.notify.voice = Some(Voice::Cancel);
        } else {
            // Mid-sweep, EXIT stops the scan and keeps the result.
            self.play_and_update(shell, tuner);
            shell.notify.voice = Some(Voice::ScanningStop);
        }
        shell.notify.screen = Some(Screen::Fm);
    }
}

impl Default for FmRadio {
    fn default() -> Self {
        FmRadio::new()
    }
}

/// The radio-wide function key: latches for the next digit press. Shared
/// with the rest of the firmware; only the FM-relevant part lives here.
fn key_function(pressed: bool, held: bool, f_key_latched: &mut bool, shell: &mut Shell<'_>) {
    if !shell.input.is_empty() {
        if pressed && !held {
            shell.notify.beep = Some(Beep::Double500Hz60ms);
        }
        return;
    }
    if held || !pressed {
        return;
    }
    *f_key_latched = !*f_key_latched;
    shell.notify.status_changed = true;
    shell.notify.beep = Some(Beep::Single1kHz60ms);
}
