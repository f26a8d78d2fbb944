use openk5_codeplug::channel::{is_mr_channel, FREQ_CHANNEL_FIRST};
use openk5_codeplug::{MemoryChannel, StepSetting, ToneConfig};

use crate::app::Shell;
use crate::frequencies::{add_with_wraparound, floor_to_step, FrequencyBand};
use crate::keypad::{KeyState, KeypadKey};
use crate::notify::{Beep, ChannelSave, ChannelSaveMode, Screen, Voice};
use crate::radio::ChannelBank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanPhase {
    Idle,
    Scanning,
    /// A capture is complete and waiting to be claimed or discarded.
    Found,
    EditChannel,
    ConfirmSave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureKind {
    /// Sweep for a carrier, then decode its squelch code.
    Frequency,
    /// Decode the squelch code on the frequency already tuned.
    Tone,
}

/// Snaps a raw carrier measurement onto the nearer of the two channel grids,
/// preferring the coarse grid when both are equally close.
fn quantize(frequency: u32) -> (u32, StepSetting) {
    let mut freq_250 = floor_to_step(frequency, 250, 0);
    let mut delta_250 = frequency - freq_250;
    if delta_250 > 125 {
        delta_250 = 250 - delta_250;
        freq_250 += 250;
    }
    let mut freq_625 = floor_to_step(frequency, 625, 0);
    let mut delta_625 = frequency - freq_625;
    if delta_625 > 312 {
        delta_625 = 625 - delta_625;
        freq_625 += 625;
    }
    if delta_625 < delta_250 {
        (freq_625, StepSetting::Step6_25kHz)
    } else {
        (freq_250, StepSetting::Step2_5kHz)
    }
}

/// The channel-scanner state machine. Hardware capture runs elsewhere and
/// reports in through `frequency_found` / `tone_detected`; this type owns
/// the phases, the save destination, and the key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scanner {
    pub phase: ScanPhase,
    capture: CaptureKind,
    frequency: u32,
    step: StepSetting,
    tone: Option<ToneConfig>,
    /// Destination slot cursor while editing a memory-channel save.
    channel: u16,
    /// Whether the cursor's slot already holds a programmed channel.
    channel_known: bool,
    vfo_slot: usize,
    cross_band_backup: crate::settings::CrossBand,
}

impl Scanner {
    pub fn new() -> Scanner {
        Scanner {
            phase: ScanPhase::Idle,
            capture: CaptureKind::Frequency,
            frequency: 0,
            step: StepSetting::Step2_5kHz,
            tone: None,
            channel: 0,
            channel_known: false,
            vfo_slot: 0,
            cross_band_backup: crate::settings::CrossBand::Off,
        }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn tone(&self) -> Option<ToneConfig> {
        self.tone
    }

    /// Opens a scan session for `vfo_slot`. Cross-band receive is parked for
    /// the duration so the capture hardware owns both receivers.
    pub fn start(
        &mut self,
        vfo_slot: usize,
        kind: CaptureKind,
        shell: &mut Shell<'_>,
        bank: &impl ChannelBank,
    ) {
        self.cross_band_backup = shell.settings.cross_band;
        shell.settings.cross_band = crate::settings::CrossBand::Off;
        self.vfo_slot = vfo_slot;
        self.capture = kind;
        self.phase = ScanPhase::Scanning;
        self.tone = None;
        let screen = shell.settings.screen_channel[vfo_slot];
        if is_mr_channel(screen) {
            self.channel = screen;
            self.channel_known = bank.is_programmed(screen);
        } else {
            self.channel = 0;
            self.channel_known = false;
        }
        shell.input.clear();
        shell.notify.start_scan = true;
        shell.notify.screen = Some(Screen::Scanner);
        shell.notify.voice = Some(Voice::ScanningBegin);
    }

    /// Capture hardware found a carrier. The raw reading is kept as-is;
    /// it lands on a channel grid only when the user claims it. Squelch
    /// decoding may still follow.
    pub fn frequency_found(&mut self, shell: &mut Shell<'_>, frequency: u32) {
        if self.phase != ScanPhase::Scanning || self.capture != CaptureKind::Frequency {
            return;
        }
        self.frequency = frequency;
        self.phase = ScanPhase::Found;
        shell.notify.screen = Some(Screen::Scanner);
    }

    pub fn tone_detected(&mut self, shell: &mut Shell<'_>, tone: ToneConfig) {
        match (self.capture, self.phase) {
            (CaptureKind::Tone, ScanPhase::Scanning) => {
                self.tone = Some(tone);
                self.phase = ScanPhase::Found;
            }
            (CaptureKind::Frequency, ScanPhase::Found) => {
                self.tone = Some(tone);
            }
            _ => return,
        }
        shell.notify.screen = Some(Screen::Scanner);
    }

    pub fn process_keys(
        &mut self,
        key: KeypadKey,
        state: KeyState,
        shell: &mut Shell<'_>,
        bank: &impl ChannelBank,
    ) {
        let (pressed, held) = state.pressed_held();
        if let Some(digit) = key.digit() {
            self.key_digit(digit, pressed, held, shell, bank);
            return;
        }
        match key {
            KeypadKey::Menu => self.key_menu(pressed, held, shell),
            KeypadKey::Up => self.key_up_down(pressed, held, 1, shell, bank),
            KeypadKey::Down => self.key_up_down(pressed, held, -1, shell, bank),
            KeypadKey::Exit => self.key_exit(pressed, held, shell),
            KeypadKey::Star => self.key_star(pressed, held, shell),
            KeypadKey::Ptt => {}
            _ => {
                if pressed && !held {
                    shell.notify.beep = Some(Beep::Double500Hz60ms);
                }
            }
        }
    }

    fn key_digit(
        &mut self,
        digit: u8,
        pressed: bool,
        held: bool,
        shell: &mut Shell<'_>,
        bank: &impl ChannelBank,
    ) {
        if held || !pressed {
            return;
        }
        if self.phase != ScanPhase::EditChannel {
            shell.notify.beep = Some(Beep::Double500Hz60ms);
            return;
        }
        shell.notify.beep = Some(Beep::Single1kHz60ms);
        shell.notify.voice = Some(Voice::Digit(digit));
        shell.input.append(digit);
        shell.notify.screen = Some(Screen::Scanner);
        if shell.input.len() < 3 {
            return;
        }
        // Channel numbers are entered one-based; zero underflows and fails
        // the range check below.
        let entered = shell.input.digit(0) as u16 * 100
            + shell.input.digit(1) as u16 * 10
            + shell.input.digit(2) as u16;
        shell.input.clear();
        let channel = entered.wrapping_sub(1);
        if !is_mr_channel(channel) {
            shell.notify.beep = Some(Beep::Double500Hz60ms);
            return;
        }
        self.channel = channel;
        self.channel_known = bank.is_programmed(channel);
    }

    fn key_menu(&mut self, pressed: bool, held: bool, shell: &mut Shell<'_>) {
        if held || !pressed {
            return;
        }
        match self.phase {
            ScanPhase::Idle | ScanPhase::Scanning => {
                shell.notify.beep = Some(Beep::Double500Hz60ms);
                return;
            }
            ScanPhase::Found => {
                shell.notify.beep = Some(Beep::Single1kHz60ms);
                if self.capture == CaptureKind::Frequency {
                    let (frequency, step) = quantize(self.frequency);
                    self.frequency = frequency;
                    self.step = step;
                }
                if is_mr_channel(shell.settings.screen_channel[self.vfo_slot]) {
                    self.phase = ScanPhase::EditChannel;
                } else {
                    self.phase = ScanPhase::ConfirmSave;
                }
                shell.notify.voice = Some(Voice::MemoryChannel);
            }
            ScanPhase::EditChannel => {
                // A half-entered channel number blocks the advance.
                if shell.input.is_empty() {
                    shell.notify.beep = Some(Beep::Single1kHz60ms);
                    self.phase = ScanPhase::ConfirmSave;
                }
            }
            ScanPhase::ConfirmSave => {
                self.commit(shell);
            }
        }
        shell.notify.screen = Some(Screen::Scanner);
    }

    fn key_up_down(
        &mut self,
        pressed: bool,
        held: bool,
        step: i8,
        shell: &mut Shell<'_>,
        bank: &impl ChannelBank,
    ) {
        if pressed && !held {
            shell.input.clear();
            shell.notify.beep = Some(Beep::Single1kHz60ms);
        }
        if !pressed {
            return;
        }
        if self.phase != ScanPhase::EditChannel {
            shell.notify.beep = Some(Beep::Double500Hz60ms);
            return;
        }
        self.channel = add_with_wraparound(self.channel, step, 0, 199);
        self.channel_known = bank.is_programmed(self.channel);
        shell.notify.screen = Some(Screen::Scanner);
    }

    fn key_star(&mut self, pressed: bool, held: bool, shell: &mut Shell<'_>) {
        if held || !pressed {
            return;
        }
        if self.phase == ScanPhase::Idle {
            shell.notify.beep = Some(Beep::Double500Hz60ms);
            return;
        }
        // Restart the capture without disturbing the save destination.
        shell.notify.beep = Some(Beep::Single1kHz60ms);
        self.tone = None;
        self.phase = ScanPhase::Scanning;
        shell.notify.start_scan = true;
        shell.notify.voice = Some(Voice::ScanningBegin);
        shell.notify.screen = Some(Screen::Scanner);
    }

    fn key_exit(&mut self, pressed: bool, held: bool, shell: &mut Shell<'_>) {
        if held || !pressed {
            return;
        }
        shell.notify.beep = Some(Beep::Single1kHz60ms);
        match self.phase {
            ScanPhase::Idle => {
                self.close(shell);
            }
            ScanPhase::Scanning => {
                self.phase = ScanPhase::Idle;
                shell.notify.stop_scan = true;
                shell.notify.screen = Some(Screen::Scanner);
            }
            ScanPhase::Found => {
                // Discard the candidate and resume the capture.
                self.tone = None;
                self.phase = ScanPhase::Scanning;
                shell.notify.start_scan = true;
                shell.notify.voice = Some(Voice::Cancel);
                shell.notify.screen = Some(Screen::Scanner);
            }
            ScanPhase::EditChannel => {
                if shell.input.is_empty() {
                    self.phase = ScanPhase::Found;
                    shell.notify.voice = Some(Voice::Cancel);
                } else {
                    shell.input.backspace();
                }
                shell.notify.screen = Some(Screen::Scanner);
            }
            ScanPhase::ConfirmSave => {
                if is_mr_channel(shell.settings.screen_channel[self.vfo_slot]) {
                    self.phase = ScanPhase::EditChannel;
                } else {
                    self.phase = ScanPhase::Found;
                }
                shell.notify.screen = Some(Screen::Scanner);
            }
        }
    }

    /// Writes the capture into its destination slot and ends the session.
    fn commit(&mut self, shell: &mut Shell<'_>) {
        let band = FrequencyBand::of(self.frequency);
        let save_mr = is_mr_channel(shell.settings.screen_channel[self.vfo_slot]);
        let slot = if save_mr {
            self.channel
        } else {
            FREQ_CHANNEL_FIRST + band.index() as u16
        };
        let mut channel = MemoryChannel::simplex(slot, self.frequency, band.index(), self.step);
        if let Some(tone) = self.tone {
            channel.rx_tone = tone;
            channel.tx_tone = tone;
        }
        let mode = match self.capture {
            CaptureKind::Frequency => ChannelSaveMode::Full,
            CaptureKind::Tone => ChannelSaveMode::ToneOnly,
        };
        if save_mr {
            shell.settings.mr_channel[self.vfo_slot] = slot;
        } else {
            shell.settings.freq_channel[self.vfo_slot] = slot;
        }
        shell.settings.screen_channel[self.vfo_slot] = slot;
        shell.notify.save_channel = Some(ChannelSave { slot, channel, mode });
        shell.notify.voice = Some(Voice::Confirm);
        shell.notify.beep = Some(Beep::Single1kHz60ms);
        self.phase = ScanPhase::Idle;
        shell.notify.screen = Some(Screen::Scanner);
    }

    /// Tears the session down: the parked cross-band policy comes back and
    /// the host reloads its VFO configuration.
    fn close(&mut self, shell: &mut Shell<'_>) {
        shell.settings.cross_band = self.cross_band_backup;
        self.phase = ScanPhase::Idle;
        shell.input.clear();
        shell.notify.stop_scan = true;
        shell.notify.reconfigure_vfo = true;
        shell.notify.voice = Some(Voice::Cancel);
        shell.notify.screen = Some(Screen::Main);
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputbox::InputBox;
    use crate::notify::Notifications;
    use crate::settings::{CrossBand, Settings};
    use crate::testutil::MockBank;
    use openk5_codeplug::CodeType;

    fn shell_parts() -> (InputBox, Settings, Notifications) {
        (InputBox::new(), Settings::default(), Notifications::new())
    }

    fn press(
        scanner: &mut Scanner,
        key: KeypadKey,
        shell: &mut Shell<'_>,
        bank: &MockBank,
    ) {
        scanner.process_keys(key, KeyState::NewlyPressed, shell, bank);
        scanner.process_keys(key, KeyState::NewlyReleased, shell, bank);
    }

    #[test]
    fn quantize_prefers_the_nearer_grid() {
        assert_eq!(quantize(1_465_378), (1_465_500, StepSetting::Step2_5kHz));
        assert_eq!(quantize(1_465_630), (1_465_625, StepSetting::Step6_25kHz));
    }

    #[test]
    fn quantize_ties_fall_to_the_coarse_grid() {
        // Both grids hit exactly; equal deltas must not pick 6.25 kHz.
        assert_eq!(quantize(1_465_000), (1_465_000, StepSetting::Step2_5kHz));
        assert_eq!(quantize(1_465_125), (1_465_000, StepSetting::Step2_5kHz));
    }

    #[test]
    fn menu_is_refused_until_the_capture_lands() {
        let (mut input, mut settings, mut notify) = shell_parts();
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let bank = MockBank::default();
        let mut scanner = Scanner::new();
        scanner.start(0, CaptureKind::Frequency, &mut shell, &bank);

        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::Scanning);
        assert_eq!(shell.notify.beep, Some(Beep::Double500Hz60ms));
    }

    #[test]
    fn full_save_into_a_selected_memory_channel() {
        let (mut input, mut settings, mut notify) = shell_parts();
        settings.cross_band = CrossBand::Band2;
        settings.screen_channel[0] = 5;
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let bank = MockBank {
            programmed: vec![12],
        };
        let mut scanner = Scanner::new();

        scanner.start(0, CaptureKind::Frequency, &mut shell, &bank);
        assert_eq!(shell.settings.cross_band, CrossBand::Off);

        scanner.frequency_found(&mut shell, 1_465_630);
        assert_eq!(scanner.phase, ScanPhase::Found);
        scanner.tone_detected(
            &mut shell,
            ToneConfig {
                code_type: CodeType::Ctcss,
                code: 7,
            },
        );

        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::EditChannel);
        for key in [KeypadKey::Num0, KeypadKey::Num1, KeypadKey::Num3] {
            press(&mut scanner, key, &mut shell, &bank);
        }
        assert_eq!(scanner.channel, 12);
        assert!(scanner.channel_known);

        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::ConfirmSave);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);

        assert_eq!(scanner.phase, ScanPhase::Idle);
        let save = shell.notify.save_channel.clone().unwrap();
        assert_eq!(save.slot, 12);
        assert_eq!(save.mode, ChannelSaveMode::Full);
        assert_eq!(save.channel.rx_frequency, 1_465_625);
        assert_eq!(save.channel.step, StepSetting::Step6_25kHz);
        assert_eq!(save.channel.rx_tone.code, 7);
        assert_eq!(shell.settings.mr_channel[0], 12);
        assert_eq!(shell.settings.screen_channel[0], 12);

        // Cross-band stays parked until the session is actually left.
        assert_eq!(shell.settings.cross_band, CrossBand::Off);
        press(&mut scanner, KeypadKey::Exit, &mut shell, &bank);
        assert_eq!(shell.settings.cross_band, CrossBand::Band2);
        assert!(shell.notify.reconfigure_vfo);
        assert_eq!(shell.notify.screen, Some(Screen::Main));
    }

    #[test]
    fn frequency_vfo_saves_into_its_band_slot() {
        let (mut input, mut settings, mut notify) = shell_parts();
        settings.screen_channel[1] = 205;
        settings.tx_vfo = 1;
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let bank = MockBank::default();
        let mut scanner = Scanner::new();

        scanner.start(1, CaptureKind::Frequency, &mut shell, &bank);
        scanner.frequency_found(&mut shell, 43_350_010);

        // No channel-edit phase for a frequency-mode VFO.
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::ConfirmSave);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);

        let save = shell.notify.save_channel.clone().unwrap();
        assert_eq!(save.slot, FREQ_CHANNEL_FIRST + 5);
        assert_eq!(shell.settings.freq_channel[1], FREQ_CHANNEL_FIRST + 5);
        assert_eq!(shell.settings.screen_channel[1], FREQ_CHANNEL_FIRST + 5);
    }

    #[test]
    fn preloaded_cursor_reflects_bank_programming() {
        let (mut input, mut settings, mut notify) = shell_parts();
        settings.screen_channel[0] = 5;
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let mut scanner = Scanner::new();

        let bank = MockBank {
            programmed: vec![5],
        };
        scanner.start(0, CaptureKind::Frequency, &mut shell, &bank);
        assert_eq!(scanner.channel, 5);
        assert!(scanner.channel_known);

        let empty = MockBank::default();
        scanner.start(0, CaptureKind::Frequency, &mut shell, &empty);
        assert_eq!(scanner.channel, 5);
        assert!(!scanner.channel_known);
    }

    #[test]
    fn channel_digits_are_announced() {
        let (mut input, mut settings, mut notify) = shell_parts();
        settings.screen_channel[0] = 5;
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let bank = MockBank::default();
        let mut scanner = Scanner::new();

        scanner.start(0, CaptureKind::Frequency, &mut shell, &bank);
        scanner.frequency_found(&mut shell, 1_465_000);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::EditChannel);

        press(&mut scanner, KeypadKey::Num4, &mut shell, &bank);
        assert_eq!(shell.notify.voice, Some(Voice::Digit(4)));
        press(&mut scanner, KeypadKey::Num2, &mut shell, &bank);
        assert_eq!(shell.notify.voice, Some(Voice::Digit(2)));
    }

    #[test]
    fn zero_channel_entry_is_rejected() {
        let (mut input, mut settings, mut notify) = shell_parts();
        settings.screen_channel[0] = 5;
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let bank = MockBank::default();
        let mut scanner = Scanner::new();

        scanner.start(0, CaptureKind::Frequency, &mut shell, &bank);
        scanner.frequency_found(&mut shell, 1_465_000);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);

        for key in [KeypadKey::Num0, KeypadKey::Num0, KeypadKey::Num0] {
            press(&mut scanner, key, &mut shell, &bank);
        }
        assert_eq!(scanner.channel, 5);
        assert_eq!(shell.notify.beep, Some(Beep::Double500Hz60ms));
        assert!(shell.input.is_empty());
    }

    #[test]
    fn exit_steps_back_one_phase_at_a_time() {
        let (mut input, mut settings, mut notify) = shell_parts();
        settings.cross_band = CrossBand::Band1;
        settings.screen_channel[0] = 5;
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let bank = MockBank::default();
        let mut scanner = Scanner::new();

        scanner.start(0, CaptureKind::Frequency, &mut shell, &bank);
        scanner.frequency_found(&mut shell, 1_465_000);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::ConfirmSave);

        press(&mut scanner, KeypadKey::Exit, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::EditChannel);

        press(&mut scanner, KeypadKey::Num4, &mut shell, &bank);
        press(&mut scanner, KeypadKey::Exit, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::EditChannel);
        assert!(shell.input.is_empty());

        press(&mut scanner, KeypadKey::Exit, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::Found);

        press(&mut scanner, KeypadKey::Exit, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::Scanning);
        assert!(shell.notify.start_scan);

        press(&mut scanner, KeypadKey::Exit, &mut shell, &bank);
        assert_eq!(scanner.phase, ScanPhase::Idle);
        assert!(shell.notify.stop_scan);
        assert_eq!(shell.settings.cross_band, CrossBand::Off);

        press(&mut scanner, KeypadKey::Exit, &mut shell, &bank);
        assert_eq!(shell.settings.cross_band, CrossBand::Band1);
        assert_eq!(shell.notify.screen, Some(Screen::Main));
    }

    #[test]
    fn tone_only_scan_saves_a_merge_request() {
        let (mut input, mut settings, mut notify) = shell_parts();
        settings.screen_channel[0] = 17;
        let mut shell = Shell {
            input: &mut input,
            settings: &mut settings,
            notify: &mut notify,
        };
        let bank = MockBank {
            programmed: vec![17],
        };
        let mut scanner = Scanner::new();

        scanner.start(0, CaptureKind::Tone, &mut shell, &bank);
        scanner.tone_detected(
            &mut shell,
            ToneConfig {
                code_type: CodeType::Dcs,
                code: 23,
            },
        );
        assert_eq!(scanner.phase, ScanPhase::Found);

        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);
        press(&mut scanner, KeypadKey::Menu, &mut shell, &bank);

        let save = shell.notify.save_channel.clone().unwrap();
        assert_eq!(save.mode, ChannelSaveMode::ToneOnly);
        assert_eq!(save.slot, 17);
        assert_eq!(save.channel.rx_tone.code_type, CodeType::Dcs);
    }
}
