use crate::bk1080::FmTuner;
use crate::eeprom::Eeprom;
use crate::event::Event;
use crate::fm::FmRadio;
use crate::inputbox::InputBox;
use crate::keypad::{KeyState, KeypadKey};
use crate::notify::{Beep, Notifications, Screen};
use crate::radio::ChannelBank;
use crate::scanner::{CaptureKind, Scanner};
use crate::settings::{Function, Settings};

/// The mutable context every key handler works against, borrowed out of the
/// [`App`] for the duration of a single dispatch.
pub struct Shell<'a> {
    pub input: &'a mut InputBox,
    pub settings: &'a mut Settings,
    pub notify: &'a mut Notifications,
}

/// Top-level control state. Hardware stays outside; the tuner, eeprom and
/// channel bank are lent in per call so the host can own them however its
/// executor requires.
pub struct App {
    pub settings: Settings,
    pub fm: FmRadio,
    pub scanner: Scanner,
    pub input: InputBox,
    pub notify: Notifications,
    pub screen: Screen,
    pub function: Function,
    f_key_latched: bool,
}

impl App {
    pub fn new(settings: Settings) -> App {
        App {
            settings,
            fm: FmRadio::new(),
            scanner: Scanner::new(),
            input: InputBox::new(),
            notify: Notifications::new(),
            screen: Screen::Main,
            function: Function::Idle,
            f_key_latched: false,
        }
    }

    /// Loads the persisted state this core mirrors in RAM.
    pub fn load(&mut self, eeprom: &mut impl Eeprom) {
        self.fm.channels.load(eeprom);
    }

    pub fn handle_event(
        &mut self,
        event: Event,
        tuner: &mut impl FmTuner,
        eeprom: &mut impl Eeprom,
        bank: &impl ChannelBank,
    ) {
        match event {
            Event::Key(key, state) => self.handle_key(key, state, tuner, eeprom, bank),
            Event::Ptt(pressed) => {
                self.function = if pressed {
                    Function::Transmit
                } else {
                    Function::Idle
                };
            }
            Event::Tick => self.tick(tuner),
            Event::ScanFrequencyFound(frequency) => {
                let mut shell = Shell {
                    input: &mut self.input,
                    settings: &mut self.settings,
                    notify: &mut self.notify,
                };
                self.scanner.frequency_found(&mut shell, frequency);
            }
            Event::ScanToneFound(tone) => {
                let mut shell = Shell {
                    input: &mut self.input,
                    settings: &mut self.settings,
                    notify: &mut self.notify,
                };
                self.scanner.tone_detected(&mut shell, tone);
            }
        }
        if let Some(screen) = self.notify.screen {
            self.screen = screen;
        }
    }

    fn handle_key(
        &mut self,
        key: KeypadKey,
        state: KeyState,
        tuner: &mut impl FmTuner,
        eeprom: &mut impl Eeprom,
        bank: &impl ChannelBank,
    ) {
        let mut shell = Shell {
            input: &mut self.input,
            settings: &mut self.settings,
            notify: &mut self.notify,
        };
        if self.screen == Screen::Scanner {
            self.scanner.process_keys(key, state, &mut shell, bank);
        } else if self.fm.radio_mode {
            self.fm.process_keys(
                key,
                state,
                &mut self.f_key_latched,
                self.function,
                &mut shell,
                tuner,
                eeprom,
            );
        } else {
            // Main screen: only the scanner launch and the function latch
            // belong to this core. Everything else is the host's VFO entry.
            let (pressed, held) = state.pressed_held();
            if !pressed || held {
                return;
            }
            match key {
                KeypadKey::Num0 if self.f_key_latched => {
                    self.f_key_latched = false;
                    shell.notify.status_changed = true;
                    self.fm.switch(&mut shell, tuner, self.function);
                }
                KeypadKey::Star => {
                    let kind = if self.f_key_latched {
                        CaptureKind::Tone
                    } else {
                        CaptureKind::Frequency
                    };
                    self.f_key_latched = false;
                    shell.notify.beep = Some(Beep::Single1kHz60ms);
                    let vfo_slot = shell.settings.tx_vfo;
                    self.scanner.start(vfo_slot, kind, &mut shell, bank);
                }
                KeypadKey::Function => {
                    self.f_key_latched = !self.f_key_latched;
                    shell.notify.status_changed = true;
                    shell.notify.beep = Some(Beep::Single1kHz60ms);
                }
                _ => {}
            }
        }
    }

    /// Periodic service: countdowns first, then any classification that came
    /// due this tick.
    pub fn tick(&mut self, tuner: &mut impl FmTuner) {
        self.fm.tick();
        let mut shell = Shell {
            input: &mut self.input,
            settings: &mut self.settings,
            notify: &mut self.notify,
        };
        self.fm.poll(&mut shell, tuner);
        if let Some(screen) = self.notify.screen {
            self.screen = screen;
        }
    }
}
