//! Hardware-independent control core for the UV-K5 style handheld: the FM
//! broadcast receiver and the channel scanner, driven entirely by events and
//! lent-in hardware traits.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod bk1080;
pub mod eeprom;
pub mod error;
pub mod event;
pub mod fm;
pub mod frequencies;
pub mod inputbox;
pub mod keypad;
pub mod lock;
pub mod notify;
pub mod radio;
pub mod scanner;
pub mod settings;

#[cfg(test)]
pub(crate) mod testutil;

pub use app::{App, Shell};
pub use error::Error;
pub use event::Event;
