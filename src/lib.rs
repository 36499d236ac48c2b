//! shatter: a Game Boy (DMG) emulator core
//!
//! The crate emulates the SM83 CPU, the scanline PPU, the timer, the joypad
//! and the common cartridge bank controllers behind a single
//! [`Emulator`] session. Hosts drive a session one instruction or one frame
//! at a time and receive finished frames through a draw callback.

pub mod bus;
pub mod cart;
pub mod common;
pub mod config;
pub mod cpu;
pub mod diagnostics;
pub mod dma;
pub mod emu;
pub mod error;
pub mod interrupts;
pub mod joypad;
pub mod lcd;
pub mod ppu;
pub mod ram;
pub mod scheduler;
pub mod timer;
#[cfg(feature = "sdl")]
pub mod ui;

pub use cart::{MbcKind, RomHeader};
pub use config::{EmulatorConfig, Palette};
pub use diagnostics::{Diagnostics, LogDiagnostics, NullDiagnostics, RecordingDiagnostics};
pub use emu::{DrawCallback, Emulator};
pub use error::{Error, Fault, LoadError};
pub use joypad::Button;
pub use ppu::{FrameBuffer, FRAME_BYTES, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use scheduler::{Scheduler, SessionId};
