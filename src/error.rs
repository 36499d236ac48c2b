//! Error taxonomy
//!
//! Two kinds of failure end a session: a cartridge image that cannot be
//! loaded ([`LoadError`]) and a machine state the engine cannot continue
//! from ([`Fault`]). Degraded-but-running conditions are not errors; they
//! are reported through [`crate::diagnostics::Diagnostics`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::common::{Byte, Word};

/// Fatal problems while loading a cartridge image or its persisted RAM.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read cartridge image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cartridge image is {len} bytes, too short to hold a header")]
    Truncated { len: usize },

    #[error("cartridge header declares unsupported ROM size code 0x{code:02X}")]
    InvalidRomSize { code: Byte },

    #[error("no cartridge is loaded")]
    NotLoaded,
}

/// Fatal conditions raised while stepping the machine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("undefined opcode 0x{opcode:02X} at 0x{pc:04X}")]
    InvalidOpcode { opcode: Byte, pc: Word },

    #[error("session has no cartridge loaded")]
    NoCartridge,
}

/// Any error the emulator core can return.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fault(#[from] Fault),
}
