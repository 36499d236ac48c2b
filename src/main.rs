//! shatter command line host
//!
//! Loads a cartridge image, restores its battery RAM and runs it either in
//! an SDL2 window (feature `sdl`) or headless for a fixed number of frames.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use shatter::{Emulator, EmulatorConfig, LogDiagnostics, Palette};

#[derive(Parser, Debug)]
#[command(name = "shatter", version, about = "Game Boy (DMG) emulator")]
struct Args {
    /// Path to ROM file
    rom: PathBuf,

    /// Window scale factor
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Output palette (grayscale or green)
    #[arg(long, default_value_t = Palette::Grayscale)]
    palette: Palette,

    /// Run without opening a window and print a digest of the last frame
    #[arg(long)]
    headless: bool,

    /// Number of frames to run in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Do not read or write the battery save file
    #[arg(long)]
    no_save: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = EmulatorConfig { palette: args.palette };
    let mut emulator = Emulator::new(config, Box::new(LogDiagnostics));
    let header = emulator
        .load_file(&args.rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;
    let battery = header.has_battery() && !args.no_save;

    let save_path = args.rom.with_extension("sav");
    if battery {
        restore_battery(&mut emulator, &save_path)?;
    }

    let outcome = if args.headless {
        run_headless(&mut emulator, args.frames)
    } else {
        run_window(&mut emulator, args.scale)
    };

    if battery {
        persist_battery(&emulator, &save_path)?;
    }
    outcome
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn restore_battery(emulator: &mut Emulator, path: &Path) -> Result<()> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    emulator.load_cartridge_ram(&data)?;
    info!("restored {} bytes of cartridge RAM from {}", data.len(), path.display());
    Ok(())
}

fn persist_battery(emulator: &Emulator, path: &Path) -> Result<()> {
    let Some(ram) = emulator.cartridge_ram() else {
        return Ok(());
    };
    if ram.is_empty() {
        return Ok(());
    }
    fs::write(path, ram).with_context(|| format!("failed to write {}", path.display()))?;
    info!("saved {} bytes of cartridge RAM to {}", ram.len(), path.display());
    Ok(())
}

fn run_headless(emulator: &mut Emulator, frames: u64) -> Result<()> {
    emulator.start();
    for _ in 0..frames {
        emulator.run_frame()?;
    }

    let serial = emulator.take_serial_output();
    if !serial.is_empty() {
        println!("serial: {}", String::from_utf8_lossy(&serial));
    }
    println!(
        "frames={} cycles={} digest={:016x}",
        emulator.frame_count(),
        emulator.total_cycles(),
        frame_digest(emulator.frame())
    );
    Ok(())
}

#[cfg(feature = "sdl")]
fn run_window(emulator: &mut Emulator, scale: u32) -> Result<()> {
    let title = match emulator.header() {
        Some(header) if !header.title.is_empty() => format!("shatter - {}", header.title),
        _ => "shatter".to_string(),
    };
    let mut ui = shatter::ui::Ui::new(&title, scale).map_err(anyhow::Error::msg)?;
    ui.run(emulator).map_err(anyhow::Error::msg)
}

#[cfg(not(feature = "sdl"))]
fn run_window(_emulator: &mut Emulator, _scale: u32) -> Result<()> {
    anyhow::bail!("no window frontend available; rerun with --headless")
}

/// 64-bit FNV-1a over the frame bytes.
fn frame_digest(frame: &[u8]) -> u64 {
    frame.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &byte| {
        (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
