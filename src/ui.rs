//! SDL2 window frontend
//!
//! Presents a session's frames in a window and feeds keyboard input back in
//! as button presses. Frames arrive through the session's draw callback over
//! a bounded channel, so the window only ever shows completed frames.

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::emu::Emulator;
use crate::joypad::Button;
use crate::ppu::{FrameBuffer, BYTES_PER_PIXEL, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Frames buffered between the draw callback and the window.
const FRAME_QUEUE: usize = 2;

/// DMG refresh rate, 4194304 / 70224.
const FRAME_RATE: f64 = 59.7275;

pub struct Ui {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    texture_creator: TextureCreator<WindowContext>,
}

impl Ui {
    pub fn new(title: &str, scale: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let scale = scale.max(1);
        let window = video_subsystem
            .window(
                title,
                SCREEN_WIDTH as u32 * scale,
                SCREEN_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window
            .into_canvas()
            .software()
            .build()
            .map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok(Self {
            canvas,
            event_pump,
            texture_creator,
        })
    }

    /// Drive `emulator` until the window closes, Escape is pressed or the
    /// session stops on a fault.
    pub fn run(&mut self, emulator: &mut Emulator) -> Result<(), String> {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGBA32,
                SCREEN_WIDTH as u32,
                SCREEN_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let frames = attach_frame_channel(emulator);
        let frame_duration = Duration::from_secs_f64(1.0 / FRAME_RATE);
        emulator.start();

        'running: loop {
            let frame_start = Instant::now();

            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. }
                    | Event::KeyDown {
                        keycode: Some(Keycode::Escape),
                        ..
                    } => break 'running,
                    Event::KeyDown {
                        keycode: Some(key),
                        repeat: false,
                        ..
                    } => {
                        if let Some(button) = keycode_to_button(key) {
                            emulator.press(button);
                        }
                    }
                    Event::KeyUp {
                        keycode: Some(key), ..
                    } => {
                        if let Some(button) = keycode_to_button(key) {
                            emulator.release(button);
                        }
                    }
                    _ => {}
                }
            }

            emulator.run_frame().map_err(|fault| fault.to_string())?;
            if !emulator.is_running() {
                break;
            }

            let serial = emulator.take_serial_output();
            if !serial.is_empty() {
                log::info!(target: "shatter::serial", "{}", String::from_utf8_lossy(&serial));
            }

            // Show the newest frame, dropping any the window fell behind on.
            if let Some(frame) = frames.try_iter().last() {
                texture
                    .update(None, &frame, SCREEN_WIDTH * BYTES_PER_PIXEL)
                    .map_err(|e| e.to_string())?;
            }

            self.canvas.clear();
            self.canvas.copy(&texture, None, None)?;
            self.canvas.present();

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }

        emulator.stop();
        Ok(())
    }
}

/// Route the session's finished frames into a bounded channel. A full
/// channel drops the frame rather than stalling emulation.
fn attach_frame_channel(emulator: &mut Emulator) -> Receiver<Vec<u8>> {
    let (tx, rx) = crossbeam_channel::bounded(FRAME_QUEUE);
    emulator.set_draw_callback(Box::new(move |frame: &FrameBuffer| {
        let _ = tx.try_send(frame.to_vec());
    }));
    rx
}

fn keycode_to_button(keycode: Keycode) -> Option<Button> {
    match keycode {
        Keycode::Up => Some(Button::Up),
        Keycode::Down => Some(Button::Down),
        Keycode::Left => Some(Button::Left),
        Keycode::Right => Some(Button::Right),
        Keycode::Z => Some(Button::A),
        Keycode::X => Some(Button::B),
        Keycode::Return => Some(Button::Start),
        Keycode::Backspace => Some(Button::Select),
        _ => None,
    }
}
