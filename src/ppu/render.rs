//! Scanline renderer
//!
//! Resolves one line of background, window and sprites into 2-bit shades.
//! Everything is read from the register and memory state at the moment the
//! line is drawn.

use crate::bus::{OAM_SIZE, VRAM_SIZE};
use crate::common::{bit, Byte};
use crate::lcd::Lcd;

use super::SCREEN_WIDTH;

/// Sprites the hardware draws on one line at most.
pub const MAX_SPRITES_PER_LINE: usize = 10;
const OAM_ENTRIES: usize = OAM_SIZE / 4;
/// WX values above this put the window off-screen.
const WX_MAX: Byte = 166;

/// One sprite attribute entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OamEntry {
    /// Screen Y + 16
    pub y: Byte,
    /// Screen X + 8
    pub x: Byte,
    pub tile: Byte,
    pub flags: Byte,
    /// Position in OAM, used to break X ties
    pub index: u8,
}

impl OamEntry {
    pub fn read(oam: &[Byte; OAM_SIZE], index: usize) -> Self {
        let base = index * 4;
        Self {
            y: oam[base],
            x: oam[base + 1],
            tile: oam[base + 2],
            flags: oam[base + 3],
            index: index as u8,
        }
    }

    /// OBP1 instead of OBP0 (bit 4)
    pub fn uses_obp1(&self) -> bool {
        bit(self.flags, 4)
    }

    pub fn x_flip(&self) -> bool {
        bit(self.flags, 5)
    }

    pub fn y_flip(&self) -> bool {
        bit(self.flags, 6)
    }

    /// Non-zero background colours cover this sprite (bit 7)
    pub fn behind_bg(&self) -> bool {
        bit(self.flags, 7)
    }

    fn covers_line(&self, ly: u8, height: u8) -> bool {
        let top = self.y as i16 - 16;
        let line = ly as i16;
        line >= top && line < top + height as i16
    }
}

/// Colour index (0-3) of pixel `x` in a tile row starting at `offset`.
fn tile_pixel(vram: &[Byte; VRAM_SIZE], offset: usize, x: u8) -> u8 {
    let lo = vram[offset];
    let hi = vram[offset + 1];
    let shift = 7 - (x & 0x07);
    ((hi >> shift) & 1) << 1 | ((lo >> shift) & 1)
}

/// VRAM offset of `row` of a background/window tile.
fn bg_tile_row(lcd: &Lcd, index: Byte, row: u8) -> usize {
    let row = (row & 0x07) as usize * 2;
    if lcd.unsigned_tile_data() {
        index as usize * 16 + row
    } else {
        // signed indices around 0x9000
        (0x1000 + index as i8 as isize * 16) as usize + row
    }
}

/// Colour index at (`x`, `y`) of the 256x256 map starting at `map`.
fn map_pixel(lcd: &Lcd, vram: &[Byte; VRAM_SIZE], map: u16, x: u8, y: u8) -> u8 {
    let map_offset = (map - 0x8000) as usize + (y as usize / 8) * 32 + x as usize / 8;
    let offset = bg_tile_row(lcd, vram[map_offset], y);
    tile_pixel(vram, offset, x)
}

/// First ten OAM entries that intersect line `ly`, in drawing priority
/// order: lower X first, OAM index breaking ties.
pub fn select_sprites(lcd: &Lcd, oam: &[Byte; OAM_SIZE], ly: u8) -> Vec<OamEntry> {
    let height = lcd.sprite_height();
    let mut sprites: Vec<OamEntry> = (0..OAM_ENTRIES)
        .map(|index| OamEntry::read(oam, index))
        .filter(|sprite| sprite.covers_line(ly, height))
        .take(MAX_SPRITES_PER_LINE)
        .collect();
    sprites.sort_by_key(|sprite| (sprite.x, sprite.index));
    sprites
}

/// Colour index of `sprite` at screen column `x`, or `None` when the
/// sprite does not cover it or the pixel is transparent.
fn sprite_pixel(lcd: &Lcd, vram: &[Byte; VRAM_SIZE], sprite: &OamEntry, x: u8, ly: u8) -> Option<u8> {
    let left = sprite.x as i16 - 8;
    let column = x as i16 - left;
    if !(0..8).contains(&column) {
        return None;
    }

    let height = lcd.sprite_height();
    let mut row = (ly as i16 - (sprite.y as i16 - 16)) as u8;
    if sprite.y_flip() {
        row = height - 1 - row;
    }
    let mut column = column as u8;
    if sprite.x_flip() {
        column = 7 - column;
    }

    let tile = if height == 16 { sprite.tile & 0xFE } else { sprite.tile };
    let offset = tile as usize * 16 + row as usize * 2;
    match tile_pixel(vram, offset, column) {
        0 => None,
        color => Some(color),
    }
}

/// Render line `ly` into `shades`. Returns whether the window was drawn,
/// which is what advances the window's own line counter.
pub fn render_line(
    lcd: &Lcd,
    vram: &[Byte; VRAM_SIZE],
    oam: &[Byte; OAM_SIZE],
    ly: u8,
    window_line: u8,
    shades: &mut [u8; SCREEN_WIDTH],
) -> bool {
    let mut bg_colors = [0u8; SCREEN_WIDTH];
    let mut window_drawn = false;

    if lcd.bg_window_enabled() {
        let y = lcd.scy.wrapping_add(ly);
        for (x, color) in bg_colors.iter_mut().enumerate() {
            *color = map_pixel(lcd, vram, lcd.bg_tile_map(), lcd.scx.wrapping_add(x as u8), y);
        }

        if lcd.window_enabled() && ly >= lcd.wy && lcd.wx <= WX_MAX {
            let start = lcd.wx as i16 - 7;
            for (x, color) in bg_colors.iter_mut().enumerate() {
                let window_x = x as i16 - start;
                if window_x < 0 {
                    continue;
                }
                *color = map_pixel(lcd, vram, lcd.window_tile_map(), window_x as u8, window_line);
                window_drawn = true;
            }
        }
    }

    for (shade, &color) in shades.iter_mut().zip(bg_colors.iter()) {
        *shade = lcd.bg_shade(color);
    }

    if lcd.sprites_enabled() {
        let sprites = select_sprites(lcd, oam, ly);
        for (x, shade) in shades.iter_mut().enumerate() {
            let hit = sprites
                .iter()
                .find_map(|sprite| sprite_pixel(lcd, vram, sprite, x as u8, ly).map(|c| (sprite, c)));
            if let Some((sprite, color)) = hit {
                if sprite.behind_bg() && bg_colors[x] != 0 {
                    continue;
                }
                *shade = lcd.obj_shade(color, sprite.uses_obp1());
            }
        }
    }

    window_drawn
}
