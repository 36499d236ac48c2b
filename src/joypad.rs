//! Joypad
//!
//! P1/JOYP (0xFF00). Bits 4 and 5 select the direction or action group
//! (0 = selected); bits 0-3 report the selected group, 0 = pressed.

use crate::common::Byte;

pub const P1_ADDRESS: u16 = 0xFF00;

const SELECT_DIRECTIONS: Byte = 0x10;
const SELECT_ACTIONS: Byte = 0x20;

/// Game Boy buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
    ];

    /// Line within its group (bit 0-3 of P1).
    fn line(self) -> Byte {
        match self {
            Button::Right | Button::A => 0x01,
            Button::Left | Button::B => 0x02,
            Button::Up | Button::Select => 0x04,
            Button::Down | Button::Start => 0x08,
        }
    }

    fn is_direction(self) -> bool {
        matches!(self, Button::Right | Button::Left | Button::Up | Button::Down)
    }
}

#[derive(Debug, Clone)]
pub struct Joypad {
    /// Pressed direction lines, 1 = pressed
    directions: Byte,
    /// Pressed action lines, 1 = pressed
    actions: Byte,
    /// Bits 4-5 as last written
    select: Byte,
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            directions: 0,
            actions: 0,
            select: SELECT_DIRECTIONS | SELECT_ACTIONS,
        }
    }

    pub fn read(&self) -> Byte {
        let mut pressed = 0;
        if self.select & SELECT_DIRECTIONS == 0 {
            pressed |= self.directions;
        }
        if self.select & SELECT_ACTIONS == 0 {
            pressed |= self.actions;
        }
        0xC0 | self.select | (!pressed & 0x0F)
    }

    pub fn write(&mut self, value: Byte) {
        self.select = value & (SELECT_DIRECTIONS | SELECT_ACTIONS);
    }

    /// Update a button. Returns `true` on a release-to-press transition,
    /// which requests the joypad interrupt.
    pub fn set_button(&mut self, button: Button, pressed: bool) -> bool {
        let lines = if button.is_direction() {
            &mut self.directions
        } else {
            &mut self.actions
        };
        let was_pressed = *lines & button.line() != 0;
        if pressed {
            *lines |= button.line();
        } else {
            *lines &= !button.line();
        }
        pressed && !was_pressed
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        let lines = if button.is_direction() {
            self.directions
        } else {
            self.actions
        };
        lines & button.line() != 0
    }

    /// Release every button, keeping the group selection.
    pub fn release_all(&mut self) {
        self.directions = 0;
        self.actions = 0;
    }

    /// Power-on joypad with the same buttons held.
    pub fn held(&self) -> Joypad {
        let mut pad = Joypad::new();
        for button in Button::ALL {
            if self.is_pressed(button) {
                pad.set_button(button, true);
            }
        }
        pad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_selected_reads_ff() {
        let mut pad = Joypad::new();
        pad.set_button(Button::A, true);
        assert_eq!(pad.read(), 0xFF);
    }

    #[test]
    fn test_action_group() {
        let mut pad = Joypad::new();
        pad.write(0x10);
        assert_eq!(pad.read() & 0x0F, 0x0F);

        pad.set_button(Button::A, true);
        assert_eq!(pad.read() & 0x0F, 0x0E);
        pad.set_button(Button::Start, true);
        assert_eq!(pad.read() & 0x0F, 0x06);

        // Directions are not visible in the action group
        pad.set_button(Button::Left, true);
        assert_eq!(pad.read() & 0x0F, 0x06);
    }

    #[test]
    fn test_direction_group() {
        let mut pad = Joypad::new();
        pad.write(0x20);
        pad.set_button(Button::Right, true);
        pad.set_button(Button::Up, true);
        assert_eq!(pad.read(), 0xE0 | 0x0A);
    }

    #[test]
    fn test_press_edge_only() {
        let mut pad = Joypad::new();
        assert!(pad.set_button(Button::B, true));
        assert!(!pad.set_button(Button::B, true));
        assert!(!pad.set_button(Button::B, false));
        assert!(pad.set_button(Button::B, true));
        assert!(pad.is_pressed(Button::B));

        pad.release_all();
        assert!(Button::ALL.iter().all(|&b| !pad.is_pressed(b)));
    }

    #[test]
    fn test_held_keeps_buttons_not_selection() {
        let mut pad = Joypad::new();
        pad.write(0x10);
        pad.set_button(Button::Start, true);
        pad.set_button(Button::Left, true);

        let fresh = pad.held();
        for button in Button::ALL {
            assert_eq!(fresh.is_pressed(button), pad.is_pressed(button), "{button:?}");
        }
        assert_eq!(fresh.read(), 0xFF);
    }
}
