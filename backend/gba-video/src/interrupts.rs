//! Interrupt signals raised by the PPU

use bincode::{Decode, Encode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, strum::Display)]
pub enum InterruptType {
    #[strum(to_string = "VBlank")]
    VBlank = 0,
    #[strum(to_string = "HBlank")]
    HBlank = 1,
    #[strum(to_string = "V counter match")]
    VCounter = 2,
}

impl InterruptType {
    /// Bit mask of this interrupt in the IE/IF registers.
    #[must_use]
    pub fn to_mask(self) -> u16 {
        1 << (self as u8)
    }
}

/// Interrupt controller as seen by the PPU.
pub trait InterruptLine {
    fn raise_interrupt(&mut self, interrupt: InterruptType);
}
