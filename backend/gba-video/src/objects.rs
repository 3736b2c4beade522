//! Interfaces to the object (sprite) and window collaborators
//!
//! OBJ rendering and window mask generation run outside this crate. The PPU tells them when to
//! prepare a line and queries their results per pixel while compositing.

use crate::ppu::Pixel;
use crate::ppu::memory::VideoMemory;
use bincode::{Decode, Encode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct ObjPixel {
    pub color: Pixel,
    /// 0 (highest) to 3 (lowest)
    pub priority: u8,
    pub semi_transparent: bool,
    /// Pixel belongs to an OBJ window sprite
    pub window: bool,
}

impl ObjPixel {
    pub const TRANSPARENT: Self =
        Self { color: Pixel::TRANSPARENT, priority: 4, semi_transparent: false, window: false };
}

/// What the object collaborator needs to know to prepare a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjLineParams {
    pub line: u32,
    /// OBJ tiles 0-511 are unusable in bitmap modes
    pub bitmap_mode: bool,
    /// DISPCNT bit 6: 1D tile mapping when set
    pub one_dimensional_mapping: bool,
    /// DISPCNT bit 5
    pub oam_free_during_hblank: bool,
    pub mosaic_width: u8,
    pub mosaic_height: u8,
    /// Vertical OBJ mosaic counter for this line
    pub mosaic_counter: u8,
}

pub trait ObjectLayer {
    /// Prepare the OBJ line buffer for `params.line`; called one line ahead of compositing.
    fn render_obj_line(&mut self, memory: &VideoMemory, params: &ObjLineParams);

    /// OBJ pixel at column `x` of the most recently prepared line.
    fn obj_pixel(&self, x: u32) -> ObjPixel;
}

/// Raw WINxH/WINxV coordinates for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowBounds {
    pub x1: u8,
    pub x2: u8,
    pub y1: u8,
    pub y2: u8,
}

pub trait WindowMasks {
    /// Prepare the mask of window `window` (0 or 1) for `line`.
    fn render_window_line(&mut self, window: usize, line: u32, bounds: WindowBounds);

    /// Whether column `x` of the current line is inside window `window`.
    fn inside_window(&self, window: usize, x: u32) -> bool;
}
