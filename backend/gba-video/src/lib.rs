//! Cycle-accurate Game Boy Advance video unit

pub mod api;
pub mod dma;
pub mod interrupts;
pub mod objects;
pub mod ppu;
mod scheduler;

pub use api::{GbaVideoConfig, PpuError, VideoBus};
pub use ppu::memory::{VideoMemory, Width};
pub use ppu::{FRAME_SIZE, Pixel, Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};
