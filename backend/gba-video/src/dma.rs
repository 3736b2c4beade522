//! DMA start occasions signalled by the PPU

use bincode::{Decode, Encode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, strum::Display)]
pub enum DmaOccasion {
    /// Start of HBlank on visible lines
    HBlank,
    /// Start of VBlank
    VBlank,
    /// Video capture DMA (DMA3 special timing), lines 2-161
    Video,
}

/// DMA controller as seen by the PPU.
pub trait DmaRequests {
    fn request_dma(&mut self, occasion: DmaOccasion);

    /// Video capture DMA ends at line 162.
    fn stop_video_dma(&mut self);
}
