//! GBA video unit public interface

use crate::dma::DmaRequests;
use crate::interrupts::InterruptLine;
use crate::objects::{ObjectLayer, WindowMasks};
use bincode::{Decode, Encode};
use gba_video_common::frontend::Renderer;
use gba_video_config::{FrameBuffering, GbaColorConversion};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GbaVideoConfig {
    pub color_conversion: GbaColorConversion,
    pub frame_buffering: FrameBuffering,
}

#[derive(Debug, Error)]
pub enum PpuError<RErr> {
    #[error("Error rendering video output: {0}")]
    Render(RErr),
}

/// Everything the PPU talks to while stepping: the interrupt and DMA controllers, the object and
/// window collaborators, and the presentation layer.
pub trait VideoBus: InterruptLine + DmaRequests + ObjectLayer + WindowMasks + Renderer {}

impl<T> VideoBus for T where
    T: InterruptLine + DmaRequests + ObjectLayer + WindowMasks + Renderer
{
}
