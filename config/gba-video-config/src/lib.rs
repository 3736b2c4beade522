use bincode::{Decode, Encode};

/// How 15-bit GBA colors are widened to 8 bits per channel in the output frame buffer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum GbaColorConversion {
    /// Shift each 5-bit component left by 3; white is (248, 248, 248)
    #[default]
    Shifted,
    /// Scale each 5-bit component across the full 0-255 range; white is (255, 255, 255)
    FullRange,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FrameBuffering {
    /// Presentation reads the buffer that is being drawn
    Single,
    /// Presentation reads the last completed frame; buffers swap at the start of V-blank
    #[default]
    Double,
}

impl FrameBuffering {
    #[inline]
    #[must_use]
    pub fn buffer_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }
}
