use gba_video_common::frontend::Color;
use gba_video_config::GbaColorConversion;
use std::array;
use std::sync::LazyLock;

const RGB_5_TO_8: &[u8; 32] = &[
    0, 8, 16, 25, 33, 41, 49, 58, 66, 74, 82, 90, 99, 107, 115, 123, 132, 140, 148, 156, 165, 173,
    181, 189, 197, 206, 214, 222, 230, 239, 247, 255,
];

pub type ColorTable = [Color; 32768];

fn build_table(expand: impl Fn(usize) -> u8) -> Box<ColorTable> {
    Box::new(array::from_fn(|color| {
        let r = color & 0x1F;
        let g = (color >> 5) & 0x1F;
        let b = (color >> 10) & 0x1F;
        Color::rgb(expand(r), expand(g), expand(b))
    }))
}

static SHIFTED_TABLE: LazyLock<Box<ColorTable>> =
    LazyLock::new(|| build_table(|component| (component << 3) as u8));

static FULL_RANGE_TABLE: LazyLock<Box<ColorTable>> =
    LazyLock::new(|| build_table(|component| RGB_5_TO_8[component]));

pub fn table(conversion: GbaColorConversion) -> &'static ColorTable {
    match conversion {
        GbaColorConversion::Shifted => &SHIFTED_TABLE,
        GbaColorConversion::FullRange => &FULL_RANGE_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_and_primaries() {
        let shifted = table(GbaColorConversion::Shifted);
        assert_eq!(shifted[0x7FFF], Color::rgb(248, 248, 248));
        assert_eq!(shifted[0x001F], Color::rgb(248, 0, 0));
        assert_eq!(shifted[0x7C00].to_argb8888(), 0xFF00_00F8);

        let full_range = table(GbaColorConversion::FullRange);
        assert_eq!(full_range[0x7FFF], Color::WHITE);
        assert_eq!(full_range[0x03E0], Color::rgb(0, 255, 0));
    }
}
