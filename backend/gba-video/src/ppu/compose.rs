//! Layer merging, windows, and color special effects

use crate::objects::{ObjPixel, ObjectLayer, WindowMasks};
use crate::ppu::registers::{BlendMode, Registers, Window, WindowEnabled};
use crate::ppu::{Pixel, Ppu, SCREEN_WIDTH, colors};
use std::cmp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Bg0,
    Bg1,
    Bg2,
    Bg3,
    Obj,
    Backdrop,
}

impl Layer {
    const BG: [Self; 4] = [Self::Bg0, Self::Bg1, Self::Bg2, Self::Bg3];

    fn is_1st_target_enabled(self, registers: &Registers) -> bool {
        match self {
            Self::Bg0 => registers.bg_blend_1st_target[0],
            Self::Bg1 => registers.bg_blend_1st_target[1],
            Self::Bg2 => registers.bg_blend_1st_target[2],
            Self::Bg3 => registers.bg_blend_1st_target[3],
            Self::Obj => registers.obj_blend_1st_target,
            Self::Backdrop => registers.backdrop_blend_1st_target,
        }
    }

    fn is_2nd_target_enabled(self, registers: &Registers) -> bool {
        match self {
            Self::Bg0 => registers.bg_blend_2nd_target[0],
            Self::Bg1 => registers.bg_blend_2nd_target[1],
            Self::Bg2 => registers.bg_blend_2nd_target[2],
            Self::Bg3 => registers.bg_blend_2nd_target[3],
            Self::Obj => registers.obj_blend_2nd_target,
            Self::Backdrop => registers.backdrop_blend_2nd_target,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MergePixel {
    color: Pixel,
    layer: Layer,
    // 4 is the backdrop, below every BG and OBJ priority
    priority: u8,
}

#[derive(Debug, Clone, Copy)]
struct BlendCoefficients {
    eva: u16,
    evb: u16,
    evy: u16,
}

impl BlendCoefficients {
    fn new(registers: &Registers) -> Self {
        Self {
            eva: cmp::min(16, registers.blend_alpha_a).into(),
            evb: cmp::min(16, registers.blend_alpha_b).into(),
            evy: cmp::min(16, registers.blend_brightness).into(),
        }
    }
}

impl Ppu {
    pub(super) fn compose_line<B: ObjectLayer + WindowMasks>(&mut self, bus: &B) {
        let line = self.state.vcount;
        let registers = &self.registers;
        let color_table = colors::table(self.config.color_conversion);
        let coefficients = BlendCoefficients::new(registers);

        let backdrop = MergePixel {
            color: Pixel::new_opaque(self.memory.palette_color(0)),
            layer: Layer::Backdrop,
            priority: 4,
        };

        // Back-to-front: lowest priority first, and the higher-numbered BG first within a priority
        let mut bg_order = [0; 4];
        let mut bg_count = 0;
        for priority in (0..4).rev() {
            for bg in registers.bg_mode.bg_range().rev() {
                if registers.bg_control[bg].priority == priority
                    && self.state.bg_enable.current[bg]
                    && registers.bg_enabled[bg]
                {
                    bg_order[bg_count] = bg;
                    bg_count += 1;
                }
            }
        }
        let bg_order = &bg_order[..bg_count];

        let any_window_enabled = registers.any_window_enabled();
        let frame_buffer = &mut self.frame_buffers[self.draw_buffer];

        for x in 0..SCREEN_WIDTH {
            let obj = bus.obj_pixel(x);

            let window_layers = if any_window_enabled {
                registers.window_layers_enabled(select_window(registers, bus, &obj, x))
            } else {
                WindowEnabled::ALL
            };

            let mut first = backdrop;
            let mut second = backdrop;

            for &bg in bg_order {
                if !window_layers.bg[bg] {
                    continue;
                }

                let color = self.buffers.bg_pixels[bg][x as usize];
                if color.is_transparent() {
                    continue;
                }

                second = first;
                first = MergePixel {
                    color,
                    layer: Layer::BG[bg],
                    priority: registers.bg_control[bg].priority,
                };
            }

            let mut is_semi_transparent_obj = false;
            if registers.obj_enabled && window_layers.obj && !obj.color.is_transparent() {
                let obj_pixel =
                    MergePixel { color: obj.color, layer: Layer::Obj, priority: obj.priority };

                // OBJs win priority ties against BGs
                if obj.priority <= first.priority {
                    second = first;
                    first = obj_pixel;
                    is_semi_transparent_obj = obj.semi_transparent;
                } else if obj.priority <= second.priority {
                    second = obj_pixel;
                }
            }

            let color = if !any_window_enabled || window_layers.blend || is_semi_transparent_obj {
                apply_color_effects(registers, first, second, is_semi_transparent_obj, coefficients)
            } else {
                first.color
            };

            frame_buffer.set(line, x, color_table[usize::from(color.color())]);
        }
    }
}

fn select_window<W: WindowMasks>(
    registers: &Registers,
    windows: &W,
    obj: &ObjPixel,
    x: u32,
) -> Window {
    if registers.window_enabled[0] && windows.inside_window(0, x) {
        Window::Inside0
    } else if registers.window_enabled[1] && windows.inside_window(1, x) {
        Window::Inside1
    } else if registers.obj_window_enabled && obj.window {
        Window::InsideObj
    } else {
        Window::Outside
    }
}

fn apply_color_effects(
    registers: &Registers,
    first: MergePixel,
    second: MergePixel,
    is_semi_transparent_obj: bool,
    coefficients: BlendCoefficients,
) -> Pixel {
    let BlendCoefficients { eva, evb, evy } = coefficients;

    // Semi-transparent OBJs alpha blend with any 2nd target regardless of BLDCNT mode and 1st
    // target selection
    if is_semi_transparent_obj && second.layer.is_2nd_target_enabled(registers) {
        return alpha_blend(first.color, second.color, eva, evb);
    }

    if !first.layer.is_1st_target_enabled(registers) {
        return first.color;
    }

    match registers.blend_mode {
        BlendMode::AlphaBlending => {
            if second.layer.is_2nd_target_enabled(registers) {
                alpha_blend(first.color, second.color, eva, evb)
            } else {
                first.color
            }
        }
        BlendMode::BrightnessIncrease => adjust_brightness::<true>(first.color, evy),
        BlendMode::BrightnessDecrease => adjust_brightness::<false>(first.color, evy),
        BlendMode::None => first.color,
    }
}

fn alpha_blend(first: Pixel, second: Pixel, eva: u16, evb: u16) -> Pixel {
    let alpha_blend_component =
        |first: u16, second: u16| cmp::min(31, (eva * first + evb * second) >> 4);

    let r = alpha_blend_component(first.red(), second.red());
    let g = alpha_blend_component(first.green(), second.green());
    let b = alpha_blend_component(first.blue(), second.blue());

    Pixel::new_opaque_rgb(r, g, b)
}

fn adjust_brightness<const INCREASE: bool>(color: Pixel, evy: u16) -> Pixel {
    let adjust_component = |component: u16| {
        if INCREASE {
            component + ((evy * (31 - component)) >> 4)
        } else {
            component - ((evy * component) >> 4)
        }
    };

    let r = adjust_component(color.red());
    let g = adjust_component(color.green());
    let b = adjust_component(color.blue());

    Pixel::new_opaque_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u16, g: u16, b: u16) -> Pixel {
        Pixel::new_opaque_rgb(r, g, b)
    }

    #[test]
    fn alpha_blend_clamps_to_31() {
        let white = rgb(31, 31, 31);
        assert_eq!(alpha_blend(white, white, 16, 16), white);
        assert_eq!(alpha_blend(rgb(20, 0, 10), rgb(10, 31, 10), 8, 8), rgb(15, 15, 10));
        assert_eq!(alpha_blend(rgb(31, 31, 31), rgb(0, 0, 0), 0, 16), rgb(0, 0, 0));
    }

    #[test]
    fn brightness_adjustment() {
        assert_eq!(adjust_brightness::<true>(rgb(0, 15, 31), 16), rgb(31, 31, 31));
        assert_eq!(adjust_brightness::<true>(rgb(0, 15, 31), 8), rgb(15, 23, 31));
        assert_eq!(adjust_brightness::<false>(rgb(0, 15, 31), 16), rgb(0, 0, 0));
        assert_eq!(adjust_brightness::<false>(rgb(0, 15, 31), 8), rgb(0, 8, 16));
    }

    #[test]
    fn coefficients_saturate_at_16() {
        let mut registers = Registers::new();
        registers.write_bldalpha(0x1F1F);
        registers.write_bldy(0x1F);

        let coefficients = BlendCoefficients::new(&registers);
        assert_eq!((coefficients.eva, coefficients.evb, coefficients.evy), (16, 16, 16));
    }

    #[test]
    fn semi_transparent_obj_ignores_blend_mode() {
        let mut registers = Registers::new();
        // No 1st targets, brightness decrease; BG0 is a 2nd target
        registers.write_bldcnt(0x01C0);
        registers.write_bldalpha(0x0808);

        let obj = MergePixel { color: rgb(31, 0, 0), layer: Layer::Obj, priority: 0 };
        let bg0 = MergePixel { color: rgb(0, 0, 31), layer: Layer::Bg0, priority: 1 };
        let coefficients = BlendCoefficients::new(&registers);

        assert_eq!(apply_color_effects(&registers, obj, bg0, true, coefficients), rgb(15, 0, 15));
        assert_eq!(apply_color_effects(&registers, obj, bg0, false, coefficients), obj.color);
    }

    #[test]
    fn brightness_needs_only_1st_target() {
        let mut registers = Registers::new();
        // BG1 1st target, brightness increase
        registers.write_bldcnt(0x0082);
        registers.write_bldy(16);

        let bg1 = MergePixel { color: rgb(0, 0, 0), layer: Layer::Bg1, priority: 0 };
        let backdrop = MergePixel { color: rgb(0, 0, 0), layer: Layer::Backdrop, priority: 4 };
        let coefficients = BlendCoefficients::new(&registers);

        assert_eq!(
            apply_color_effects(&registers, bg1, backdrop, false, coefficients),
            rgb(31, 31, 31)
        );
        assert_eq!(
            apply_color_effects(&registers, backdrop, bg1, false, coefficients),
            backdrop.color
        );
    }
}
