//! Cycle-by-cycle BG fetching
//!
//! Each visible line has a fixed fetch schedule that repeats every 32 cycles. Text BGs spend 8
//! cycles per tile (map fetch on cycle 0, pixel data on cycles 1-4); affine BGs alternate between
//! a map/tile lookup and emitting a pixel; bitmap modes emit one pixel per cycle during the first
//! half of each 32-cycle slot.

use crate::ppu::memory::VideoMemory;
use crate::ppu::registers::{AffineOverflowBehavior, BgMode, BitsPerPixel, Registers};
use crate::ppu::{LINE_FETCH_DOTS, Pixel, Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};
use bincode::{Decode, Encode};

const MODE_5_WIDTH: i32 = 160;
const MODE_5_HEIGHT: i32 = 128;

// Enough tiles to cover 240 pixels at any fine horizontal scroll
const TEXT_TILES_PER_LINE: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextStep {
    FetchMap,
    FetchPixels,
    Idle,
}

impl TextStep {
    fn for_cycle(cycle: u32, bpp: BitsPerPixel) -> Self {
        match (cycle, bpp) {
            (0, _) => Self::FetchMap,
            (1 | 3, BitsPerPixel::Four) | (1..=4, BitsPerPixel::Eight) => Self::FetchPixels,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AffineStep {
    FetchMap,
    EmitPixel,
}

impl AffineStep {
    fn for_cycle(cycle: u32) -> Self {
        if cycle & 1 == 0 { Self::FetchMap } else { Self::EmitPixel }
    }
}

#[derive(Debug, Clone, Copy, Default, Encode, Decode)]
pub(super) struct BgLineState {
    pub(super) engaged: bool,
    // DISPCNT enable bit, latched at each map fetch
    pub(super) enabled: bool,
    pub(super) grid_x: u32,
    pub(super) draw_x: i32,
    pub(super) address: u32,
    pub(super) palette: u16,
    pub(super) flip_x: bool,
    pub(super) bpp: BitsPerPixel,
    pub(super) out_of_range: bool,
    pub(super) ref_x: i32,
    pub(super) ref_y: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub(super) struct BgRenderer {
    active: bool,
    time: u32,
    line_start: u64,
    pub(super) bgs: [BgLineState; 4],
}

impl BgRenderer {
    pub(super) fn new() -> Self {
        Self { active: false, time: 0, line_start: 0, bgs: [BgLineState::default(); 4] }
    }

    pub(super) fn finish(&mut self) {
        self.active = false;
    }
}

fn on_line(x: i32) -> bool {
    (0..SCREEN_WIDTH as i32).contains(&x)
}

fn is_text_bg(mode: BgMode, bg: usize) -> bool {
    match mode {
        BgMode::Zero => true,
        BgMode::One => bg < 2,
        _ => false,
    }
}

impl Ppu {
    pub(super) fn begin_bg_render(&mut self, line_start: u64) {
        let mode = self.registers.bg_mode;
        let renderer = &mut self.bg_renderer;
        renderer.active = true;
        renderer.time = 0;
        renderer.line_start = line_start;

        for (bg, state) in renderer.bgs.iter_mut().enumerate() {
            let draw_x = if is_text_bg(mode, bg) {
                -((self.registers.bg_h_scroll[bg] & 7) as i32)
            } else {
                0
            };
            *state = BgLineState { engaged: true, draw_x, ..BgLineState::default() };
        }

        let latch = &self.state.bg_affine_latch;
        for i in 0..2 {
            renderer.bgs[i + 2].ref_x = latch.x[i];
            renderer.bgs[i + 2].ref_y = latch.y[i];
        }

        for line_buffer in &mut self.buffers.bg_pixels {
            line_buffer.fill(Pixel::TRANSPARENT);
        }
    }

    /// Catch the BG fetcher up to `cycles`, clamped to the end of the line's fetch window.
    pub(super) fn sync_bg(&mut self, cycles: u64) {
        if !self.bg_renderer.active {
            return;
        }

        let target = cycles.saturating_sub(self.bg_renderer.line_start).min(LINE_FETCH_DOTS) as u32;
        while self.bg_renderer.time < target {
            self.render_bg_cycle();
            self.bg_renderer.time += 1;
        }
    }

    fn render_bg_cycle(&mut self) {
        let time = self.bg_renderer.time;
        let slot = time & 31;

        match self.registers.bg_mode {
            BgMode::Zero => self.text_bg_cycle((slot >> 3) as usize, time & 7),
            BgMode::One => {
                if slot < 16 {
                    self.text_bg_cycle((slot >> 3) as usize, time & 7);
                } else {
                    self.affine_bg_cycle(2, time & 1);
                }
            }
            BgMode::Two => self.affine_bg_cycle(2 + ((time >> 4) & 1) as usize, time & 1),
            BgMode::Three | BgMode::Four | BgMode::Five => {
                if slot < 16 {
                    self.bitmap_bg_cycle();
                }
            }
            BgMode::Invalid(_) => {}
        }
    }

    fn text_bg_cycle(&mut self, bg: usize, cycle: u32) {
        let state = &self.bg_renderer.bgs[bg];
        if !state.engaged {
            return;
        }

        match TextStep::for_cycle(cycle, state.bpp) {
            TextStep::FetchMap => self.text_fetch_map(bg),
            TextStep::FetchPixels => self.text_fetch_pixels(bg),
            TextStep::Idle => {}
        }

        if cycle == 4 {
            let state = &mut self.bg_renderer.bgs[bg];
            state.grid_x += 1;
            if state.grid_x == TEXT_TILES_PER_LINE {
                state.engaged = false;
            }
        }
    }

    fn text_fetch_map(&mut self, bg: usize) {
        let control = self.registers.bg_control[bg];
        let state = &mut self.bg_renderer.bgs[bg];
        state.enabled = self.registers.bg_enabled[bg];
        state.bpp = control.bpp;

        let mut line = self.state.vcount;
        if control.mosaic {
            line = line.saturating_sub(self.state.mosaic.bg_y.into());
        }
        line += self.registers.bg_v_scroll[bg];

        let grid_x = (self.registers.bg_h_scroll[bg] >> 3) + state.grid_x;
        let grid_y = line >> 3;
        let mut tile_y = line & 7;

        let screen_block =
            control.size.text_screen_block_offset((grid_x >> 5) & 1, (grid_y >> 5) & 1);
        let map_addr = control.tile_map_addr
            + (screen_block << 11)
            + ((grid_y & 31) << 6)
            + ((grid_x & 31) << 1);
        let map_entry = self.memory.bg_vram_halfword(map_addr);

        let tile_number = u32::from(map_entry & 0x3FF);
        state.flip_x = map_entry & (1 << 10) != 0;
        if map_entry & (1 << 11) != 0 {
            tile_y ^= 7;
        }
        state.palette = map_entry >> 12;

        state.address = match control.bpp {
            BitsPerPixel::Four => {
                let flip_offset = if state.flip_x { 2 } else { 0 };
                control.tile_data_addr + (tile_number << 5) + (tile_y << 2) + flip_offset
            }
            BitsPerPixel::Eight => {
                let flip_offset = if state.flip_x { 6 } else { 0 };
                control.tile_data_addr + (tile_number << 6) + (tile_y << 3) + flip_offset
            }
        };
    }

    fn text_fetch_pixels(&mut self, bg: usize) {
        let state = &mut self.bg_renderer.bgs[bg];

        let tile_data = self.memory.bg_vram_halfword(state.address);
        state.address = if state.flip_x {
            state.address.wrapping_sub(2)
        } else {
            state.address.wrapping_add(2)
        };

        // Pixels per halfword, bits per pixel, and the X mirror applied within a halfword
        let (pixels, bits, mirror) = match state.bpp {
            BitsPerPixel::Four => (4, 4, 3),
            BitsPerPixel::Eight => (2, 8, 1),
        };
        let mirror = if state.flip_x { mirror } else { 0 };

        // The live enable bit can still hide pixels after the map fetch latched it
        if state.enabled && self.registers.bg_enabled[bg] {
            let line_buffer = &mut self.buffers.bg_pixels[bg];
            for x in 0..pixels {
                let final_x = state.draw_x + (x ^ mirror);
                if !on_line(final_x) {
                    continue;
                }

                let color_idx = u32::from(tile_data >> (x * bits)) & ((1 << bits) - 1);
                line_buffer[final_x as usize] = if color_idx == 0 {
                    Pixel::TRANSPARENT
                } else {
                    let palette_idx = match state.bpp {
                        BitsPerPixel::Four => (u32::from(state.palette) << 4) | color_idx,
                        BitsPerPixel::Eight => color_idx,
                    };
                    Pixel::new_opaque(self.memory.palette_color(palette_idx))
                };
            }
        }

        state.draw_x += pixels;
    }

    fn affine_bg_cycle(&mut self, bg: usize, cycle: u32) {
        if !self.bg_renderer.bgs[bg].engaged {
            return;
        }

        match AffineStep::for_cycle(cycle) {
            AffineStep::FetchMap => self.affine_fetch_map(bg),
            AffineStep::EmitPixel => self.affine_emit_pixel(bg),
        }
    }

    fn affine_fetch_map(&mut self, bg: usize) {
        let control = self.registers.bg_control[bg];
        let params = self.registers.bg_affine_parameters[bg - 2];
        let state = &mut self.bg_renderer.bgs[bg];
        state.enabled = self.registers.bg_enabled[bg];

        let mut x = state.ref_x >> 8;
        let mut y = state.ref_y >> 8;
        state.ref_x += params.a;
        state.ref_y += params.c;

        let size = control.size.affine_dimension_pixels();
        match control.affine_overflow {
            AffineOverflowBehavior::Wrap => {
                x &= size - 1;
                y &= size - 1;
            }
            AffineOverflowBehavior::Transparent => {
                if (x | y) & -size != 0 {
                    state.out_of_range = true;
                    return;
                }
            }
        }
        state.out_of_range = false;

        let (x, y) = (x as u32, y as u32);
        let map_addr =
            control.tile_map_addr + (y >> 3) * control.size.affine_dimension_tiles() + (x >> 3);
        let tile_number = u32::from(self.memory.bg_vram_byte(map_addr));

        state.address = control.tile_data_addr + (tile_number << 6) + ((y & 7) << 3) + (x & 7);
    }

    fn affine_emit_pixel(&mut self, bg: usize) {
        let state = &mut self.bg_renderer.bgs[bg];

        // A mid-line switch from text mode can leave draw_x outside the line
        let visible = on_line(state.draw_x);
        if visible && state.enabled && self.registers.bg_enabled[bg] && !state.out_of_range {
            let color_idx = self.memory.bg_vram_byte(state.address);
            if color_idx != 0 {
                let color = self.memory.palette_color(color_idx.into());
                self.buffers.bg_pixels[bg][state.draw_x as usize] = Pixel::new_opaque(color);
            }
        }

        state.draw_x += 1;
        if state.draw_x >= SCREEN_WIDTH as i32 {
            state.engaged = false;
        }
    }

    fn bitmap_bg_cycle(&mut self) {
        let params = self.registers.bg_affine_parameters[0];
        let state = &mut self.bg_renderer.bgs[2];
        if !state.engaged {
            return;
        }

        let x = state.ref_x >> 8;
        let y = state.ref_y >> 8;
        state.ref_x += params.a;
        state.ref_y += params.c;

        if on_line(state.draw_x) && self.registers.bg_enabled[2] {
            self.buffers.bg_pixels[2][state.draw_x as usize] =
                sample_bitmap(&self.memory, &self.registers, x, y);
        }

        state.draw_x += 1;
        if state.draw_x >= SCREEN_WIDTH as i32 {
            state.engaged = false;
        }
    }

    /// Horizontal BG mosaic: every pixel takes the color of the first pixel in its mosaic block.
    pub(super) fn apply_bg_mosaic(&mut self) {
        let width = usize::from(self.registers.bg_mosaic_width());
        if width == 1 {
            return;
        }

        for bg in self.registers.bg_mode.bg_range() {
            if !self.registers.bg_control[bg].mosaic {
                continue;
            }

            let line_buffer = &mut self.buffers.bg_pixels[bg];
            for x in 0..SCREEN_WIDTH as usize {
                line_buffer[x] = line_buffer[x - x % width];
            }
        }
    }
}

fn sample_bitmap(memory: &VideoMemory, registers: &Registers, x: i32, y: i32) -> Pixel {
    let in_bounds = |width: i32, height: i32| (0..width).contains(&x) && (0..height).contains(&y);

    match registers.bg_mode {
        BgMode::Three => {
            if !in_bounds(SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32) {
                return Pixel::TRANSPARENT;
            }

            let offset = 2 * (y as u32 * SCREEN_WIDTH + x as u32);
            Pixel::new_opaque(memory.bitmap_vram_halfword(offset))
        }
        BgMode::Four => {
            if !in_bounds(SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32) {
                return Pixel::TRANSPARENT;
            }

            let frame_buffer_addr = registers.bitmap_frame_buffer.vram_address();
            let color_idx =
                memory.bitmap_vram_byte(frame_buffer_addr + y as u32 * SCREEN_WIDTH + x as u32);
            if color_idx == 0 {
                Pixel::TRANSPARENT
            } else {
                Pixel::new_opaque(memory.palette_color(color_idx.into()))
            }
        }
        BgMode::Five => {
            if !in_bounds(MODE_5_WIDTH, MODE_5_HEIGHT) {
                return Pixel::TRANSPARENT;
            }

            let frame_buffer_addr = registers.bitmap_frame_buffer.vram_address();
            let offset = 2 * (y * MODE_5_WIDTH + x) as u32;
            Pixel::new_opaque(memory.bitmap_vram_halfword(frame_buffer_addr + offset))
        }
        BgMode::Zero | BgMode::One | BgMode::Two | BgMode::Invalid(_) => Pixel::TRANSPARENT,
    }
}
