//! GBA PPU (picture processing unit)

mod background;
mod colors;
mod compose;
pub mod memory;
mod registers;


use crate::api::{GbaVideoConfig, PpuError, VideoBus};
use crate::dma::DmaOccasion;
use crate::interrupts::{InterruptLine, InterruptType};
use crate::objects::{ObjLineParams, ObjectLayer, WindowBounds, WindowMasks};
use crate::ppu::background::BgRenderer;
use crate::ppu::memory::{VideoMemory, Width};
use crate::ppu::registers::{BgMode, ObjVramMapDimensions, ReferencePoint, Registers};
use crate::scheduler::{PpuEvent, Scheduler};
use bincode::{Decode, Encode};
use gba_video_common::frontend::{Color, FrameSize, Renderer};
use gba_video_common::num::{GetBit, U16Ext};
use gba_video_config::FrameBuffering;
use std::array;

pub const SCREEN_HEIGHT: u32 = 160;
pub const SCREEN_WIDTH: u32 = 240;
pub const FRAME_BUFFER_LEN: usize = (SCREEN_HEIGHT as usize) * (SCREEN_WIDTH as usize);
pub const FRAME_SIZE: FrameSize = FrameSize { width: SCREEN_WIDTH, height: SCREEN_HEIGHT };

pub const LINES_PER_FRAME: u32 = 228;
pub const DOTS_PER_LINE: u64 = 1232;

const HDRAW_DOTS: u64 = 1008;
const HBLANK_DOTS: u64 = DOTS_PER_LINE - HDRAW_DOTS;

// BG fetches for a visible line end here, 2 dots before the HBlank flag goes up
const LINE_FETCH_DOTS: u64 = 1006;

const HBLANK_IRQ_DELAY: u64 = 2;

// VBlank flag is not set on the last line of the frame because of sprite processing for line 0
const LAST_LINE: u32 = LINES_PER_FRAME - 1;

// Video capture DMA runs on lines 2-161
const VIDEO_DMA_FIRST_LINE: u32 = 2;
const VIDEO_DMA_STOP_LINE: u32 = 162;

// BG enables are still latched during the last few lines of VBlank so that line 0 sees them
const VBLANK_ENABLE_LATCH_LINE: u32 = 225;

const RESET_LINE: u32 = 225;

#[derive(Debug, Clone, Encode, Decode)]
struct FrameBuffer(Box<[Color]>);

impl FrameBuffer {
    fn new() -> Self {
        Self(vec![Color::default(); FRAME_BUFFER_LEN].into_boxed_slice())
    }

    fn set(&mut self, line: u32, pixel: u32, color: Color) {
        let frame_buffer_addr = (line * SCREEN_WIDTH + pixel) as usize;
        self.0[frame_buffer_addr] = color;
    }

    fn fill_line(&mut self, line: u32, color: Color) {
        let start = (line * SCREEN_WIDTH) as usize;
        self.0[start..start + SCREEN_WIDTH as usize].fill(color);
    }
}

/// A 15-bit BGR555 color with an opaque flag in bit 15.
///
/// [`Pixel::TRANSPARENT`] is distinct from every opaque color, including black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct Pixel(u16);

impl Pixel {
    pub const TRANSPARENT: Self = Self(0);

    #[must_use]
    pub fn new_opaque(color: u16) -> Self {
        Self(color | 0x8000)
    }

    fn new_opaque_rgb(r: u16, g: u16, b: u16) -> Self {
        Self(0x8000 | r | (g << 5) | (b << 10))
    }

    #[must_use]
    pub fn is_transparent(self) -> bool {
        !self.0.bit(15)
    }

    /// The BGR555 color, without the opaque flag.
    #[must_use]
    pub fn color(self) -> u16 {
        self.0 & 0x7FFF
    }

    fn red(self) -> u16 {
        self.0 & 0x1F
    }

    fn green(self) -> u16 {
        (self.0 >> 5) & 0x1F
    }

    fn blue(self) -> u16 {
        (self.0 >> 10) & 0x1F
    }
}

// Running BG2/BG3 reference points; stepped by PB/PD once per visible line
#[derive(Debug, Clone, Copy, Default, Encode, Decode)]
struct BgAffineLatch {
    x: [i32; 2],
    y: [i32; 2],
}

impl BgAffineLatch {
    // Called once per frame at the start of VBlank
    fn reload_reference_points(&mut self, registers: &Registers) {
        self.x = registers.bg_affine_parameters.map(|params| params.reference_x);
        self.y = registers.bg_affine_parameters.map(|params| params.reference_y);
    }

    fn write_reference_point(&mut self, reference: ReferencePoint) {
        match reference {
            ReferencePoint::X(i, value) => self.x[i] = value,
            ReferencePoint::Y(i, value) => self.y[i] = value,
        }
    }

    // Called during HBlank of each visible line
    fn increment_reference_latches(
        &mut self,
        registers: &Registers,
        bg_enabled: [bool; 4],
        mosaic_counter: u8,
    ) {
        for i in 0..2 {
            let bg = i + 2;
            if !bg_enabled[bg] {
                continue;
            }

            let params = &registers.bg_affine_parameters[i];
            if !registers.bg_control[bg].mosaic {
                self.x[i] += params.b;
                self.y[i] += params.d;
            } else if mosaic_counter == 0 {
                // Mosaic holds the reference point for a whole mosaic block
                let height = i32::from(registers.bg_mosaic_height());
                self.x[i] += height * params.b;
                self.y[i] += height * params.d;
            }
        }
    }
}

// Two-phase latch on the DISPCNT BG enable bits
#[derive(Debug, Clone, Copy, Default, Encode, Decode)]
struct BgEnableLatch {
    current: [bool; 4],
    pending: [bool; 4],
}

impl BgEnableLatch {
    fn advance(&mut self, live: [bool; 4]) {
        self.current = self.pending;
        self.pending = live;
    }
}

#[derive(Debug, Clone, Copy, Default, Encode, Decode)]
struct MosaicCounters {
    bg_y: u8,
    obj_y: u8,
}

impl MosaicCounters {
    fn advance(&mut self, registers: &Registers) {
        fn next(counter: u8, size: u8) -> u8 {
            let counter = counter + 1;
            if counter >= size { 0 } else { counter }
        }

        self.bg_y = next(self.bg_y, registers.bg_mosaic_height());
        self.obj_y = next(self.obj_y, registers.obj_mosaic_v_size + 1);
    }
}

#[derive(Debug, Clone, Encode, Decode)]
struct State {
    vcount: u32,
    vblank: bool,
    hblank: bool,
    v_counter_match: bool,
    frame_complete: bool,
    bg_enable: BgEnableLatch,
    mosaic: MosaicCounters,
    bg_affine_latch: BgAffineLatch,
}

impl State {
    fn new() -> Self {
        Self {
            vcount: RESET_LINE,
            vblank: true,
            hblank: true,
            v_counter_match: false,
            frame_complete: false,
            bg_enable: BgEnableLatch::default(),
            mosaic: MosaicCounters::default(),
            bg_affine_latch: BgAffineLatch::default(),
        }
    }
}

#[derive(Debug, Clone, Encode, Decode)]
struct Buffers {
    bg_pixels: [[Pixel; SCREEN_WIDTH as usize]; 4],
}

impl Buffers {
    fn new() -> Self {
        Self { bg_pixels: array::from_fn(|_| [Pixel::TRANSPARENT; SCREEN_WIDTH as usize]) }
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Ppu {
    frame_buffers: [FrameBuffer; 2],
    draw_buffer: usize,
    memory: VideoMemory,
    registers: Registers,
    state: State,
    bg_renderer: BgRenderer,
    buffers: Box<Buffers>,
    scheduler: Scheduler,
    cycles: u64,
    config: GbaVideoConfig,
}

impl Ppu {
    #[must_use]
    pub fn new(config: GbaVideoConfig) -> Self {
        Self::new_at(0, config)
    }

    fn new_at(cycles: u64, config: GbaVideoConfig) -> Self {
        let mut scheduler = Scheduler::new();

        // Power on in the HBlank of line 225
        scheduler.insert_or_update(PpuEvent::VBlankHBlankEnd, cycles + HBLANK_DOTS);

        Self {
            frame_buffers: array::from_fn(|_| FrameBuffer::new()),
            draw_buffer: 0,
            memory: VideoMemory::new(),
            registers: Registers::new(),
            state: State::new(),
            bg_renderer: BgRenderer::new(),
            buffers: Box::new(Buffers::new()),
            scheduler,
            cycles,
            config,
        }
    }

    /// Return every register and memory bank to its power-on state. The cycle counter keeps
    /// running from its current value.
    pub fn reset(&mut self) {
        log::debug!("Resetting PPU at cycles {}", self.cycles);

        *self = Self::new_at(self.cycles, self.config);
    }

    pub fn reload_config(&mut self, config: GbaVideoConfig) {
        self.config = config;

        self.draw_buffer %= config.frame_buffering.buffer_count();
    }

    /// Run the PPU up to `cycles`, firing every timing event that is due.
    ///
    /// Callers should step the PPU to the current cycle before any register or memory access so
    /// that mid-line writes land at the right pixel.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by the renderer when a frame is presented. The PPU has fully
    /// processed the event that presented the frame and stepping can resume afterwards.
    pub fn step_to<B: VideoBus>(
        &mut self,
        cycles: u64,
        bus: &mut B,
    ) -> Result<(), PpuError<B::Err>> {
        if cycles < self.cycles {
            log::trace!("Ignoring PPU step backwards from {} to {cycles}", self.cycles);
            return Ok(());
        }
        self.cycles = cycles;

        while let Some((event, event_cycles)) = self.scheduler.pop(cycles) {
            self.handle_event(event, cycles - event_cycles, bus)?;
        }

        self.sync_bg(cycles);

        Ok(())
    }

    // Schedule `event` `delay` cycles after the current event's nominal time
    fn schedule(&mut self, event: PpuEvent, delay: u64, cycles_late: u64) {
        let cycles = (self.cycles + delay).saturating_sub(cycles_late);
        self.scheduler.insert_or_update(event, cycles);
    }

    fn handle_event<B: VideoBus>(
        &mut self,
        event: PpuEvent,
        cycles_late: u64,
        bus: &mut B,
    ) -> Result<(), PpuError<B::Err>> {
        match event {
            PpuEvent::LineFetchEnd => self.line_fetch_end(cycles_late, bus),
            PpuEvent::HDrawEnd => self.hdraw_end(cycles_late, bus),
            PpuEvent::HBlankEnd => return self.hblank_end(cycles_late, bus),
            PpuEvent::VBlankHDrawEnd => self.vblank_hdraw_end(cycles_late, bus),
            PpuEvent::VBlankHBlankEnd => self.vblank_hblank_end(cycles_late, bus),
            PpuEvent::HBlankIrq => {
                if self.registers.hblank_irq_enabled {
                    bus.raise_interrupt(InterruptType::HBlank);
                }
            }
            PpuEvent::Dummy => {}
        }

        Ok(())
    }

    fn line_fetch_end<B: VideoBus>(&mut self, cycles_late: u64, bus: &mut B) {
        self.sync_bg(self.cycles - cycles_late);
        self.bg_renderer.finish();

        self.render_current_line(bus);

        bus.request_dma(DmaOccasion::HBlank);
    }

    fn hdraw_end<B: VideoBus>(&mut self, cycles_late: u64, bus: &mut B) {
        self.state.hblank = true;
        self.schedule(PpuEvent::HBlankIrq, HBLANK_IRQ_DELAY, cycles_late);

        if self.state.vcount >= VIDEO_DMA_FIRST_LINE {
            bus.request_dma(DmaOccasion::Video);
        }

        self.state.mosaic.advance(&self.registers);

        if self.registers.bg_mode != BgMode::Zero {
            self.state.bg_affine_latch.increment_reference_latches(
                &self.registers,
                self.state.bg_enable.current,
                self.state.mosaic.bg_y,
            );
        }

        self.state.bg_enable.advance(self.registers.bg_enabled);

        self.schedule(PpuEvent::HBlankEnd, HBLANK_DOTS, cycles_late);
    }

    fn hblank_end<B: VideoBus>(
        &mut self,
        cycles_late: u64,
        bus: &mut B,
    ) -> Result<(), PpuError<B::Err>> {
        self.state.hblank = false;
        self.state.vcount += 1;
        self.check_v_counter(bus);
        self.render_window_lines(bus);

        if self.state.vcount != SCREEN_HEIGHT {
            self.start_visible_line(cycles_late, bus);
            return Ok(());
        }

        self.schedule(PpuEvent::VBlankHDrawEnd, HDRAW_DOTS, cycles_late);

        bus.request_dma(DmaOccasion::VBlank);

        self.state.vblank = true;
        if self.registers.vblank_irq_enabled {
            bus.raise_interrupt(InterruptType::VBlank);
        }

        self.state.mosaic = MosaicCounters::default();
        self.state.bg_affine_latch.reload_reference_points(&self.registers);

        self.present_frame(bus)
    }

    fn vblank_hdraw_end<B: VideoBus>(&mut self, cycles_late: u64, bus: &mut B) {
        self.state.hblank = true;

        if self.state.vcount < VIDEO_DMA_STOP_LINE {
            bus.request_dma(DmaOccasion::Video);
        } else if self.state.vcount == VIDEO_DMA_STOP_LINE {
            bus.stop_video_dma();
        }

        self.schedule(PpuEvent::HBlankIrq, HBLANK_IRQ_DELAY, cycles_late);

        if self.state.vcount >= VBLANK_ENABLE_LATCH_LINE {
            self.state.bg_enable.advance(self.registers.bg_enabled);
        }

        self.schedule(PpuEvent::VBlankHBlankEnd, HBLANK_DOTS, cycles_late);
    }

    fn vblank_hblank_end<B: VideoBus>(&mut self, cycles_late: u64, bus: &mut B) {
        self.state.hblank = false;

        if self.state.vcount == LAST_LINE {
            self.state.vcount = 0;
            self.render_window_lines(bus);
            self.start_visible_line(cycles_late, bus);
        } else {
            self.state.vcount += 1;
            if self.state.vcount == LAST_LINE {
                self.state.vblank = false;
                self.render_obj_line(0, bus);
            }

            self.schedule(PpuEvent::VBlankHDrawEnd, HDRAW_DOTS, cycles_late);
            self.render_window_lines(bus);
        }

        self.check_v_counter(bus);
    }

    fn start_visible_line<B: VideoBus>(&mut self, cycles_late: u64, bus: &mut B) {
        self.schedule(PpuEvent::LineFetchEnd, LINE_FETCH_DOTS, cycles_late);
        self.schedule(PpuEvent::HDrawEnd, HDRAW_DOTS, cycles_late);

        self.begin_bg_render(self.cycles - cycles_late);

        let next_line = self.state.vcount + 1;
        if next_line < SCREEN_HEIGHT {
            self.render_obj_line(next_line, bus);
        }
    }

    fn present_frame<R: Renderer>(&mut self, renderer: &mut R) -> Result<(), PpuError<R::Err>> {
        self.state.frame_complete = true;

        let presented = self.draw_buffer;
        self.draw_buffer = (self.draw_buffer + 1) % self.config.frame_buffering.buffer_count();

        log::trace!("Presenting frame buffer {presented} at cycles {}", self.cycles);

        renderer
            .render_frame(&self.frame_buffers[presented].0, FRAME_SIZE)
            .map_err(PpuError::Render)
    }

    fn check_v_counter<I: InterruptLine>(&mut self, interrupts: &mut I) {
        let v_counter_match = self.state.vcount == u32::from(self.registers.v_counter_target);
        if v_counter_match && !self.state.v_counter_match && self.registers.v_counter_irq_enabled
        {
            interrupts.raise_interrupt(InterruptType::VCounter);
        }
        self.state.v_counter_match = v_counter_match;
    }

    fn render_window_lines<W: WindowMasks>(&self, windows: &mut W) {
        for window in 0..2 {
            if !self.registers.window_enabled[window] {
                continue;
            }

            let bounds = WindowBounds {
                x1: self.registers.window_x1[window],
                x2: self.registers.window_x2[window],
                y1: self.registers.window_y1[window],
                y2: self.registers.window_y2[window],
            };
            windows.render_window_line(window, self.state.vcount, bounds);
        }
    }

    fn render_obj_line<O: ObjectLayer>(&self, line: u32, objects: &mut O) {
        if !self.registers.obj_enabled {
            return;
        }

        let params = ObjLineParams {
            line,
            bitmap_mode: self.registers.bg_mode.is_bitmap(),
            one_dimensional_mapping: self.registers.obj_vram_map_dimensions
                == ObjVramMapDimensions::One,
            oam_free_during_hblank: self.registers.oam_free_during_hblank,
            mosaic_width: self.registers.obj_mosaic_h_size + 1,
            mosaic_height: self.registers.obj_mosaic_v_size + 1,
            mosaic_counter: self.state.mosaic.obj_y,
        };
        objects.render_obj_line(&self.memory, &params);
    }

    fn render_current_line<B: ObjectLayer + WindowMasks>(&mut self, bus: &B) {
        if self.registers.forced_blanking {
            let white = colors::table(self.config.color_conversion)[0x7FFF];
            self.frame_buffers[self.draw_buffer].fill_line(self.state.vcount, white);
            return;
        }

        self.apply_bg_mosaic();
        self.compose_line(bus);
    }

    #[must_use]
    pub fn frame_complete(&self) -> bool {
        self.state.frame_complete
    }

    pub fn clear_frame_complete(&mut self) {
        self.state.frame_complete = false;
    }

    /// The most recently completed frame (with single buffering, the frame being drawn).
    #[must_use]
    pub fn frame_buffer(&self) -> &[Color] {
        let index = match self.config.frame_buffering {
            FrameBuffering::Single => 0,
            FrameBuffering::Double => self.draw_buffer ^ 1,
        };
        &self.frame_buffers[index].0
    }

    #[must_use]
    pub fn vcount(&self) -> u32 {
        self.state.vcount
    }

    #[must_use]
    pub fn in_vblank(&self) -> bool {
        self.state.vblank
    }

    #[must_use]
    pub fn in_hblank(&self) -> bool {
        self.state.hblank
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Cycle count of the next internal PPU event; stepping to any earlier time is a no-op
    #[must_use]
    pub fn next_event_cycles(&self) -> u64 {
        self.scheduler.next_event_cycles()
    }

    #[must_use]
    pub fn memory(&self) -> &VideoMemory {
        &self.memory
    }

    fn in_active_display(&self) -> bool {
        !(self.state.vblank || self.state.hblank || self.registers.forced_blanking)
    }

    #[must_use]
    pub fn read_vram<T: Width>(&self, address: u32) -> T {
        self.memory.read_vram(address)
    }

    pub fn write_vram<T: Width>(&mut self, address: u32, value: T) {
        self.memory.write_vram(address, value);

        if self.in_active_display() {
            log::debug!(
                "VRAM write to {address:08X} during active rendering (line {} cycles {})",
                self.state.vcount,
                self.cycles
            );
        }
    }

    #[must_use]
    pub fn read_palette_ram<T: Width>(&self, address: u32) -> T {
        self.memory.read_palette_ram(address)
    }

    pub fn write_palette_ram<T: Width>(&mut self, address: u32, value: T) {
        self.memory.write_palette_ram(address, value);

        if self.in_active_display() {
            log::debug!(
                "Palette RAM write to {address:08X} during active rendering (line {} cycles {})",
                self.state.vcount,
                self.cycles
            );
        }
    }

    #[must_use]
    pub fn read_oam<T: Width>(&self, address: u32) -> T {
        self.memory.read_oam(address)
    }

    pub fn write_oam<T: Width>(&mut self, address: u32, value: T) {
        self.memory.write_oam(address, value);

        let oam_free = self.state.vblank
            || self.registers.forced_blanking
            || (self.registers.oam_free_during_hblank && self.state.hblank);
        if !oam_free {
            log::debug!(
                "OAM write to {address:08X} during active rendering (line {} cycles {})",
                self.state.vcount,
                self.cycles
            );
        }
    }

    /// Read a PPU register halfword. Returns `None` for write-only and unmapped registers so
    /// that the bus can supply open bus.
    #[must_use]
    pub fn read_register(&self, address: u32) -> Option<u16> {
        log::trace!("PPU register read {address:08X}");

        let address = address & !1;
        let value = match address {
            0x4000000 => self.registers.read_dispcnt(),
            0x4000004 => self.read_dispstat(),
            0x4000006 => self.state.vcount as u16,
            0x4000008..=0x400000E => {
                let bg = (address & 7) >> 1;
                self.registers.read_bgcnt(bg as usize)
            }
            0x4000048 => self.registers.read_winin(),
            0x400004A => self.registers.read_winout(),
            0x4000050 => self.registers.read_bldcnt(),
            0x4000052 => self.registers.read_bldalpha(),
            0x4000010..=0x4000046 | 0x400004C | 0x4000054 => return None,
            _ => {
                log::warn!("Unhandled PPU register read {address:08X}");
                return None;
            }
        };

        Some(value)
    }

    // $4000004: DISPSTAT (Display status)
    fn read_dispstat(&self) -> u16 {
        u16::from(self.state.vblank)
            | (u16::from(self.state.hblank) << 1)
            | (u16::from(self.state.v_counter_match) << 2)
            | self.registers.read_dispstat_control()
    }

    // Current halfword value of any register, including write-only ones
    fn register_halfword(&self, address: u32) -> u16 {
        match address {
            0x4000010..=0x400001E => {
                let bg = ((address & 0xF) >> 2) as usize;
                let scroll = if address.bit(1) {
                    self.registers.bg_v_scroll[bg]
                } else {
                    self.registers.bg_h_scroll[bg]
                };
                scroll as u16
            }
            0x4000020..=0x400003E => self.registers.bg_affine_register_halfword(address),
            0x4000040 | 0x4000042 => self.registers.read_winh(((address >> 1) & 1) as usize),
            0x4000044 | 0x4000046 => self.registers.read_winv(((address >> 1) & 1) as usize),
            0x400004C => self.registers.read_mosaic(),
            0x4000054 => self.registers.blend_brightness.into(),
            _ => self.read_register(address).unwrap_or(0),
        }
    }

    pub fn write_register<I: InterruptLine>(
        &mut self,
        address: u32,
        value: u16,
        interrupts: &mut I,
    ) {
        log::debug!(
            "PPU register write {address:08X} {value:04X} (line {} cycles {})",
            self.state.vcount,
            self.cycles
        );

        let address = address & !1;
        match address {
            0x4000000 => {
                self.registers.write_dispcnt(value);
                self.memory.set_bitmap_mode(self.registers.bg_mode.is_bitmap());
            }
            0x4000004 => {
                self.registers.write_dispstat(value);
                self.check_v_counter(interrupts);
            }
            0x4000006 => {
                log::trace!("Ignoring VCOUNT write {value:04X}");
            }
            0x4000008..=0x400000E => {
                // BGxCNT
                let bg = (address & 7) >> 1;
                self.registers.write_bgcnt(bg as usize, value);
            }
            0x4000010..=0x400001E => {
                // BGxHOFS / BGxVOFS
                let bg = (address & 0xF) >> 2;
                if !address.bit(1) {
                    self.registers.write_bghofs(bg as usize, value);
                } else {
                    self.registers.write_bgvofs(bg as usize, value);
                }
            }
            0x4000020..=0x400003E => {
                if let Some(reference) = self.registers.write_bg_affine_register(address, value) {
                    self.state.bg_affine_latch.write_reference_point(reference);
                }
            }
            0x4000040 => self.registers.write_winh(0, value),
            0x4000042 => self.registers.write_winh(1, value),
            0x4000044 => self.registers.write_winv(0, value),
            0x4000046 => self.registers.write_winv(1, value),
            0x4000048 => self.registers.write_winin(value),
            0x400004A => self.registers.write_winout(value),
            0x400004C => self.registers.write_mosaic(value),
            0x4000050 => self.registers.write_bldcnt(value),
            0x4000052 => self.registers.write_bldalpha(value),
            0x4000054 => self.registers.write_bldy(value),
            _ => {
                log::warn!("Unhandled PPU register write {address:08X} {value:04X}");
            }
        }
    }

    pub fn write_register_byte<I: InterruptLine>(
        &mut self,
        address: u32,
        value: u8,
        interrupts: &mut I,
    ) {
        let halfword_addr = address & !1;

        let mut halfword = self.register_halfword(halfword_addr);
        if address.bit(0) {
            halfword.set_msb(value);
        } else {
            halfword.set_lsb(value);
        }

        self.write_register(halfword_addr, halfword, interrupts);
    }

    pub fn write_register_word<I: InterruptLine>(
        &mut self,
        address: u32,
        value: u32,
        interrupts: &mut I,
    ) {
        let address = address & !3;
        self.write_register(address, value as u16, interrupts);
        self.write_register(address | 2, (value >> 16) as u16, interrupts);
    }
}
