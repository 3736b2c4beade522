use bincode::{Decode, Encode};
use gba_video_common::define_bit_enum;
use gba_video_common::num::{GetBit, SignExtend, U16Ext};
use std::array;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum BgMode {
    #[default]
    Zero, // 4 text mode BGs
    One,   // 2 text mode BGs + 1 affine BG
    Two,   // 2 affine BGs
    Three, // 15bpp bitmap, one frame buffer
    Four,  // 8bpp bitmap, two frame buffers
    Five,  // 15bpp bitmap, two frame buffers (reduced resolution)
    Invalid(u8),
}

impl BgMode {
    fn to_bits(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Invalid(bits) => bits,
        }
    }

    fn from_bits(bits: u16) -> Self {
        match bits & 7 {
            0 => Self::Zero,
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            4 => Self::Four,
            5 => Self::Five,
            b @ (6 | 7) => Self::Invalid(b as u8),
            _ => unreachable!("value & 7 is always <= 7"),
        }
    }

    /// BGs that the compositor considers in this mode.
    ///
    /// Modes 6 and 7 still consider BG2, but nothing is ever rendered into its line buffer.
    pub fn bg_range(self) -> RangeInclusive<usize> {
        match self {
            Self::Zero => 0..=3,
            Self::One => 0..=2,
            Self::Two => 2..=3,
            Self::Three | Self::Four | Self::Five | Self::Invalid(_) => 2..=2,
        }
    }

    pub fn is_bitmap(self) -> bool {
        matches!(self, Self::Three | Self::Four | Self::Five)
    }
}

define_bit_enum!(BitmapFrameBuffer, [Zero, One]);

impl BitmapFrameBuffer {
    pub fn vram_address(self) -> u32 {
        match self {
            Self::Zero => 0x00000,
            Self::One => 0x0A000,
        }
    }
}

define_bit_enum!(ObjVramMapDimensions, [Two, One]);
define_bit_enum!(BitsPerPixel, [Four, Eight]);
define_bit_enum!(AffineOverflowBehavior, [Transparent, Wrap]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum ScreenSize {
    #[default]
    Zero = 0, // 256x256 text / 128x128 affine
    One = 1,   // 512x256 text / 256x256 affine
    Two = 2,   // 256x512 text / 512x512 affine
    Three = 3, // 512x512 text / 1024x1024 affine
}

impl ScreenSize {
    fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => Self::Zero,
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            _ => unreachable!("value & 3 is always <= 3"),
        }
    }

    /// Offset in 2KB screen blocks of the 32x32 tile screen at (`screen_x`, `screen_y`).
    ///
    /// Screens that lie outside the map wrap back onto the first row/column.
    pub fn text_screen_block_offset(self, screen_x: u32, screen_y: u32) -> u32 {
        match self {
            Self::Zero => 0,
            Self::One => screen_x,
            Self::Two => screen_y,
            Self::Three => screen_x + 2 * screen_y,
        }
    }

    pub fn affine_dimension_pixels(self) -> i32 {
        128 << (self as u8)
    }

    pub fn affine_dimension_tiles(self) -> u32 {
        16 << (self as u8)
    }
}

#[derive(Debug, Clone, Copy, Default, Encode, Decode)]
pub struct BgControl {
    pub priority: u8,
    pub tile_data_addr: u32,
    pub mosaic: bool,
    pub bpp: BitsPerPixel,
    pub tile_map_addr: u32,
    pub affine_overflow: AffineOverflowBehavior,
    pub size: ScreenSize,
}

impl BgControl {
    fn read(&self) -> u16 {
        u16::from(self.priority)
            | (((self.tile_data_addr >> 14) as u16) << 2)
            | (u16::from(self.mosaic) << 6)
            | ((self.bpp as u16) << 7)
            | (((self.tile_map_addr >> 11) as u16) << 8)
            | ((self.affine_overflow as u16) << 13)
            | ((self.size as u16) << 14)
    }

    fn write(&mut self, value: u16) {
        self.priority = (value & 3) as u8;

        let tile_data_addr_16kb = (value >> 2) & 3;
        self.tile_data_addr = u32::from(tile_data_addr_16kb) << 14;

        self.mosaic = value.bit(6);
        self.bpp = BitsPerPixel::from_bit(value.bit(7));

        let tile_map_addr_2kb = (value >> 8) & 0x1F;
        self.tile_map_addr = u32::from(tile_map_addr_2kb) << 11;

        self.affine_overflow = AffineOverflowBehavior::from_bit(value.bit(13));
        self.size = ScreenSize::from_bits(value >> 14);
    }
}

/// BG2/BG3 rotation/scaling parameters.
///
/// `reference_x`/`reference_y` are the reload values written by software; the running values
/// that the renderer steps through are kept in the PPU's affine latch.
#[derive(Debug, Clone, Copy, Encode, Decode)]
pub struct BgAffineParameters {
    // BG2X / BG3X (signed 20.8 fixed point, 28 bits)
    pub reference_x: i32,
    // BG2Y / BG3Y
    pub reference_y: i32,
    // BG2PA / BG3PA (signed 8.8 fixed point)
    pub a: i32,
    // BG2PB / BG3PB
    pub b: i32,
    // BG2PC / BG3PC
    pub c: i32,
    // BG2PD / BG3PD
    pub d: i32,
}

impl Default for BgAffineParameters {
    fn default() -> Self {
        Self { reference_x: 0, reference_y: 0, a: 1 << 8, b: 0, c: 0, d: 1 << 8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum BlendMode {
    #[default]
    None = 0,
    AlphaBlending = 1,
    BrightnessIncrease = 2,
    BrightnessDecrease = 3,
}

impl BlendMode {
    fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => Self::None,
            1 => Self::AlphaBlending,
            2 => Self::BrightnessIncrease,
            3 => Self::BrightnessDecrease,
            _ => unreachable!("value & 3 is always <= 3"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Inside0,
    Inside1,
    InsideObj,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEnabled {
    pub bg: [bool; 4],
    pub obj: bool,
    pub blend: bool,
}

impl WindowEnabled {
    pub const ALL: Self = Self { bg: [true; 4], obj: true, blend: true };
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Registers {
    // DISPCNT (Display control)
    pub bg_mode: BgMode,
    pub bitmap_frame_buffer: BitmapFrameBuffer,
    pub oam_free_during_hblank: bool,
    pub obj_vram_map_dimensions: ObjVramMapDimensions,
    pub forced_blanking: bool,
    pub bg_enabled: [bool; 4],
    pub obj_enabled: bool,
    pub window_enabled: [bool; 2],
    pub obj_window_enabled: bool,
    // DISPSTAT (Display status); the status flags live in the PPU state
    pub vblank_irq_enabled: bool,
    pub hblank_irq_enabled: bool,
    pub v_counter_irq_enabled: bool,
    pub v_counter_target: u8,
    // BGxCNT (BG0-3 control)
    pub bg_control: [BgControl; 4],
    // BGxHOFS (BG0-3 horizontal offset)
    pub bg_h_scroll: [u32; 4],
    // BGxVOFS (BG0-3 vertical offset)
    pub bg_v_scroll: [u32; 4],
    // BG2/3 affine registers
    pub bg_affine_parameters: [BgAffineParameters; 2],
    // WINxH (Window horizontal coordinates)
    pub window_x1: [u8; 2],
    pub window_x2: [u8; 2],
    // WINxV (Window vertical coordinates)
    pub window_y1: [u8; 2],
    pub window_y2: [u8; 2],
    // WININ (Window inside control)
    pub window_in_bg_enabled: [[bool; 4]; 2],
    pub window_in_obj_enabled: [bool; 2],
    pub window_in_blend_enabled: [bool; 2],
    // WINOUT (Window outside control)
    pub window_out_bg_enabled: [bool; 4],
    pub window_out_obj_enabled: bool,
    pub window_out_blend_enabled: bool,
    pub obj_window_bg_enabled: [bool; 4],
    pub obj_window_obj_enabled: bool,
    pub obj_window_blend_enabled: bool,
    // MOSAIC (Mosaic size); raw register values, actual sizes are 1 higher
    pub bg_mosaic_h_size: u8,
    pub bg_mosaic_v_size: u8,
    pub obj_mosaic_h_size: u8,
    pub obj_mosaic_v_size: u8,
    // BLDCNT (Blending control)
    pub bg_blend_1st_target: [bool; 4],
    pub obj_blend_1st_target: bool,
    pub backdrop_blend_1st_target: bool,
    pub blend_mode: BlendMode,
    pub bg_blend_2nd_target: [bool; 4],
    pub obj_blend_2nd_target: bool,
    pub backdrop_blend_2nd_target: bool,
    // BLDALPHA (Alpha blending coefficients)
    pub blend_alpha_a: u8,
    pub blend_alpha_b: u8,
    // BLDY (Blending brightness coefficient)
    pub blend_brightness: u8,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            bg_mode: BgMode::default(),
            bitmap_frame_buffer: BitmapFrameBuffer::default(),
            oam_free_during_hblank: false,
            obj_vram_map_dimensions: ObjVramMapDimensions::default(),
            forced_blanking: true,
            bg_enabled: [false; 4],
            obj_enabled: false,
            window_enabled: [false; 2],
            obj_window_enabled: false,
            vblank_irq_enabled: false,
            hblank_irq_enabled: false,
            v_counter_irq_enabled: false,
            v_counter_target: 0,
            bg_control: [BgControl::default(); 4],
            bg_h_scroll: [0; 4],
            bg_v_scroll: [0; 4],
            bg_affine_parameters: array::from_fn(|_| BgAffineParameters::default()),
            window_x1: [0; 2],
            window_x2: [0; 2],
            window_y1: [0; 2],
            window_y2: [0; 2],
            window_in_bg_enabled: [[false; 4]; 2],
            window_in_obj_enabled: [false; 2],
            window_in_blend_enabled: [false; 2],
            window_out_bg_enabled: [false; 4],
            window_out_obj_enabled: false,
            window_out_blend_enabled: false,
            obj_window_bg_enabled: [false; 4],
            obj_window_obj_enabled: false,
            obj_window_blend_enabled: false,
            bg_mosaic_h_size: 0,
            bg_mosaic_v_size: 0,
            obj_mosaic_h_size: 0,
            obj_mosaic_v_size: 0,
            bg_blend_1st_target: [false; 4],
            obj_blend_1st_target: false,
            backdrop_blend_1st_target: false,
            blend_mode: BlendMode::default(),
            bg_blend_2nd_target: [false; 4],
            obj_blend_2nd_target: false,
            backdrop_blend_2nd_target: false,
            blend_alpha_a: 0,
            blend_alpha_b: 0,
            blend_brightness: 0,
        }
    }

    // $4000000: DISPCNT (Display control)
    pub fn write_dispcnt(&mut self, value: u16) {
        self.bg_mode = BgMode::from_bits(value);
        self.bitmap_frame_buffer = BitmapFrameBuffer::from_bit(value.bit(4));
        self.oam_free_during_hblank = value.bit(5);
        self.obj_vram_map_dimensions = ObjVramMapDimensions::from_bit(value.bit(6));
        self.forced_blanking = value.bit(7);
        self.bg_enabled = array::from_fn(|i| value.bit((8 + i) as u8));
        self.obj_enabled = value.bit(12);
        self.window_enabled = [value.bit(13), value.bit(14)];
        self.obj_window_enabled = value.bit(15);

        log::debug!("DISPCNT write: {value:04X}");
        log::debug!("  BG mode: {:?}", self.bg_mode);
        log::debug!("  Bitmap frame buffer: {:?}", self.bitmap_frame_buffer);
        log::debug!("  OAM accessible during HBlank: {}", self.oam_free_during_hblank);
        log::debug!("  OBJ VRAM map dimensions: {:?}", self.obj_vram_map_dimensions);
        log::debug!("  Forced blanking enabled: {}", self.forced_blanking);
        log::debug!("  BGs enabled: {:?}", self.bg_enabled);
        log::debug!("  OBJ enabled: {}", self.obj_enabled);
        log::debug!("  Windows enabled: {:?}", self.window_enabled);
        log::debug!("  OBJ window enabled: {}", self.obj_window_enabled);
    }

    // $4000000: DISPCNT (Display control)
    pub fn read_dispcnt(&self) -> u16 {
        u16::from(self.bg_mode.to_bits())
            | (u16::from(self.bitmap_frame_buffer.to_bit()) << 4)
            | (u16::from(self.oam_free_during_hblank) << 5)
            | (u16::from(self.obj_vram_map_dimensions.to_bit()) << 6)
            | (u16::from(self.forced_blanking) << 7)
            | (bool_array_to_bits(self.bg_enabled) << 8)
            | (u16::from(self.obj_enabled) << 12)
            | (u16::from(self.window_enabled[0]) << 13)
            | (u16::from(self.window_enabled[1]) << 14)
            | (u16::from(self.obj_window_enabled) << 15)
    }

    // $4000004: DISPSTAT (Display status)
    pub fn write_dispstat(&mut self, value: u16) {
        self.vblank_irq_enabled = value.bit(3);
        self.hblank_irq_enabled = value.bit(4);
        self.v_counter_irq_enabled = value.bit(5);
        self.v_counter_target = value.msb();

        log::debug!("DISPSTAT write: {value:04X}");
        log::debug!("  VBlank IRQs enabled: {}", self.vblank_irq_enabled);
        log::debug!("  HBlank IRQs enabled: {}", self.hblank_irq_enabled);
        log::debug!("  V counter IRQs enabled: {}", self.v_counter_irq_enabled);
        log::debug!("  V counter target: {}", self.v_counter_target);
    }

    // $4000004: DISPSTAT (Display status), writable bits only
    pub fn read_dispstat_control(&self) -> u16 {
        (u16::from(self.vblank_irq_enabled) << 3)
            | (u16::from(self.hblank_irq_enabled) << 4)
            | (u16::from(self.v_counter_irq_enabled) << 5)
            | (u16::from(self.v_counter_target) << 8)
    }

    // $4000008-$400000E: BG0CNT/BG1CNT/BG2CNT/BG3CNT (BG0-3 control)
    pub fn read_bgcnt(&self, index: usize) -> u16 {
        let value = self.bg_control[index].read();

        // Overflow behavior is only implemented for the affine-capable BGs
        if index < 2 { value & !(1 << 13) } else { value }
    }

    // $4000008-$400000E: BG0CNT/BG1CNT/BG2CNT/BG3CNT (BG0-3 control)
    pub fn write_bgcnt(&mut self, index: usize, value: u16) {
        self.bg_control[index].write(value);

        log::debug!("BG{index}CNT write: {value:04X}");
        log::debug!("  Priority: {}", self.bg_control[index].priority);
        log::debug!("  Tile data base address: {:05X}", self.bg_control[index].tile_data_addr);
        log::debug!("  Mosaic enabled: {}", self.bg_control[index].mosaic);
        log::debug!("  Bits per pixel: {:?}", self.bg_control[index].bpp);
        log::debug!("  Tile map base address: {:05X}", self.bg_control[index].tile_map_addr);
        log::debug!("  Affine overflow behavior: {:?}", self.bg_control[index].affine_overflow);
        log::debug!("  Screen size: {:?}", self.bg_control[index].size);
    }

    // $4000010/$4000014/$4000018/$400001C: BG0HOFS/BG1HOFS/BG2HOFS/BG3HOFS
    pub fn write_bghofs(&mut self, index: usize, value: u16) {
        self.bg_h_scroll[index] = (value & 0x1FF).into();

        log::debug!("BG{index}HOFS write: {value:04X}");
    }

    // $4000012/$4000016/$400001A/$400001E: BG0VOFS/BG1VOFS/BG2VOFS/BG3VOFS
    pub fn write_bgvofs(&mut self, index: usize, value: u16) {
        self.bg_v_scroll[index] = (value & 0x1FF).into();

        log::debug!("BG{index}VOFS write: {value:04X}");
    }

    /// $4000020-$400003E: BG2/3 affine parameter registers.
    ///
    /// Returns the new reference point when a BGxX/BGxY half was written so that the caller can
    /// reload the running position.
    pub fn write_bg_affine_register(&mut self, address: u32, value: u16) -> Option<ReferencePoint> {
        fn cast_parameter(parameter: u16) -> i32 {
            // Parameters are signed 16-bit; sign extend to 32-bit
            i32::from(parameter as i16)
        }

        fn write_low(reference: i32, value: u16) -> i32 {
            let raw = ((reference as u32) & 0x0FFF_0000) | u32::from(value);
            raw.sign_extend(28)
        }

        fn write_high(reference: i32, value: u16) -> i32 {
            let raw = ((reference as u32) & 0xFFFF) | (u32::from(value & 0x0FFF) << 16);
            raw.sign_extend(28)
        }

        let bg_idx = ((address >> 4) & 1) as usize;
        let bg = bg_idx + 2;
        let affine_parameters = &mut self.bg_affine_parameters[bg_idx];

        match address & 0xE {
            0x0 => {
                affine_parameters.a = cast_parameter(value);
                log::debug!("BG{bg}PA write: {value:04X}");
                None
            }
            0x2 => {
                affine_parameters.b = cast_parameter(value);
                log::debug!("BG{bg}PB write: {value:04X}");
                None
            }
            0x4 => {
                affine_parameters.c = cast_parameter(value);
                log::debug!("BG{bg}PC write: {value:04X}");
                None
            }
            0x6 => {
                affine_parameters.d = cast_parameter(value);
                log::debug!("BG{bg}PD write: {value:04X}");
                None
            }
            0x8 | 0xA => {
                affine_parameters.reference_x = if address & 0xE == 0x8 {
                    write_low(affine_parameters.reference_x, value)
                } else {
                    write_high(affine_parameters.reference_x, value)
                };

                log::debug!("BG{bg}X write: {value:04X} at {address:08X}");
                log::debug!("  Reference point X: {}", affine_parameters.reference_x);

                Some(ReferencePoint::X(bg_idx, affine_parameters.reference_x))
            }
            0xC | 0xE => {
                affine_parameters.reference_y = if address & 0xE == 0xC {
                    write_low(affine_parameters.reference_y, value)
                } else {
                    write_high(affine_parameters.reference_y, value)
                };

                log::debug!("BG{bg}Y write: {value:04X} at {address:08X}");
                log::debug!("  Reference point Y: {}", affine_parameters.reference_y);

                Some(ReferencePoint::Y(bg_idx, affine_parameters.reference_y))
            }
            _ => unreachable!("value & 0xE is always one of the above 8 values"),
        }
    }

    // Raw halfword view of the write-only affine registers, for byte writes
    pub fn bg_affine_register_halfword(&self, address: u32) -> u16 {
        let bg_idx = ((address >> 4) & 1) as usize;
        let affine_parameters = &self.bg_affine_parameters[bg_idx];

        match address & 0xE {
            0x0 => affine_parameters.a as u16,
            0x2 => affine_parameters.b as u16,
            0x4 => affine_parameters.c as u16,
            0x6 => affine_parameters.d as u16,
            0x8 => affine_parameters.reference_x as u16,
            0xA => ((affine_parameters.reference_x >> 16) & 0x0FFF) as u16,
            0xC => affine_parameters.reference_y as u16,
            0xE => ((affine_parameters.reference_y >> 16) & 0x0FFF) as u16,
            _ => unreachable!("value & 0xE is always one of the above values"),
        }
    }

    // $4000040/$4000042: WIN0H/WIN1H (Window 0/1 horizontal coordinates)
    pub fn write_winh(&mut self, window: usize, value: u16) {
        [self.window_x1[window], self.window_x2[window]] = value.to_be_bytes();

        log::debug!("WIN{window}H write: {value:04X}");
        log::debug!("  X1: {}", self.window_x1[window]);
        log::debug!("  X2: {}", self.window_x2[window]);
    }

    pub fn read_winh(&self, window: usize) -> u16 {
        u16::from_be_bytes([self.window_x1[window], self.window_x2[window]])
    }

    // $4000044/$4000046: WIN0V/WIN1V (Window 0/1 vertical coordinates)
    pub fn write_winv(&mut self, window: usize, value: u16) {
        [self.window_y1[window], self.window_y2[window]] = value.to_be_bytes();

        log::debug!("WIN{window}V write: {value:04X}");
        log::debug!("  Y1: {}", self.window_y1[window]);
        log::debug!("  Y2: {}", self.window_y2[window]);
    }

    pub fn read_winv(&self, window: usize) -> u16 {
        u16::from_be_bytes([self.window_y1[window], self.window_y2[window]])
    }

    // $4000048: WININ (Window inside control)
    pub fn read_winin(&self) -> u16 {
        bool_array_to_bits(self.window_in_bg_enabled[0])
            | (u16::from(self.window_in_obj_enabled[0]) << 4)
            | (u16::from(self.window_in_blend_enabled[0]) << 5)
            | (bool_array_to_bits(self.window_in_bg_enabled[1]) << 8)
            | (u16::from(self.window_in_obj_enabled[1]) << 12)
            | (u16::from(self.window_in_blend_enabled[1]) << 13)
    }

    // $4000048: WININ (Window inside control)
    pub fn write_winin(&mut self, value: u16) {
        for window in 0..2 {
            let shift = 8 * window as u8;
            self.window_in_bg_enabled[window] = array::from_fn(|i| value.bit(shift + i as u8));
            self.window_in_obj_enabled[window] = value.bit(shift + 4);
            self.window_in_blend_enabled[window] = value.bit(shift + 5);
        }

        log::debug!("WININ write: {value:04X}");
        log::debug!("  Window 0 BG enabled: {:?}", self.window_in_bg_enabled[0]);
        log::debug!("  Window 0 OBJ enabled: {}", self.window_in_obj_enabled[0]);
        log::debug!("  Window 0 blending enabled: {}", self.window_in_blend_enabled[0]);
        log::debug!("  Window 1 BG enabled: {:?}", self.window_in_bg_enabled[1]);
        log::debug!("  Window 1 OBJ enabled: {}", self.window_in_obj_enabled[1]);
        log::debug!("  Window 1 blending enabled: {}", self.window_in_blend_enabled[1]);
    }

    // $400004A: WINOUT (Window outside control)
    pub fn read_winout(&self) -> u16 {
        bool_array_to_bits(self.window_out_bg_enabled)
            | (u16::from(self.window_out_obj_enabled) << 4)
            | (u16::from(self.window_out_blend_enabled) << 5)
            | (bool_array_to_bits(self.obj_window_bg_enabled) << 8)
            | (u16::from(self.obj_window_obj_enabled) << 12)
            | (u16::from(self.obj_window_blend_enabled) << 13)
    }

    // $400004A: WINOUT (Window outside control)
    pub fn write_winout(&mut self, value: u16) {
        self.window_out_bg_enabled = array::from_fn(|i| value.bit(i as u8));
        self.window_out_obj_enabled = value.bit(4);
        self.window_out_blend_enabled = value.bit(5);
        self.obj_window_bg_enabled = array::from_fn(|i| value.bit((8 + i) as u8));
        self.obj_window_obj_enabled = value.bit(12);
        self.obj_window_blend_enabled = value.bit(13);

        log::debug!("WINOUT write: {value:04X}");
        log::debug!("  Window outside BG enabled: {:?}", self.window_out_bg_enabled);
        log::debug!("  Window outside OBJ enabled: {}", self.window_out_obj_enabled);
        log::debug!("  Window outside blending enabled: {}", self.window_out_blend_enabled);
        log::debug!("  OBJ window BG enabled: {:?}", self.obj_window_bg_enabled);
        log::debug!("  OBJ window OBJ enabled: {}", self.obj_window_obj_enabled);
        log::debug!("  OBJ window blending enabled: {}", self.obj_window_blend_enabled);
    }

    // $400004C: MOSAIC (Mosaic size)
    pub fn write_mosaic(&mut self, value: u16) {
        let [bg_mosaic, obj_mosaic] = value.to_le_bytes();
        self.bg_mosaic_h_size = bg_mosaic & 0xF;
        self.bg_mosaic_v_size = bg_mosaic >> 4;
        self.obj_mosaic_h_size = obj_mosaic & 0xF;
        self.obj_mosaic_v_size = obj_mosaic >> 4;

        log::debug!("MOSAIC write: {value:04X}");
        log::debug!("  BG size: {}x{}", self.bg_mosaic_width(), self.bg_mosaic_height());
        log::debug!("  OBJ size: {}x{}", self.obj_mosaic_h_size + 1, self.obj_mosaic_v_size + 1);
    }

    pub fn read_mosaic(&self) -> u16 {
        u16::from_le_bytes([
            self.bg_mosaic_h_size | (self.bg_mosaic_v_size << 4),
            self.obj_mosaic_h_size | (self.obj_mosaic_v_size << 4),
        ])
    }

    pub fn bg_mosaic_width(&self) -> u8 {
        self.bg_mosaic_h_size + 1
    }

    pub fn bg_mosaic_height(&self) -> u8 {
        self.bg_mosaic_v_size + 1
    }

    // $4000050: BLDCNT (Blending control)
    pub fn read_bldcnt(&self) -> u16 {
        bool_array_to_bits(self.bg_blend_1st_target)
            | (u16::from(self.obj_blend_1st_target) << 4)
            | (u16::from(self.backdrop_blend_1st_target) << 5)
            | ((self.blend_mode as u16) << 6)
            | (bool_array_to_bits(self.bg_blend_2nd_target) << 8)
            | (u16::from(self.obj_blend_2nd_target) << 12)
            | (u16::from(self.backdrop_blend_2nd_target) << 13)
    }

    // $4000050: BLDCNT (Blending control)
    pub fn write_bldcnt(&mut self, value: u16) {
        self.bg_blend_1st_target = array::from_fn(|i| value.bit(i as u8));
        self.obj_blend_1st_target = value.bit(4);
        self.backdrop_blend_1st_target = value.bit(5);
        self.blend_mode = BlendMode::from_bits(value >> 6);
        self.bg_blend_2nd_target = array::from_fn(|i| value.bit((8 + i) as u8));
        self.obj_blend_2nd_target = value.bit(12);
        self.backdrop_blend_2nd_target = value.bit(13);

        log::debug!("BLDCNT write: {value:04X}");
        log::debug!("  Blend mode: {:?}", self.blend_mode);
        log::debug!("  BG 1st target: {:?}", self.bg_blend_1st_target);
        log::debug!("  OBJ 1st target: {}", self.obj_blend_1st_target);
        log::debug!("  Backdrop 1st target: {}", self.backdrop_blend_1st_target);
        log::debug!("  BG 2nd target: {:?}", self.bg_blend_2nd_target);
        log::debug!("  OBJ 2nd target: {}", self.obj_blend_2nd_target);
        log::debug!("  Backdrop 2nd target: {}", self.backdrop_blend_2nd_target);
    }

    // $4000052: BLDALPHA (Alpha blending coefficients)
    pub fn read_bldalpha(&self) -> u16 {
        u16::from_le_bytes([self.blend_alpha_a, self.blend_alpha_b])
    }

    // $4000052: BLDALPHA (Alpha blending coefficients)
    pub fn write_bldalpha(&mut self, value: u16) {
        self.blend_alpha_a = (value & 0x1F) as u8;
        self.blend_alpha_b = ((value >> 8) & 0x1F) as u8;

        log::debug!("BLDALPHA write: {value:04X}");
        log::debug!("  A: {}", self.blend_alpha_a);
        log::debug!("  B: {}", self.blend_alpha_b);
    }

    // $4000054: BLDY (Blending brightness coefficient)
    pub fn write_bldy(&mut self, value: u16) {
        self.blend_brightness = (value & 0x1F) as u8;

        log::debug!("BLDY write: {value:04X} (coefficient = {})", self.blend_brightness);
    }

    pub fn any_window_enabled(&self) -> bool {
        self.window_enabled[0] || self.window_enabled[1] || self.obj_window_enabled
    }

    pub fn window_layers_enabled(&self, window: Window) -> WindowEnabled {
        match window {
            Window::Inside0 => WindowEnabled {
                bg: self.window_in_bg_enabled[0],
                obj: self.window_in_obj_enabled[0],
                blend: self.window_in_blend_enabled[0],
            },
            Window::Inside1 => WindowEnabled {
                bg: self.window_in_bg_enabled[1],
                obj: self.window_in_obj_enabled[1],
                blend: self.window_in_blend_enabled[1],
            },
            Window::InsideObj => WindowEnabled {
                bg: self.obj_window_bg_enabled,
                obj: self.obj_window_obj_enabled,
                blend: self.obj_window_blend_enabled,
            },
            Window::Outside => WindowEnabled {
                bg: self.window_out_bg_enabled,
                obj: self.window_out_obj_enabled,
                blend: self.window_out_blend_enabled,
            },
        }
    }
}

/// A reference point register write: affine BG index (0 = BG2, 1 = BG3) and the new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePoint {
    X(usize, i32),
    Y(usize, i32),
}

fn bool_array_to_bits(arr: [bool; 4]) -> u16 {
    arr.into_iter().enumerate().fold(0, |bits, (i, bit)| bits | (u16::from(bit) << i))
}
