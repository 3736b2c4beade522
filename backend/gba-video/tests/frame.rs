use gba_video::dma::{DmaOccasion, DmaRequests};
use gba_video::interrupts::{InterruptLine, InterruptType};
use gba_video::objects::{ObjLineParams, ObjPixel, ObjectLayer, WindowBounds, WindowMasks};
use gba_video::{GbaVideoConfig, Ppu, SCREEN_WIDTH, VideoMemory};
use gba_video_common::frontend::{Color, FrameSize, Renderer};
use gba_video_config::{FrameBuffering, GbaColorConversion};
use std::convert::Infallible;
use test_log::test;

// Line 0 of the first frame, and the start of VBlank in that frame
const FIRST_FRAME_START: u64 = 2688;
const FIRST_VBLANK: u64 = FIRST_FRAME_START + 160 * 1232;
const FRAME_CYCLES: u64 = 228 * 1232;

#[derive(Default)]
struct Console {
    vblank_irqs: u32,
    vblank_dmas: u32,
    last_frame: Vec<Color>,
    frames: u32,
}

impl InterruptLine for Console {
    fn raise_interrupt(&mut self, interrupt: InterruptType) {
        if interrupt == InterruptType::VBlank {
            self.vblank_irqs += 1;
        }
    }
}

impl DmaRequests for Console {
    fn request_dma(&mut self, occasion: DmaOccasion) {
        if occasion == DmaOccasion::VBlank {
            self.vblank_dmas += 1;
        }
    }

    fn stop_video_dma(&mut self) {}
}

impl ObjectLayer for Console {
    fn render_obj_line(&mut self, _memory: &VideoMemory, _params: &ObjLineParams) {}

    fn obj_pixel(&self, _x: u32) -> ObjPixel {
        ObjPixel::TRANSPARENT
    }
}

impl WindowMasks for Console {
    fn render_window_line(&mut self, _window: usize, _line: u32, _bounds: WindowBounds) {}

    fn inside_window(&self, _window: usize, _x: u32) -> bool {
        false
    }
}

impl Renderer for Console {
    type Err = Infallible;

    fn render_frame(
        &mut self,
        frame_buffer: &[Color],
        frame_size: FrameSize,
    ) -> Result<(), Self::Err> {
        assert_eq!(frame_buffer.len(), frame_size.len());
        self.last_frame = frame_buffer.to_vec();
        self.frames += 1;
        Ok(())
    }
}

fn mode_3_ppu(console: &mut Console) -> Ppu {
    let mut ppu = Ppu::new(GbaVideoConfig {
        color_conversion: GbaColorConversion::Shifted,
        frame_buffering: FrameBuffering::Double,
    });

    // Mode 3, BG2 on, VBlank IRQ on
    ppu.write_register(0x4000000, 0x0403, console);
    ppu.write_register(0x4000004, 0x0008, console);

    ppu.write_vram::<u16>(0x6000000, 0x001F);
    ppu.write_vram::<u16>(0x6000000 + 2 * (SCREEN_WIDTH + 1), 0x7C00);

    ppu
}

#[test]
fn mode_3_frame_end_to_end() {
    let mut console = Console::default();
    let mut ppu = mode_3_ppu(&mut console);

    ppu.step_to(FIRST_VBLANK - 1, &mut console).unwrap();
    assert_eq!(console.frames, 0);

    ppu.step_to(FIRST_VBLANK + 1, &mut console).unwrap();
    assert_eq!(console.frames, 1);
    assert_eq!(console.vblank_irqs, 1);
    assert_eq!(console.vblank_dmas, 1);
    assert!(ppu.frame_complete());

    let width = SCREEN_WIDTH as usize;
    assert_eq!(console.last_frame[0], Color::rgb(248, 0, 0));
    assert_eq!(console.last_frame[1], Color::BLACK);
    assert_eq!(console.last_frame[width + 1], Color::rgb(0, 0, 248));
    assert_eq!(ppu.frame_buffer(), console.last_frame.as_slice());
}

#[test]
fn one_frame_per_228_lines() {
    let mut console = Console::default();
    let mut ppu = mode_3_ppu(&mut console);

    ppu.step_to(FIRST_VBLANK + 5 * FRAME_CYCLES, &mut console).unwrap();

    assert_eq!(console.frames, 6);
    assert_eq!(console.vblank_irqs, 6);
}

#[test]
fn state_snapshot_resumes_identically() {
    let config = bincode::config::standard();

    let mut console = Console::default();
    let mut ppu = mode_3_ppu(&mut console);
    ppu.step_to(FIRST_FRAME_START + 80 * 1232 + 333, &mut console).unwrap();

    let snapshot = bincode::encode_to_vec(&ppu, config).unwrap();
    let (mut restored, _): (Ppu, usize) = bincode::decode_from_slice(&snapshot, config).unwrap();
    let mut restored_console = Console::default();

    ppu.step_to(FIRST_VBLANK, &mut console).unwrap();
    restored.step_to(FIRST_VBLANK, &mut restored_console).unwrap();

    assert_eq!(restored.vcount(), ppu.vcount());
    assert_eq!(restored.cycles(), ppu.cycles());
    assert_eq!(restored_console.last_frame, console.last_frame);
}
