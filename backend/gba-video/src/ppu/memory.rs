//! Palette RAM, OAM, and VRAM

use bincode::de::read::Reader;
use bincode::de::{BorrowDecoder, Decoder};
use bincode::error::DecodeError;
use bincode::{BorrowDecode, Decode, Encode};

pub const PALETTE_RAM_LEN: usize = 1024;
pub const OAM_LEN: usize = 1024;
pub const VRAM_LEN: usize = 96 * 1024;

const VRAM_ADDR_MASK: u32 = (128 * 1024) - 1;

// The BG engine can only address the first 64KB of VRAM
const BG_VRAM_LEN: u32 = 64 * 1024;

// Byte writes at or past these offsets land in OBJ tile memory and are dropped
const TILE_MODE_BYTE_WRITE_LIMIT: usize = 0x10000;
const BITMAP_MODE_BYTE_WRITE_LIMIT: usize = 0x14000;

mod private {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Access width for the memory bank accessors: `u8`, `u16`, or `u32`.
///
/// Halfword and word accesses are force-aligned to their width.
pub trait Width: Copy + private::Sealed {
    const BYTES: usize;

    #[doc(hidden)]
    fn from_le_slice(bytes: &[u8]) -> Self;

    #[doc(hidden)]
    fn write_le_slice(self, bytes: &mut [u8]);

    /// For byte accesses, the byte duplicated into both halves of a halfword.
    #[doc(hidden)]
    fn replicated_byte(self) -> Option<u16>;
}

impl Width for u8 {
    const BYTES: usize = 1;

    #[inline(always)]
    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline(always)]
    fn write_le_slice(self, bytes: &mut [u8]) {
        bytes[0] = self;
    }

    #[inline(always)]
    fn replicated_byte(self) -> Option<u16> {
        Some(u16::from(self) * 0x0101)
    }
}

impl Width for u16 {
    const BYTES: usize = 2;

    #[inline(always)]
    fn from_le_slice(bytes: &[u8]) -> Self {
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    #[inline(always)]
    fn write_le_slice(self, bytes: &mut [u8]) {
        bytes[..2].copy_from_slice(&self.to_le_bytes());
    }

    #[inline(always)]
    fn replicated_byte(self) -> Option<u16> {
        None
    }
}

impl Width for u32 {
    const BYTES: usize = 4;

    #[inline(always)]
    fn from_le_slice(bytes: &[u8]) -> Self {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline(always)]
    fn write_le_slice(self, bytes: &mut [u8]) {
        bytes[..4].copy_from_slice(&self.to_le_bytes());
    }

    #[inline(always)]
    fn replicated_byte(self) -> Option<u16> {
        None
    }
}

// Heap-allocated byte bank; decoding writes straight into heap memory so that large banks never
// pass through the stack
#[derive(Debug, Clone, Encode)]
struct Bank<const LEN: usize>(Box<[u8; LEN]>);

impl<const LEN: usize> Bank<LEN> {
    fn new() -> Self {
        Self(zeroed_bank())
    }

    #[inline]
    fn read<T: Width>(&self, offset: usize) -> T {
        let offset = offset & !(T::BYTES - 1);
        debug_assert!(offset + T::BYTES <= LEN, "bank offset {offset:05X} out of range");

        T::from_le_slice(&self.0[offset..offset + T::BYTES])
    }

    #[inline]
    fn write<T: Width>(&mut self, offset: usize, value: T) {
        let offset = offset & !(T::BYTES - 1);
        debug_assert!(offset + T::BYTES <= LEN, "bank offset {offset:05X} out of range");

        value.write_le_slice(&mut self.0[offset..offset + T::BYTES]);
    }
}

fn zeroed_bank<const LEN: usize>() -> Box<[u8; LEN]> {
    vec![0; LEN]
        .into_boxed_slice()
        .try_into()
        .unwrap_or_else(|_| unreachable!("vec was allocated with exactly LEN bytes"))
}

impl<const LEN: usize, Context> Decode<Context> for Bank<LEN> {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let mut array = zeroed_bank::<LEN>();
        decoder.reader().read(array.as_mut())?;
        Ok(Self(array))
    }
}

impl<'de, const LEN: usize, Context> BorrowDecode<'de, Context> for Bank<LEN> {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        let mut array = zeroed_bank::<LEN>();
        decoder.reader().read(array.as_mut())?;
        Ok(Self(array))
    }
}

/// The PPU's three memory banks.
///
/// All CPU-side accesses go through the width-parameterized accessors, which apply the address
/// mirroring and narrow-write rules of each bank.
#[derive(Debug, Clone, Encode, Decode)]
pub struct VideoMemory {
    palette_ram: Bank<PALETTE_RAM_LEN>,
    oam: Bank<OAM_LEN>,
    vram: Bank<VRAM_LEN>,
    bitmap_mode: bool,
}

impl VideoMemory {
    pub(crate) fn new() -> Self {
        Self { palette_ram: Bank::new(), oam: Bank::new(), vram: Bank::new(), bitmap_mode: false }
    }

    // VRAM mirroring depends on whether DISPCNT selects a bitmap mode
    pub(crate) fn set_bitmap_mode(&mut self, bitmap_mode: bool) {
        self.bitmap_mode = bitmap_mode;
    }

    #[must_use]
    pub fn read_palette_ram<T: Width>(&self, address: u32) -> T {
        self.palette_ram.read(palette_offset(address))
    }

    /// Byte writes store the byte into both halves of the containing halfword.
    pub fn write_palette_ram<T: Width>(&mut self, address: u32, value: T) {
        let offset = palette_offset(address);
        match value.replicated_byte() {
            Some(halfword) => self.palette_ram.write(offset, halfword),
            None => self.palette_ram.write(offset, value),
        }
    }

    #[must_use]
    pub fn read_oam<T: Width>(&self, address: u32) -> T {
        self.oam.read(oam_offset(address))
    }

    /// Byte writes to OAM are ignored.
    pub fn write_oam<T: Width>(&mut self, address: u32, value: T) {
        if T::BYTES == 1 {
            log::trace!("Ignoring OAM byte write {address:08X}");
            return;
        }

        self.oam.write(oam_offset(address), value);
    }

    #[must_use]
    pub fn read_vram<T: Width>(&self, address: u32) -> T {
        match self.vram_offset(address) {
            Some(offset) => self.vram.read(offset),
            None => T::from_le_slice(&[0; 4]),
        }
    }

    /// Byte writes to BG memory store the byte into both halves of the containing halfword;
    /// byte writes to OBJ memory are ignored.
    pub fn write_vram<T: Width>(&mut self, address: u32, value: T) {
        let Some(offset) = self.vram_offset(address) else {
            log::trace!("Ignoring VRAM write to unmapped address {address:08X}");
            return;
        };

        match value.replicated_byte() {
            Some(halfword) => {
                let limit = if self.bitmap_mode {
                    BITMAP_MODE_BYTE_WRITE_LIMIT
                } else {
                    TILE_MODE_BYTE_WRITE_LIMIT
                };

                if offset < limit {
                    self.vram.write(offset, halfword);
                } else {
                    log::trace!("Ignoring OBJ VRAM byte write {address:08X}");
                }
            }
            None => self.vram.write(offset, value),
        }
    }

    // Resolve a VRAM address to a bank offset. The top 32KB of the 128KB address space mirrors
    // the OBJ region, except that in bitmap modes the mirror of $10000-$13FFF is unmapped
    fn vram_offset(&self, address: u32) -> Option<usize> {
        let mut address = address & VRAM_ADDR_MASK;
        if address >= VRAM_LEN as u32 {
            if self.bitmap_mode && address & 0x4000 == 0 {
                return None;
            }
            address &= !0x8000;
        }

        Some(address as usize)
    }

    // Renderer-side accessors; offsets are already bank-relative

    pub(crate) fn bg_vram_byte(&self, offset: u32) -> u8 {
        if offset < BG_VRAM_LEN { self.vram.read(offset as usize) } else { 0 }
    }

    pub(crate) fn bg_vram_halfword(&self, offset: u32) -> u16 {
        if offset < BG_VRAM_LEN { self.vram.read(offset as usize) } else { 0 }
    }

    pub(crate) fn bitmap_vram_byte(&self, offset: u32) -> u8 {
        self.vram.read(offset as usize)
    }

    pub(crate) fn bitmap_vram_halfword(&self, offset: u32) -> u16 {
        self.vram.read(offset as usize)
    }

    /// Palette entry `index` (0-511; 256+ are the OBJ palettes).
    #[must_use]
    pub fn palette_color(&self, index: u32) -> u16 {
        self.palette_ram.read((2 * index) as usize & (PALETTE_RAM_LEN - 1))
    }
}

fn palette_offset(address: u32) -> usize {
    (address as usize) & (PALETTE_RAM_LEN - 1)
}

fn oam_offset(address: u32) -> usize {
    (address as usize) & (OAM_LEN - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_byte_writes_replicate() {
        let mut memory = VideoMemory::new();

        memory.write_palette_ram(0x05000403_u32, 0x1F_u8);
        assert_eq!(memory.read_palette_ram::<u16>(0x05000002), 0x1F1F);
        assert_eq!(memory.palette_color(1), 0x1F1F);

        memory.write_palette_ram(0x05000004_u32, 0x1234_5678_u32);
        assert_eq!(memory.read_palette_ram::<u16>(0x05000006), 0x1234);
        assert_eq!(memory.read_palette_ram::<u8>(0x05000004), 0x78);
    }

    #[test]
    fn oam_byte_writes_ignored() {
        let mut memory = VideoMemory::new();

        memory.write_oam(0x07000010_u32, 0xAB_u8);
        assert_eq!(memory.read_oam::<u16>(0x07000010), 0);

        memory.write_oam(0x07000411_u32, 0xBEEF_u16);
        assert_eq!(memory.read_oam::<u16>(0x07000010), 0xBEEF);
    }

    #[test]
    fn vram_upper_mirror() {
        let mut memory = VideoMemory::new();

        memory.write_vram(0x06010000_u32, 0x1111_u16);
        memory.write_vram(0x06014000_u32, 0x2222_u16);

        // Tile modes: $18000-$1FFFF mirrors $10000-$17FFF
        assert_eq!(memory.read_vram::<u16>(0x06018000), 0x1111);
        assert_eq!(memory.read_vram::<u16>(0x0601C000), 0x2222);

        // Bitmap modes: the mirror of $10000-$13FFF is unmapped
        memory.set_bitmap_mode(true);
        assert_eq!(memory.read_vram::<u16>(0x06018000), 0);
        assert_eq!(memory.read_vram::<u16>(0x0601C000), 0x2222);

        memory.write_vram(0x06018000_u32, 0x3333_u16);
        assert_eq!(memory.read_vram::<u16>(0x06010000), 0x1111);
    }

    #[test]
    fn vram_byte_write_limit_depends_on_mode() {
        let mut memory = VideoMemory::new();

        memory.write_vram(0x0600FFFF_u32, 0x42_u8);
        assert_eq!(memory.read_vram::<u16>(0x0600FFFE), 0x4242);

        memory.write_vram(0x06010000_u32, 0x42_u8);
        assert_eq!(memory.read_vram::<u16>(0x06010000), 0);

        memory.set_bitmap_mode(true);
        memory.write_vram(0x06013FFE_u32, 0x42_u8);
        assert_eq!(memory.read_vram::<u16>(0x06013FFE), 0x4242);

        memory.write_vram(0x06014000_u32, 0x42_u8);
        assert_eq!(memory.read_vram::<u16>(0x06014000), 0);
    }

    #[test]
    fn aligned_accesses() {
        let mut memory = VideoMemory::new();

        memory.write_vram(0x06000003_u32, 0xAABB_CCDD_u32);
        assert_eq!(memory.read_vram::<u32>(0x06000002), 0xAABB_CCDD);
        assert_eq!(memory.read_vram::<u16>(0x06000001), 0xCCDD);
        assert_eq!(memory.read_vram::<u8>(0x06000003), 0xAA);
    }

    #[test]
    fn bg_reads_stop_at_64kb() {
        let mut memory = VideoMemory::new();

        memory.write_vram(0x06010000_u32, 0xFFFF_u16);
        assert_eq!(memory.bg_vram_halfword(0x10000), 0);
        assert_eq!(memory.bg_vram_byte(0x10000), 0);
        assert_eq!(memory.bitmap_vram_halfword(0x10000), 0xFFFF);
    }
}
