use std::ops::RangeInclusive;

pub trait GetBit {
    #[must_use]
    fn bit(self, i: u8) -> bool;

    #[must_use]
    fn bits(self, range: RangeInclusive<u8>) -> Self;
}

macro_rules! impl_get_bit {
    ($($t:ty),* $(,)?) => {
        $(
            impl GetBit for $t {
                #[inline]
                fn bit(self, i: u8) -> bool {
                    debug_assert!(i < (<$t>::BITS as u8));
                    self & (1 << i) != 0
                }

                #[inline]
                fn bits(self, range: RangeInclusive<u8>) -> Self {
                    let start = *range.start();
                    let end = *range.end();
                    debug_assert!(end < (<$t>::BITS as u8));

                    (self >> start) & ((1 << (end - start + 1)) - 1)
                }
            }
        )*
    };
}

impl_get_bit!(u8, u16, u32);

pub trait U16Ext {
    fn lsb(self) -> u8;

    fn msb(self) -> u8;

    fn set_lsb(&mut self, value: u8);

    fn set_msb(&mut self, value: u8);
}

impl U16Ext for u16 {
    #[inline(always)]
    fn lsb(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    fn msb(self) -> u8 {
        (self >> 8) as u8
    }

    #[inline(always)]
    fn set_lsb(&mut self, value: u8) {
        *self = (*self & 0xFF00) | u16::from(value);
    }

    #[inline(always)]
    fn set_msb(&mut self, value: u8) {
        *self = (*self & 0x00FF) | (u16::from(value) << 8);
    }
}

pub trait SignExtend {
    /// Interpret the lowest `bits` bits as a two's complement value.
    #[must_use]
    fn sign_extend(self, bits: u32) -> i32;
}

impl SignExtend for u32 {
    #[inline]
    fn sign_extend(self, bits: u32) -> i32 {
        debug_assert!((1..=32).contains(&bits));

        let shift = 32 - bits;
        ((self << shift) as i32) >> shift
    }
}
