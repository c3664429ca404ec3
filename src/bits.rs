//! Sub-word and multi-word packing
//!
//! Three small codecs used by the metrics:
//! - Bit words: independent flags inside one integer
//! - Split words: a 64-bit counter carried as (upper, lower) 32-bit words
//! - Sample packing: two 16-bit samples per 32-bit word, sample `2i` in the
//!   low half and `2i + 1` in the high half

use crate::error::{DatamonError, Result};
use crate::wire::{WireScalar, Word};
use log::warn;

/// Integer types usable as a set of flag bits
pub trait BitWord: Copy {
    /// Width in bits
    const WIDTH: u32;

    #[doc(hidden)]
    fn mask(bit: u32) -> Self;
    #[doc(hidden)]
    fn or(self, other: Self) -> Self;
    #[doc(hidden)]
    fn and_not(self, other: Self) -> Self;
    #[doc(hidden)]
    fn any(self, other: Self) -> bool;
}

macro_rules! impl_bit_word {
    ($($t:ty),+) => {
        $(
            impl BitWord for $t {
                const WIDTH: u32 = <$t>::BITS;

                fn mask(bit: u32) -> Self {
                    (1 as $t) << bit
                }

                fn or(self, other: Self) -> Self {
                    self | other
                }

                fn and_not(self, other: Self) -> Self {
                    self & !other
                }

                fn any(self, other: Self) -> bool {
                    self & other != 0
                }
            }
        )+
    };
}

impl_bit_word!(u8, u16, u32, u64, i32, i64);

fn check_bit<T: BitWord>(bit: u32) -> Result<()> {
    if bit >= T::WIDTH {
        warn!(
            "Trying to shift bit {} beyond the size of a {}-bit word, ignored",
            bit,
            T::WIDTH
        );
        return Err(DatamonError::IndexOutOfRange {
            index: bit as usize,
            bound: T::WIDTH as usize,
        });
    }
    Ok(())
}

/// Set one bit; out-of-range bits are logged and leave the word untouched
pub fn set_bit<T: BitWord>(word: &mut T, bit: u32) -> Result<()> {
    check_bit::<T>(bit)?;
    *word = word.or(T::mask(bit));
    Ok(())
}

/// Clear one bit; out-of-range bits are logged and leave the word untouched
pub fn clear_bit<T: BitWord>(word: &mut T, bit: u32) -> Result<()> {
    check_bit::<T>(bit)?;
    *word = word.and_not(T::mask(bit));
    Ok(())
}

/// Set or clear one bit
pub fn assign_bit<T: BitWord>(word: &mut T, bit: u32, value: bool) -> Result<()> {
    if value {
        set_bit(word, bit)
    } else {
        clear_bit(word, bit)
    }
}

/// Read one bit
pub fn get_bit<T: BitWord>(word: T, bit: u32) -> Result<bool> {
    check_bit::<T>(bit)?;
    Ok(word.any(T::mask(bit)))
}

/// Split a 64-bit value into `(upper, lower)` words
pub fn split(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, (value & 0xFFFF_FFFF) as u32)
}

/// Inverse of [`split`]
pub fn join(upper: u32, lower: u32) -> u64 {
    ((upper as u64) << 32) | lower as u64
}

const HALF_BITS: u32 = Word::BITS / 2;
const HALF_MASK: Word = (1 << HALF_BITS) - 1;

/// Words needed to hold `samples` packed samples (odd counts round up)
pub fn packed_len(samples: usize) -> usize {
    (samples + 1) / 2
}

/// Pack two samples into one word, low sample first
pub fn pack_pair(low: u16, high: u16) -> Word {
    ((high as Word) << HALF_BITS) | low as Word
}

/// Inverse of [`pack_pair`]
pub fn unpack_pair(word: Word) -> (u16, u16) {
    ((word & HALF_MASK) as u16, ((word >> HALF_BITS) & HALF_MASK) as u16)
}

/// Pack samples two per word
///
/// Each sample is truncated to its low 16 bits. An unpaired trailing
/// sample gets a zero high half.
pub fn pack<T: WireScalar>(samples: &[T]) -> Vec<Word> {
    samples
        .chunks(2)
        .map(|pair| {
            let low = pair[0].to_word() & HALF_MASK;
            let high = pair.get(1).map_or(0, |s| s.to_word() & HALF_MASK);
            (high << HALF_BITS) | low
        })
        .collect()
}

/// Unpack every half of every word (`2 * words.len()` samples)
pub fn unpack(words: &[Word]) -> Vec<Word> {
    let mut samples = Vec::with_capacity(words.len() * 2);
    for &word in words {
        samples.push(word & HALF_MASK);
        samples.push((word >> HALF_BITS) & HALF_MASK);
    }
    samples
}

/// Unpack and drop the padding half when the logical length is odd
pub fn unpack_exact(words: &[Word], samples: usize) -> Vec<Word> {
    let mut out = unpack(words);
    out.truncate(samples);
    out
}

/// Read sample `index` from a packed array
pub fn packed_sample(words: &[Word], index: usize) -> Result<Word> {
    let word = words
        .get(index / 2)
        .ok_or(DatamonError::IndexOutOfRange {
            index,
            bound: words.len() * 2,
        })?;
    Ok((word >> ((index % 2) as u32 * HALF_BITS)) & HALF_MASK)
}

/// Overwrite sample `index` in a packed array, leaving its neighbour alone
pub fn set_packed_sample(words: &mut [Word], index: usize, value: Word) -> Result<()> {
    let bound = words.len() * 2;
    let word = words
        .get_mut(index / 2)
        .ok_or(DatamonError::IndexOutOfRange { index, bound })?;
    let shift = (index % 2) as u32 * HALF_BITS;
    *word = (*word & !(HALF_MASK << shift)) | ((value & HALF_MASK) << shift);
    Ok(())
}
