//! Word-stream primitives
//!
//! This module defines the wire unit shared by every metric:
//! - The 32-bit [`Word`] and a bounds-checked [`WordReader`] cursor
//! - Scalar narrowing/widening through [`WireScalar`]
//! - The ordered field schema ([`Field`], [`Schema`]) that fixes the
//!   serialization order of a metric's scalar members
//!
//! There is no framing on the wire. A metric's member order *is* its format,
//! so the schema is declared once per metric (with [`fields!`](crate::fields))
//! and both directions walk the same slice.

use crate::error::DecodeError;

/// One unit of the wire format
pub type Word = u32;

/// Width of a [`Word`] in bits
pub const WORD_BITS: u32 = Word::BITS;

/// Declared type of a scalar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed 32-bit
    I32,
    /// Unsigned 32-bit
    U32,
    /// Signed 64-bit, narrowed to one word
    I64,
    /// Unsigned 64-bit, narrowed to one word
    U64,
}

impl ScalarKind {
    /// Type name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
        }
    }

    /// Inclusive range of values a field of this kind can hold
    pub fn bounds(&self) -> (i128, i128) {
        match self {
            ScalarKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            ScalarKind::U32 => (0, u32::MAX as i128),
            ScalarKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            ScalarKind::U64 => (0, u64::MAX as i128),
        }
    }
}

/// A scalar that can travel as one word
///
/// `to_word` narrows with two's-complement wrap (modulo 2^32). `from_word`
/// reinterprets the bits; for 64-bit types the signed variant sign-extends.
pub trait WireScalar: Copy {
    /// Declared kind
    const KIND: ScalarKind;

    /// Narrow to a word
    fn to_word(self) -> Word;

    /// Widen from a word
    fn from_word(word: Word) -> Self;
}

impl WireScalar for i32 {
    const KIND: ScalarKind = ScalarKind::I32;

    fn to_word(self) -> Word {
        self as Word
    }

    fn from_word(word: Word) -> Self {
        word as i32
    }
}

impl WireScalar for u32 {
    const KIND: ScalarKind = ScalarKind::U32;

    fn to_word(self) -> Word {
        self
    }

    fn from_word(word: Word) -> Self {
        word
    }
}

impl WireScalar for i64 {
    const KIND: ScalarKind = ScalarKind::I64;

    fn to_word(self) -> Word {
        self as Word
    }

    fn from_word(word: Word) -> Self {
        word as i32 as i64
    }
}

impl WireScalar for u64 {
    const KIND: ScalarKind = ScalarKind::U64;

    fn to_word(self) -> Word {
        self as Word
    }

    fn from_word(word: Word) -> Self {
        word as u64
    }
}

/// Append a slice of scalars as consecutive words
pub fn push_array<T: WireScalar>(out: &mut Vec<Word>, values: &[T]) {
    out.extend(values.iter().map(|v| v.to_word()));
}

/// Cursor over a word stream
///
/// Every read is bounds-checked and fails with
/// [`DecodeError::TruncatedInput`] instead of reading past the end.
#[derive(Debug, Clone)]
pub struct WordReader<'a> {
    words: &'a [Word],
    pos: usize,
}

impl<'a> WordReader<'a> {
    /// Start reading at the beginning of `words`
    pub fn new(words: &'a [Word]) -> Self {
        Self { words, pos: 0 }
    }

    /// Words consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Words left to read
    pub fn remaining(&self) -> usize {
        self.words.len() - self.pos
    }

    /// Unconsumed tail of the stream
    pub fn rest(&self) -> &'a [Word] {
        &self.words[self.pos..]
    }

    /// Fail unless at least `needed` words remain
    pub fn require(&self, metric: &'static str, needed: usize) -> Result<(), DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::TruncatedInput {
                metric,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Consume exactly `n` words
    pub fn take(&mut self, metric: &'static str, n: usize) -> Result<&'a [Word], DecodeError> {
        self.require(metric, n)?;
        let slice = &self.words[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume one word
    pub fn next_word(&mut self, metric: &'static str) -> Result<Word, DecodeError> {
        Ok(self.take(metric, 1)?[0])
    }

    /// Fill `dest` from the next `dest.len()` words
    pub fn read_array<T: WireScalar>(
        &mut self,
        metric: &'static str,
        dest: &mut [T],
    ) -> Result<(), DecodeError> {
        let words = self.take(metric, dest.len())?;
        for (slot, &word) in dest.iter_mut().zip(words) {
            *slot = T::from_word(word);
        }
        Ok(())
    }
}

/// One scalar member of a metric, in wire order
pub struct Field<M> {
    /// Member name (also the key in the dictionary view)
    pub name: &'static str,
    /// Declared type
    pub kind: ScalarKind,
    /// Narrowing read accessor
    pub get: fn(&M) -> Word,
    /// Widening write accessor
    pub set: fn(&mut M, Word),
}

/// Ordered list of a metric's scalar members
pub struct Schema<M: 'static> {
    fields: &'static [Field<M>],
}

impl<M> Schema<M> {
    /// Wrap a static field list
    pub const fn new(fields: &'static [Field<M>]) -> Self {
        Self { fields }
    }

    /// Number of words the scalars occupy
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True for a metric without scalar members
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in wire order
    pub fn fields(&self) -> &'static [Field<M>] {
        self.fields
    }

    /// Field names in wire order
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&'static Field<M>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Append the scalar members of `metric` in schema order
pub fn serialize_fields<M>(schema: &Schema<M>, metric: &M, out: &mut Vec<Word>) {
    out.reserve(schema.len());
    out.extend(schema.fields.iter().map(|f| (f.get)(metric)));
}

/// Assign the scalar members of `metric` from consecutive words
///
/// Nothing is assigned unless the whole member list is available.
pub fn deserialize_fields<M>(
    schema: &Schema<M>,
    metric: &mut M,
    metric_name: &'static str,
    reader: &mut WordReader<'_>,
) -> Result<(), DecodeError> {
    let words = reader.take(metric_name, schema.len())?;
    for (field, &word) in schema.fields.iter().zip(words) {
        (field.set)(metric, word);
    }
    Ok(())
}

/// Build a static field list for a metric
///
/// ```ignore
/// const SCHEMA: Schema<Foo> = Schema::new(fields!(Foo { a: i32, b: u32 }));
/// ```
#[macro_export]
macro_rules! fields {
    ($metric:ty { $($name:ident : $ty:ty),+ $(,)? }) => {
        &[$(
            $crate::wire::Field::<$metric> {
                name: stringify!($name),
                kind: <$ty as $crate::wire::WireScalar>::KIND,
                get: |m: &$metric| $crate::wire::WireScalar::to_word(m.$name),
                set: |m: &mut $metric, w: $crate::wire::Word| {
                    m.$name = <$ty as $crate::wire::WireScalar>::from_word(w)
                },
            }
        ),+]
    };
}
