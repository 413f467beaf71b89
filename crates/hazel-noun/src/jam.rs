//! Jam and cue, the bitwise noun serialization pair.
//!
//! The stream is read from the low end up. An atom is the tag bit `0`
//! followed by its mat encoding: a unary run of zeros counting the bits of
//! the value's bit length, a `1` terminator, the length with its implicit
//! high bit omitted, then the value bits. A cell is the tag bits `1,0`
//! followed by the encoded head and tail. A subterm that was already emitted
//! may instead be the tag bits `1,1` followed by the mat encoding of its
//! first emission's bit offset; the encoder picks whichever form is shorter
//! and re-emits on ties. The atom `0` has a zero-length mat, so it costs two
//! bits and is never worth a back-reference.
//!
//! The finished stream is padded with high zero bits to a byte boundary and
//! delivered with bit 0 in the least-significant bit of the first byte; the
//! decoder recovers the stream length by locating the highest set bit.

use alloc::{collections::btree_map::BTreeMap, vec, vec::Vec};
use bitvec::prelude::{BitSlice, BitVec, Lsb0};
use ibig::UBig;
use num_traits::Zero;
use thiserror::Error;

use crate::{bits, cell, Noun};

/// Decode failure. Every variant means the input is not a well-formed jam
/// stream; the encoder cannot produce any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CueError {
    #[error("input has no significant bits")]
    Empty,
    #[error("bitstream ended mid-read")]
    Truncated,
    #[error("corrupt or oversized length prefix")]
    InvalidLength,
    #[error("back-reference to offset {0} which holds no noun")]
    DanglingBackref(usize),
    #[error("{0} residual bits after the root noun")]
    TrailingBits(usize),
}

fn met0(value: u64) -> usize {
    (u64::BITS - value.leading_zeros()) as usize
}

/// Payload bits of the mat encoding of `value`, tag bits excluded.
fn mat_cost(value: usize) -> usize {
    if value == 0 {
        return 1;
    }
    let width = met0(value as u64);
    width + 2 * met0(width as u64)
}

fn mat_atom(buffer: &mut BitVec<u8, Lsb0>, atom: &UBig) {
    buffer.push(false);
    if atom.is_zero() {
        buffer.push(true);
        return;
    }
    let width = atom.bit_len();
    let width_of_width = met0(width as u64);
    let len = buffer.len();
    buffer.resize(len + width_of_width, false);
    buffer.push(true);
    let width_bits = BitSlice::<usize, Lsb0>::from_element(&width);
    buffer.extend_from_bitslice(&width_bits[..width_of_width - 1]);
    let value_bytes = atom.to_le_bytes();
    let value_bits = BitSlice::<u8, Lsb0>::from_slice(&value_bytes);
    buffer.extend_from_bitslice(&value_bits[..width]);
}

fn mat_backref(buffer: &mut BitVec<u8, Lsb0>, offset: usize) {
    buffer.push(true);
    buffer.push(true);
    if offset == 0 {
        buffer.push(true);
        return;
    }
    let width = met0(offset as u64);
    let width_of_width = met0(width as u64);
    let len = buffer.len();
    buffer.resize(len + width_of_width, false);
    buffer.push(true);
    let width_bits = BitSlice::<usize, Lsb0>::from_element(&width);
    buffer.extend_from_bitslice(&width_bits[..width_of_width - 1]);
    let offset_bits = BitSlice::<usize, Lsb0>::from_element(&offset);
    buffer.extend_from_bitslice(&offset_bits[..width]);
}

enum JamOp<'a> {
    Emit(&'a Noun),
    /// Records a cell in the write cache once its whole subtree has been
    /// emitted, closing the span that opened at the carried offset.
    Record(&'a Noun, usize),
}

/// Serialize a noun, sharing repeated subterms through back-references.
pub fn jam(noun: &Noun) -> Vec<u8> {
    let mut cache = BTreeMap::<Noun, (usize, usize)>::new();
    let mut buffer = BitVec::<u8, Lsb0>::new();
    let mut stack = vec![JamOp::Emit(noun)];

    while let Some(op) = stack.pop() {
        match op {
            JamOp::Emit(current) => {
                if let Some(&(start, end)) = cache.get(current) {
                    if 2 + mat_cost(start) < end - start {
                        mat_backref(&mut buffer, start);
                    } else {
                        // Re-emitting the first span verbatim is safe:
                        // back-references inside it are absolute offsets.
                        let span = buffer[start..end].to_bitvec();
                        buffer.extend_from_bitslice(&span);
                    }
                    continue;
                }
                let start = buffer.len();
                match current {
                    Noun::Atom(value) => {
                        mat_atom(&mut buffer, value);
                        if !value.is_zero() {
                            cache.insert(current.clone(), (start, buffer.len()));
                        }
                    }
                    Noun::Cell(head, tail) => {
                        buffer.push(true);
                        buffer.push(false);
                        stack.push(JamOp::Record(current, start));
                        stack.push(JamOp::Emit(tail.as_ref()));
                        stack.push(JamOp::Emit(head.as_ref()));
                    }
                }
            }
            JamOp::Record(noun, start) => {
                cache.insert(noun.clone(), (start, buffer.len()));
            }
        }
    }

    bits::pad_to_bytes(&mut buffer);
    buffer.into_vec()
}

fn take_bit(stream: &BitSlice<u8, Lsb0>, cursor: &mut usize) -> Result<bool, CueError> {
    if *cursor >= stream.len() {
        return Err(CueError::Truncated);
    }
    let bit = stream[*cursor];
    *cursor += 1;
    Ok(bit)
}

fn take_bits<'a>(
    stream: &'a BitSlice<u8, Lsb0>,
    cursor: &mut usize,
    count: usize,
) -> Result<&'a BitSlice<u8, Lsb0>, CueError> {
    if count > stream.len() - *cursor {
        return Err(CueError::Truncated);
    }
    let taken = &stream[*cursor..*cursor + count];
    *cursor += count;
    Ok(taken)
}

/// Decode a mat length prefix: the unary length-of-length, then the length
/// with its implicit high bit restored. Zero means the zero-length atom.
fn rub_size(stream: &BitSlice<u8, Lsb0>, cursor: &mut usize) -> Result<usize, CueError> {
    let zeros =
        bits::count_trailing_zeros(&stream[*cursor..]).ok_or(CueError::InvalidLength)?;
    if zeros == 0 {
        *cursor += 1;
        return Ok(0);
    }
    if zeros > u64::BITS as usize {
        return Err(CueError::InvalidLength);
    }
    *cursor += zeros + 1;
    let low = take_bits(stream, cursor, zeros - 1)?;
    let mut raw = [0u8; 8];
    BitSlice::<u8, Lsb0>::from_slice_mut(&mut raw)[..zeros - 1].copy_from_bitslice(low);
    let width = (1u64 << (zeros - 1)) | u64::from_le_bytes(raw);
    usize::try_from(width).map_err(|_| CueError::InvalidLength)
}

fn rub_atom(stream: &BitSlice<u8, Lsb0>, cursor: &mut usize) -> Result<UBig, CueError> {
    let width = rub_size(stream, cursor)?;
    if width == 0 {
        return Ok(UBig::from(0u8));
    }
    let value = take_bits(stream, cursor, width)?;
    if width <= u64::BITS as usize {
        // Fits in one machine word.
        let mut raw = [0u8; 8];
        BitSlice::<u8, Lsb0>::from_slice_mut(&mut raw)[..width].copy_from_bitslice(value);
        Ok(UBig::from(u64::from_le_bytes(raw)))
    } else {
        let mut raw = vec![0u8; (width + 7) / 8];
        BitSlice::<u8, Lsb0>::from_slice_mut(&mut raw)[..width].copy_from_bitslice(value);
        Ok(UBig::from_le_bytes(&raw))
    }
}

fn rub_offset(stream: &BitSlice<u8, Lsb0>, cursor: &mut usize) -> Result<usize, CueError> {
    let width = rub_size(stream, cursor)?;
    if width == 0 {
        return Ok(0);
    }
    if width > u64::BITS as usize {
        return Err(CueError::InvalidLength);
    }
    let value = take_bits(stream, cursor, width)?;
    let mut raw = [0u8; 8];
    BitSlice::<u8, Lsb0>::from_slice_mut(&mut raw)[..width].copy_from_bitslice(value);
    usize::try_from(u64::from_le_bytes(raw)).map_err(|_| CueError::InvalidLength)
}

enum CueOp {
    Decode,
    /// Pops the decoded head and tail off the result stack and records the
    /// finished cell at the offset its tag started at.
    Assemble { start: usize },
}

/// Deserialize a jam stream. The whole significant prefix of the input must
/// decode to exactly one noun.
pub fn cue(bytes: &[u8]) -> Result<Noun, CueError> {
    let real = bits::real_size(bytes);
    if real == 0 {
        return Err(CueError::Empty);
    }
    let stream = &BitSlice::<u8, Lsb0>::from_slice(bytes)[..real];
    let mut cache = BTreeMap::<usize, Noun>::new();
    let mut results: Vec<Noun> = Vec::new();
    let mut stack = vec![CueOp::Decode];
    let mut cursor = 0usize;

    while let Some(op) = stack.pop() {
        match op {
            CueOp::Decode => {
                let start = cursor;
                if take_bit(stream, &mut cursor)? {
                    if take_bit(stream, &mut cursor)? {
                        // 1,1: back-reference to an earlier offset. Its own
                        // offset is not recorded.
                        let offset = rub_offset(stream, &mut cursor)?;
                        let shared = cache
                            .get(&offset)
                            .ok_or(CueError::DanglingBackref(offset))?;
                        results.push(shared.clone());
                    } else {
                        // 1,0: cell; head first, then tail.
                        stack.push(CueOp::Assemble { start });
                        stack.push(CueOp::Decode);
                        stack.push(CueOp::Decode);
                    }
                } else {
                    // 0: atom.
                    let noun = Noun::Atom(rub_atom(stream, &mut cursor)?);
                    cache.insert(start, noun.clone());
                    results.push(noun);
                }
            }
            CueOp::Assemble { start } => {
                let tail = results.pop().expect("cell tail decoded");
                let head = results.pop().expect("cell head decoded");
                let noun = cell(head, tail);
                cache.insert(start, noun.clone());
                results.push(noun);
            }
        }
    }

    if cursor != real {
        return Err(CueError::TrailingBits(real - cursor));
    }
    Ok(results.pop().expect("root noun decoded"))
}

/// [`cue`] for pre-validated input; panics instead of returning an error.
pub fn cue_unchecked(bytes: &[u8]) -> Noun {
    match cue(bytes) {
        Ok(noun) => noun,
        Err(err) => panic!("cue of malformed input: {err}"),
    }
}
