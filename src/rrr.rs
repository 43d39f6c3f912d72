//! Compressed bitmap supporting rank and select in constant time.
//!
//! From [Raman, Raman, and Rao, "Succinct Indexable Dictionaries with
//! Applications to Encoding k-ary Trees and
//! Multisets"](https://arxiv.org/abs/0705.0552).
//!
//! The input is cut into blocks of `block_bits` bits, and each block is
//! stored as its class (the number of bits set in it) plus an
//! enumerative offset within the class (see the codec module), so the
//! payload approaches the zeroth-order entropy of the input rather than
//! its raw length. Classes are fixed-width records; offsets are
//! variable-width, with the width determined by the class.
//!
//! To make queries constant-time, every `marker_bits` input bits we
//! snapshot the running rank and the bit cursor into the offsets buffer.
//! A query jumps to the nearest preceding marker and walks at most
//! `marker_bits / block_bits` class records from there, decoding a
//! single block at the end.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::bits::Bits;
use crate::codec;
use crate::errors;
use crate::packed::PackedBits;
use crate::rank::BitRankSupport;
use crate::select::Select1Support;
use crate::space_usage::SpaceUsage;
use crate::storage::BlockType;

/// An immutable bitmap compressed to its zeroth-order entropy,
/// answering [`get_bit`](#method.get_bit), [`rank1`](#method.rank1),
/// and [`select1`](#method.select1) in constant expected time.
///
/// Built once from any [`Bits`] input and never modified afterwards, so
/// shared references may query it from any number of threads without
/// synchronization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RrrBitmap {
    len: u64,
    num_ones: u64,
    block_bits: usize,
    marker_bits: usize,

    // Per-block metadata: the class record for every block, and the
    // concatenated variable-width offset codes.
    classes: PackedBits,
    offsets: PackedBits,

    // Per-marker metadata: the rank after each marker window, and the
    // offsets cursor after the block that closes the window.
    marked_ranks: PackedBits,
    marked_offsets: PackedBits,
}

impl RrrBitmap {
    /// Compresses `bits` using blocks of `block_bits` bits and markers
    /// every `marker_bits` bits.
    ///
    /// `marker_bits` is rounded up to the next multiple of `block_bits`,
    /// since marker cursors are recorded at block granularity. Larger
    /// blocks and sparser markers shrink the structure; smaller ones
    /// speed up queries.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is empty, `block_bits` is not in `1 ..= 64`, or
    /// `marker_bits < block_bits`.
    pub fn new<B: Bits + ?Sized>(bits: &B, block_bits: usize, marker_bits: usize) -> Self {
        let len = bits.bit_len();
        assert!(len > 0, "RrrBitmap::new: empty input");
        assert!(
            block_bits >= 1 && block_bits <= codec::MAX_BLOCK_BITS,
            "RrrBitmap::new: invalid block size"
        );
        assert!(
            marker_bits >= block_bits,
            "RrrBitmap::new: markers must be at least a block apart"
        );

        let blocks_per_marker = (marker_bits as u64).ceil_div(block_bits as u64);
        let marker_bits = (blocks_per_marker * block_bits as u64) as usize;

        let n_blocks = len.ceil_div(block_bits as u64);
        let n_markers = len.ceil_div(marker_bits as u64);

        let offsets_cap = n_blocks
            .checked_mul(codec::max_offset_width(block_bits) as u64)
            .expect("RrrBitmap::new: size overflow");

        let mut classes =
            PackedBits::with_record_bits((block_bits as u64 + 1).ceil_lg(), n_blocks);
        let mut offsets = PackedBits::new(offsets_cap);
        let mut marked_ranks =
            PackedBits::with_record_bits((len + 1).ceil_lg().max(1), n_markers);
        let mut marked_offsets =
            PackedBits::with_record_bits((offsets_cap + 1).ceil_lg().max(1), n_markers);

        let mut rank = 0;
        let mut cursor = 0;
        let mut marker = 0;

        for block_index in 0..n_blocks {
            let start = block_index * block_bits as u64;
            // The tail block reads short and zero-extends, so its class
            // counts only the bits that exist.
            let width = (block_bits as u64).min(len - start) as usize;
            let block = bits.get_bits(start, width);

            let class = block.count_ones() as usize;
            let offset_width = codec::offset_width(block_bits, class);

            classes.set_record(block_index, class as u64);
            offsets.set_bits(cursor, offset_width, codec::encode(block_bits, class, block));
            cursor += offset_width as u64;
            rank += class as u64;

            if (block_index + 1) % blocks_per_marker == 0 {
                marked_ranks.set_record(marker, rank);
                marked_offsets.set_record(marker, cursor);
                marker += 1;
            }
        }

        // A final marker window extending past the padded blocks never
        // closes inside the loop; record it with the totals so the
        // marker ranks stay monotone for binary search.
        if marker < n_markers {
            marked_ranks.set_record(marker, rank);
            marked_offsets.set_record(marker, cursor);
        }

        offsets.truncate(cursor);

        RrrBitmap {
            len,
            num_ones: rank,
            block_bits,
            marker_bits,
            classes,
            offsets,
            marked_ranks,
            marked_offsets,
        }
    }

    /// The length of the original bitmap in bits.
    #[inline]
    pub fn bit_len(&self) -> u64 {
        self.len
    }

    /// The number of set bits in the bitmap.
    #[inline]
    pub fn count_ones(&self) -> u64 {
        self.num_ones
    }

    /// The number of unset bits in the bitmap.
    #[inline]
    pub fn count_zeros(&self) -> u64 {
        self.len - self.num_ones
    }

    /// The block size the bitmap was built with.
    #[inline]
    pub fn block_bits(&self) -> usize {
        self.block_bits
    }

    /// The marker spacing the bitmap was built with, after rounding up
    /// to a multiple of the block size.
    #[inline]
    pub fn marker_bits(&self) -> usize {
        self.marker_bits
    }

    /// Queries the `position`th bit of the original bitmap.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    pub fn get_bit(&self, position: u64) -> bool {
        assert!(position < self.len, "RrrBitmap::get_bit: out of bounds");

        let (mut block_index, mut cursor, _) = self.seed(position / self.marker_bits as u64);
        let mut rel = position - block_index * self.block_bits as u64;

        while rel >= self.block_bits as u64 {
            let (_, width) = self.class_at(block_index);
            cursor += width as u64;
            block_index += 1;
            rel -= self.block_bits as u64;
        }

        self.decode_at(block_index, cursor).get_bit(rel as usize)
    }

    /// The number of set bits strictly before `position`.
    ///
    /// Positions past the end saturate at the total count.
    pub fn rank1(&self, position: u64) -> u64 {
        if position >= self.len {
            return self.num_ones;
        }

        let (mut block_index, mut cursor, mut rank) =
            self.seed(position / self.marker_bits as u64);
        let mut rel = position - block_index * self.block_bits as u64;

        while rel >= self.block_bits as u64 {
            let (class, width) = self.class_at(block_index);
            rank += class as u64;
            cursor += width as u64;
            block_index += 1;
            rel -= self.block_bits as u64;
        }

        if rel == 0 {
            return rank;
        }

        let block = self.decode_at(block_index, cursor);
        rank + (block & u64::low_mask(rel as usize)).count_ones() as u64
    }

    /// The number of unset bits strictly before `position`.
    ///
    /// Positions past the end saturate at the total count.
    #[inline]
    pub fn rank0(&self, position: u64) -> u64 {
        position.min(self.len) - self.rank1(position)
    }

    /// The position of the `index`th set bit, where `index` counts
    /// from 1.
    ///
    /// Returns `None` when `index` is 0 or exceeds
    /// [`count_ones`](#method.count_ones).
    pub fn select1(&self, index: u64) -> Option<u64> {
        if index == 0 || index > self.num_ones {
            return None;
        }

        let (mut block_index, mut cursor, mut rank) =
            self.seed(self.first_marker_reaching(index));

        // Skip whole blocks; the target bit is in the first block whose
        // class carries the rank to `index`.
        loop {
            let (class, width) = self.class_at(block_index);
            if rank + class as u64 >= index {
                break;
            }
            rank += class as u64;
            cursor += width as u64;
            block_index += 1;
        }

        let mut block = self.decode_at(block_index, cursor);
        loop {
            let bit = block.trailing_zeros() as u64;
            rank += 1;
            if rank == index {
                return Some(block_index * self.block_bits as u64 + bit);
            }
            block &= block - 1;
        }
    }

    /// Writes the bitmap to `sink`: length, 1 count, block size, marker
    /// spacing, then the four packed vectors.
    pub fn write_to<W: io::Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_u64::<LittleEndian>(self.len)?;
        sink.write_u64::<LittleEndian>(self.num_ones)?;
        sink.write_u64::<LittleEndian>(self.block_bits as u64)?;
        sink.write_u64::<LittleEndian>(self.marker_bits as u64)?;
        self.classes.write_to(sink)?;
        self.offsets.write_to(sink)?;
        self.marked_ranks.write_to(sink)?;
        self.marked_offsets.write_to(sink)
    }

    /// Reads back a bitmap written by [`write_to`](#method.write_to).
    ///
    /// Fails with `InvalidData` if the header fields are inconsistent
    /// with each other or with the vectors that follow.
    pub fn read_from<R: io::Read>(source: &mut R) -> io::Result<Self> {
        let len = source.read_u64::<LittleEndian>()?;
        let num_ones = source.read_u64::<LittleEndian>()?;
        let block_bits = source.read_u64::<LittleEndian>()? as usize;
        let marker_bits = source.read_u64::<LittleEndian>()? as usize;

        if len == 0 {
            return errors::bad_header("RrrBitmap", "empty bitmap");
        }
        if block_bits < 1 || block_bits > codec::MAX_BLOCK_BITS {
            return errors::bad_header("RrrBitmap", "invalid block size");
        }
        if marker_bits < block_bits || marker_bits % block_bits != 0 {
            return errors::bad_header("RrrBitmap", "invalid marker spacing");
        }
        if num_ones > len {
            return errors::bad_header("RrrBitmap", "more set bits than bits");
        }

        let classes = PackedBits::read_from(source)?;
        let offsets = PackedBits::read_from(source)?;
        let marked_ranks = PackedBits::read_from(source)?;
        let marked_offsets = PackedBits::read_from(source)?;

        let n_blocks = len.ceil_div(block_bits as u64);
        let n_markers = len.ceil_div(marker_bits as u64);

        if classes.record_bits() != (block_bits as u64 + 1).ceil_lg()
            || classes.record_len() != n_blocks
        {
            return errors::bad_header("RrrBitmap", "class vector does not match header");
        }
        if marked_ranks.record_bits() == 0
            || marked_ranks.record_len() != n_markers
            || marked_offsets.record_bits() == 0
            || marked_offsets.record_len() != n_markers
        {
            return errors::bad_header("RrrBitmap", "marker vectors do not match header");
        }

        let mut rank = 0;
        let mut cursor = 0;
        for block_index in 0..n_blocks {
            let class = classes.get_record(block_index) as usize;
            if class > block_bits {
                return errors::bad_header("RrrBitmap", "class exceeds block size");
            }
            let width = codec::offset_width(block_bits, class);
            if cursor + width as u64 > offsets.bit_len() {
                return errors::bad_header("RrrBitmap", "offsets shorter than classes imply");
            }
            if offsets.get_bits(cursor, width) >= codec::binomial(block_bits, class) {
                return errors::bad_header("RrrBitmap", "offset out of range for its class");
            }
            rank += class as u64;
            cursor += width as u64;
        }
        if rank != num_ones {
            return errors::bad_header("RrrBitmap", "classes do not sum to the 1 count");
        }
        if cursor != offsets.bit_len() {
            return errors::bad_header("RrrBitmap", "offsets length does not match classes");
        }

        Ok(RrrBitmap {
            len,
            num_ones,
            block_bits,
            marker_bits,
            classes,
            offsets,
            marked_ranks,
            marked_offsets,
        })
    }

    // Query seed at the given marker: the index of the first block past
    // the marker boundary, the offsets cursor for that block, and the
    // rank at its start.
    fn seed(&self, marker: u64) -> (u64, u64, u64) {
        if marker == 0 {
            (0, 0, 0)
        } else {
            (
                marker * (self.marker_bits / self.block_bits) as u64,
                self.marked_offsets.get_record(marker - 1),
                self.marked_ranks.get_record(marker - 1),
            )
        }
    }

    // Index of the first marker whose recorded rank reaches `index`;
    // the matching set bit lies inside that marker's window.
    fn first_marker_reaching(&self, index: u64) -> u64 {
        let mut lo = 0;
        let mut hi = self.marked_ranks.record_len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.marked_ranks.get_record(mid) < index {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    fn class_at(&self, block_index: u64) -> (usize, usize) {
        let class = self.classes.get_record(block_index) as usize;
        (class, codec::offset_width(self.block_bits, class))
    }

    fn decode_at(&self, block_index: u64, cursor: u64) -> u64 {
        let (class, width) = self.class_at(block_index);
        codec::decode(self.block_bits, class, self.offsets.get_bits(cursor, width))
    }
}

impl Bits for RrrBitmap {
    #[inline]
    fn bit_len(&self) -> u64 {
        self.len
    }

    fn get_bit(&self, position: u64) -> bool {
        RrrBitmap::get_bit(self, position)
    }
}

impl BitRankSupport for RrrBitmap {
    #[inline]
    fn limit(&self) -> u64 {
        self.len
    }

    fn rank1(&self, position: u64) -> u64 {
        RrrBitmap::rank1(self, position)
    }

    fn rank0(&self, position: u64) -> u64 {
        RrrBitmap::rank0(self, position)
    }
}

impl Select1Support for RrrBitmap {
    fn select1(&self, index: u64) -> Option<u64> {
        RrrBitmap::select1(self, index)
    }
}

impl SpaceUsage for RrrBitmap {
    fn is_stack_only() -> bool {
        false
    }

    fn heap_bytes(&self) -> usize {
        self.classes.heap_bytes()
            + self.offsets.heap_bytes()
            + self.marked_ranks.heap_bytes()
            + self.marked_offsets.heap_bytes()
    }
}
