//! RRR compressed bitmaps for Rust.
//!
//! An [`RrrBitmap`] stores an immutable bit string in space close to its
//! zeroth-order entropy while answering bit access, rank, and select
//! queries in constant expected time. [`PackedBits`] is the plain packed
//! vector that feeds construction and backs the compressed form.
//!
//! # Usage
//!
//! It's [on crates.io](https://crates.io/crates/rrr-bitmap), so you can
//! add
//!
//! ```toml
//! [dependencies]
//! rrr-bitmap = "0.1"
//! ```
//!
//! to your `Cargo.toml`.
//!
//! ```
//! use rrr_bitmap::{PackedBits, RrrBitmap};
//!
//! let mut bits = PackedBits::new(96);
//! bits.set_bits(30, 3, 0b101);
//!
//! let rrr = RrrBitmap::new(&bits, 15, 60);
//! assert_eq!(2, rrr.count_ones());
//! assert!(rrr.get_bit(30));
//! assert_eq!(1, rrr.rank1(31));
//! assert_eq!(Some(32), rrr.select1(2));
//! ```

#![warn(missing_docs)]

mod bits;
mod codec;
mod errors;
mod packed;
mod rank;
mod rrr;
mod select;
mod space_usage;
mod storage;

pub use crate::bits::Bits;
pub use crate::packed::PackedBits;
pub use crate::rank::BitRankSupport;
pub use crate::rrr::RrrBitmap;
pub use crate::select::Select1Support;
pub use crate::space_usage::SpaceUsage;
pub use crate::storage::BlockType;
