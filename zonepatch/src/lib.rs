//! Surgical in-place editing of zones inside binary audio containers.
//!
//! Most audio containers store metadata in a handful of well-defined regions, while the
//! rest of the file (usually the audio payload) must never be touched. Resizing such a
//! region in place is deceptively hard: every byte after it has to move, and every field
//! elsewhere in the file that stores the region's offset or length has to be rewritten to
//! match, or the file is corrupt.
//!
//! zonepatch solves exactly that problem, and nothing else. A format adapter (a RIFF/WAV
//! parser, a tracker module reader, an APE tag writer) registers the regions it discovers
//! as named *zones* and the pointer/length fields it finds as *references*, both in a
//! per-file [`FileLayout`](layout::FileLayout). Applying an edit then shifts the file tail
//! with a bounded buffer, updates every registered offset, and rewrites every affected
//! reference field, leaving all unmanaged bytes untouched.
//!
//! # Examples
//!
//! ```rust
//! use zonepatch::config::ApplyOptions;
//! use zonepatch::layout::{Endianness, FieldWidth, FileLayout};
//! use zonepatch::patch::ZoneEdit;
//!
//! use std::io::Cursor;
//!
//! # fn main() -> zonepatch::error::Result<()> {
//! // A 40 byte file: a pointer at offset 0, zone "a" at 10..30, zone "b" at 30..35
//! let mut data = vec![0_u8; 40];
//! data[..4].copy_from_slice(&30_u32.to_le_bytes());
//! data[30..35].copy_from_slice(b"BBBBB");
//! let mut file = Cursor::new(data);
//!
//! // What an adapter would register while parsing
//! let mut layout = FileLayout::new();
//! layout.add_zone("a", 10, 20, true)?;
//! layout.add_zone("b", 30, 5, true)?;
//! layout.add_position(0, "b", FieldWidth::U32, Endianness::Little);
//!
//! // Grow "a" by 5 bytes
//! layout.apply_edit(&mut file, ZoneEdit::edit("a", vec![0xAA; 25]), ApplyOptions::new())?;
//!
//! // "b" moved, and the pointer to it was rewritten
//! assert_eq!(layout.zone("b").unwrap().offset(), 35);
//!
//! let data = file.into_inner();
//! assert_eq!(data.len(), 45);
//! assert_eq!(&data[..4], &35_u32.to_le_bytes());
//! assert_eq!(&data[35..40], b"BBBBB");
//! # Ok(()) }
//! ```
//!
//! # Scope
//!
//! zonepatch is the structural core only. It never parses format headers, never interprets
//! field values, and never decides what content to write; adapters supply structure during
//! their read pass and finished bytes at write time. A session owns its stream exclusively
//! for its whole duration, and nothing is persisted beyond the file itself.

pub mod config;
pub mod error;
pub mod layout;
pub(crate) mod macros;
pub mod patch;
mod util;

pub use util::io;
