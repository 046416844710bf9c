use crate::error::{ErrorKind, Result, ZonePatchError};

use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

/// The byte order of a reference field
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Endianness {
	/// Least significant byte first (RIFF, most tracker formats)
	Little,
	/// Most significant byte first (AIFF, ID3)
	Big,
}

/// The width of a reference field
///
/// Containers store offsets and sizes in fields of varying widths; the width is declared
/// when a reference is registered and the recomputed value is range-checked against it at
/// write time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldWidth {
	/// A single byte
	U8,
	/// Two bytes
	U16,
	/// Four bytes
	U32,
	/// Eight bytes
	U64,
}

impl FieldWidth {
	/// Returns the number of bytes the field occupies
	pub fn byte_count(self) -> u8 {
		match self {
			FieldWidth::U8 => 1,
			FieldWidth::U16 => 2,
			FieldWidth::U32 => 4,
			FieldWidth::U64 => 8,
		}
	}

	fn max_value(self) -> u64 {
		match self {
			FieldWidth::U8 => u64::from(u8::MAX),
			FieldWidth::U16 => u64::from(u16::MAX),
			FieldWidth::U32 => u64::from(u32::MAX),
			FieldWidth::U64 => u64::MAX,
		}
	}

	// `location` is only carried for error context
	pub(crate) fn write_value<W>(
		self,
		writer: &mut W,
		value: u64,
		endianness: Endianness,
		location: u64,
	) -> Result<()>
	where
		W: Write,
	{
		if value > self.max_value() {
			return Err(ZonePatchError::new(ErrorKind::FieldOverflow {
				location,
				width: self,
				value,
			}));
		}

		match (self, endianness) {
			(FieldWidth::U8, _) => writer.write_u8(value as u8)?,
			(FieldWidth::U16, Endianness::Little) => writer.write_u16::<LittleEndian>(value as u16)?,
			(FieldWidth::U16, Endianness::Big) => writer.write_u16::<BigEndian>(value as u16)?,
			(FieldWidth::U32, Endianness::Little) => writer.write_u32::<LittleEndian>(value as u32)?,
			(FieldWidth::U32, Endianness::Big) => writer.write_u32::<BigEndian>(value as u32)?,
			(FieldWidth::U64, Endianness::Little) => writer.write_u64::<LittleEndian>(value)?,
			(FieldWidth::U64, Endianness::Big) => writer.write_u64::<BigEndian>(value)?,
		}

		Ok(())
	}
}

/// A field elsewhere in the file that stores a zone's offset
///
/// When the target zone moves, the engine rewrites the field; when the field itself lies
/// after a shift boundary, its registered `location` moves with the file bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionReference {
	pub(crate) location: u64,
	pub(crate) target: String,
	pub(crate) base: Option<u64>,
	pub(crate) width: FieldWidth,
	pub(crate) endianness: Endianness,
}

impl PositionReference {
	/// Returns the byte offset of the pointer field in the current view of the file
	pub fn location(&self) -> u64 {
		self.location
	}

	/// Returns the name of the zone whose offset the field encodes
	pub fn target(&self) -> &str {
		&self.target
	}

	/// Returns the base offset the stored value is relative to
	///
	/// `None` means the field stores an absolute file offset.
	pub fn base(&self) -> Option<u64> {
		self.base
	}

	/// Returns the declared field width
	pub fn width(&self) -> FieldWidth {
		self.width
	}

	/// Returns the declared byte order
	pub fn endianness(&self) -> Endianness {
		self.endianness
	}
}

/// What a [`LengthReference`] measures
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LengthTarget {
	/// The size of a single zone
	Zone(String),
	/// The summed size of several zones
	///
	/// Index/TOC entries often describe a run of consecutive chunks with one size field.
	Aggregate(Vec<String>),
	/// The total length of the file
	///
	/// RIFF-style master chunks store the whole file length (with an adjustment for the
	/// bytes preceding the field).
	FileSize,
}

impl LengthTarget {
	pub(crate) fn includes(&self, zone_name: &str) -> bool {
		match self {
			LengthTarget::Zone(name) => name == zone_name,
			LengthTarget::Aggregate(names) => names.iter().any(|n| n == zone_name),
			LengthTarget::FileSize => true,
		}
	}
}

/// A field elsewhere in the file that stores a zone's (or aggregate's) byte length
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LengthReference {
	pub(crate) location: u64,
	pub(crate) target: LengthTarget,
	pub(crate) adjustment: i64,
	pub(crate) width: FieldWidth,
	pub(crate) endianness: Endianness,
}

impl LengthReference {
	/// Returns the byte offset of the length field in the current view of the file
	pub fn location(&self) -> u64 {
		self.location
	}

	/// Returns what the field measures
	pub fn target(&self) -> &LengthTarget {
		&self.target
	}

	/// Returns the fixed adjustment added to the measured size when writing
	///
	/// Many containers store "size excluding header" (negative adjustment) or "size
	/// including footer" (positive adjustment).
	pub fn adjustment(&self) -> i64 {
		self.adjustment
	}

	/// Returns the declared field width
	pub fn width(&self) -> FieldWidth {
		self.width
	}

	/// Returns the declared byte order
	pub fn endianness(&self) -> Endianness {
		self.endianness
	}
}
