//! The per-session map of a file's internal structure
//!
//! A [`FileLayout`] is populated by a format adapter during its read pass: every region
//! that may later be edited is registered as a [`Zone`], and every field that stores a
//! zone's offset or length is registered as a [`PositionReference`] or [`LengthReference`].
//! The write pass then goes through [`FileLayout::apply_edit`](crate::layout::FileLayout::apply_edit)
//! and friends, which keep the registered structure and the file bytes consistent with
//! each other.
//!
//! One `FileLayout` maps exactly one open file, for the duration of one editing session.
//! Sessions are never shared or persisted; re-reading a file starts from [`FileLayout::clear`]
//! or a fresh instance.

mod reference;
mod zone;

pub use reference::{Endianness, FieldWidth, LengthReference, LengthTarget, PositionReference};
pub use zone::Zone;

use crate::error::Result;
use crate::macros::err;

/// The zone and reference registries for one file-editing session
///
/// # Examples
///
/// ```rust
/// use zonepatch::layout::{Endianness, FieldWidth, FileLayout};
///
/// # fn main() -> zonepatch::error::Result<()> {
/// let mut layout = FileLayout::new();
///
/// // An adapter would register these while parsing
/// layout.add_zone("tag", 12, 128, true)?;
/// layout.add_size(4, "tag", 0, FieldWidth::U32, Endianness::Little);
///
/// assert_eq!(layout.zone("tag").unwrap().size(), 128);
/// # Ok(()) }
/// ```
#[derive(Clone, Debug, Default)]
pub struct FileLayout {
	zones: Vec<Zone>,
	positions: Vec<PositionReference>,
	lengths: Vec<LengthReference>,
}

impl FileLayout {
	/// Creates an empty layout
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a zone
	///
	/// Zones may be registered in any order the adapter discovers them in; nothing requires
	/// top-down parsing.
	///
	/// # Errors
	///
	/// * [`ErrorKind::DuplicateZone`](crate::error::ErrorKind::DuplicateZone) if a zone with
	///   this name is already registered. Call [`FileLayout::remove_zone`] first to replace one.
	pub fn add_zone(
		&mut self,
		name: impl Into<String>,
		offset: u64,
		size: u64,
		deletable: bool,
	) -> Result<()> {
		self.insert_zone(Zone {
			name: name.into(),
			offset,
			size,
			deletable,
			placeholder: None,
		})
	}

	/// Registers a zone with placeholder content
	///
	/// A zone with a placeholder is emptied rather than removed: a `Remove` edit writes the
	/// placeholder bytes verbatim instead of collapsing the region. This serves formats
	/// with fixed-size header slots that must survive tag deletion.
	///
	/// # Errors
	///
	/// Same as [`FileLayout::add_zone`].
	pub fn add_zone_with_placeholder(
		&mut self,
		name: impl Into<String>,
		offset: u64,
		size: u64,
		deletable: bool,
		placeholder: Vec<u8>,
	) -> Result<()> {
		self.insert_zone(Zone {
			name: name.into(),
			offset,
			size,
			deletable,
			placeholder: Some(placeholder),
		})
	}

	fn insert_zone(&mut self, zone: Zone) -> Result<()> {
		if self.zones.iter().any(|z| z.name == zone.name) {
			err!(DuplicateZone(zone.name));
		}

		self.zones.push(zone);
		Ok(())
	}

	/// Returns the zone registered under `name`, if any
	pub fn zone(&self, name: &str) -> Option<&Zone> {
		self.zones.iter().find(|z| z.name == name)
	}

	pub(crate) fn zone_mut(&mut self, name: &str) -> Option<&mut Zone> {
		self.zones.iter_mut().find(|z| z.name == name)
	}

	/// Removes the zone registered under `name` from the registry
	///
	/// This only affects the registry; it does not touch the file. Returns whether a zone
	/// was actually removed. References targeting the removed zone are left in place and
	/// will fail the next patch unless the zone is re-registered.
	pub fn remove_zone(&mut self, name: &str) -> bool {
		let before = self.zones.len();
		self.zones.retain(|z| z.name != name);
		before != self.zones.len()
	}

	/// Empties both registries
	///
	/// Used when resetting a session, ex. before re-reading a file.
	pub fn clear(&mut self) {
		self.zones.clear();
		self.positions.clear();
		self.lengths.clear();
	}

	/// Registers a field at `location` storing the absolute offset of `target`
	///
	/// The target zone does not need to be registered yet; chunked formats frequently
	/// discover a pointer before the region it points into. Existence of the target is
	/// checked at patch time, not here.
	pub fn add_position(
		&mut self,
		location: u64,
		target: impl Into<String>,
		width: FieldWidth,
		endianness: Endianness,
	) {
		self.positions.push(PositionReference {
			location,
			target: target.into(),
			base: None,
			width,
			endianness,
		});
	}

	/// Registers a field at `location` storing the offset of `target` relative to `base`
	///
	/// `base` is an absolute file offset; the stored value is `target.offset - base`.
	/// Like the location, the base moves with the file bytes if it lies after a shift
	/// boundary.
	pub fn add_index(
		&mut self,
		location: u64,
		target: impl Into<String>,
		base: u64,
		width: FieldWidth,
		endianness: Endianness,
	) {
		self.positions.push(PositionReference {
			location,
			target: target.into(),
			base: Some(base),
			width,
			endianness,
		});
	}

	/// Registers a field at `location` storing the byte length of `target`
	///
	/// `adjustment` is added to the measured size before writing, covering the common
	/// "size excluding header"/"size including footer" conventions. The target accepts
	/// a zone name directly; see [`LengthTarget`] for aggregates and whole-file lengths.
	pub fn add_size(
		&mut self,
		location: u64,
		target: impl Into<LengthTarget>,
		adjustment: i64,
		width: FieldWidth,
		endianness: Endianness,
	) {
		self.lengths.push(LengthReference {
			location,
			target: target.into(),
			adjustment,
			width,
			endianness,
		});
	}

	/// Returns every registered zone, in registration order
	pub fn zones(&self) -> &[Zone] {
		&self.zones
	}

	/// Returns every registered position reference, in registration order
	pub fn positions(&self) -> &[PositionReference] {
		&self.positions
	}

	/// Returns every registered length reference, in registration order
	pub fn lengths(&self) -> &[LengthReference] {
		&self.lengths
	}

	pub(crate) fn zones_mut(&mut self) -> &mut [Zone] {
		&mut self.zones
	}

	pub(crate) fn positions_mut(&mut self) -> &mut [PositionReference] {
		&mut self.positions
	}

	pub(crate) fn lengths_mut(&mut self) -> &mut [LengthReference] {
		&mut self.lengths
	}
}

impl From<&str> for LengthTarget {
	fn from(name: &str) -> Self {
		LengthTarget::Zone(name.to_owned())
	}
}

impl From<String> for LengthTarget {
	fn from(name: String) -> Self {
		LengthTarget::Zone(name)
	}
}
