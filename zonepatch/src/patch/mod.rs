//! The cascading patch engine
//!
//! Applying an edit that changes a zone's size has consequences far beyond the zone
//! itself: the physical tail of the file moves, the registered offsets of every later
//! zone move with it, pointer and length fields physically relocate, and their stored
//! values go stale. The engine performs all of that bookkeeping in one pass so that a
//! surgically edited file stays byte-accurate without ever being rewritten wholesale.
//!
//! Edits are strictly sequential within a session. Batches are processed in ascending
//! offset order, with every step re-reading up-to-date offsets from the registry, which
//! makes a batch equivalent to applying its edits one at a time.
//!
//! There is no mid-patch cancellation and no rollback: with the default
//! [`ApplyStrategy::InPlace`], an I/O failure can leave the file partially shifted. See
//! [`ApplyStrategy::Buffered`] for the staged alternative.

mod shift;

use crate::config::{ApplyOptions, ApplyStrategy};
use crate::error::{Result, ZonePatchError};
use crate::layout::{FileLayout, LengthTarget, Zone};
use crate::macros::err;
use crate::util::io::{FileLike, Length, Truncate};
use shift::shift_range;

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

/// What an edit does to its zone
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ZoneAction {
	/// Insert content into a zone that previously occupied no file space
	///
	/// The zone must be registered with a size of zero; its offset is the insertion point.
	Add,
	/// Replace the zone's content, growing or shrinking it as needed
	Edit,
	/// Remove the zone's content from the file
	///
	/// For zones registered with a placeholder, the placeholder bytes are written instead
	/// of collapsing the region. Otherwise the zone must be deletable, and its registry
	/// entry survives with a size of zero (a later [`ZoneAction::Add`] can refill it).
	Remove,
}

/// One pending change to a named zone
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ZoneEdit {
	pub(crate) zone: String,
	pub(crate) content: Vec<u8>,
	pub(crate) action: ZoneAction,
}

impl ZoneEdit {
	/// Creates a [`ZoneAction::Add`] edit
	pub fn add(zone: impl Into<String>, content: Vec<u8>) -> Self {
		Self {
			zone: zone.into(),
			content,
			action: ZoneAction::Add,
		}
	}

	/// Creates a [`ZoneAction::Edit`] edit
	pub fn edit(zone: impl Into<String>, content: Vec<u8>) -> Self {
		Self {
			zone: zone.into(),
			content,
			action: ZoneAction::Edit,
		}
	}

	/// Creates a [`ZoneAction::Remove`] edit
	pub fn remove(zone: impl Into<String>) -> Self {
		Self {
			zone: zone.into(),
			content: Vec::new(),
			action: ZoneAction::Remove,
		}
	}

	/// Returns the name of the zone this edit targets
	pub fn zone(&self) -> &str {
		&self.zone
	}

	/// Returns the replacement content
	pub fn content(&self) -> &[u8] {
		&self.content
	}

	/// Returns the [`ZoneAction`]
	pub fn action(&self) -> ZoneAction {
		self.action
	}
}

impl FileLayout {
	/// Applies a single zone edit to `file`
	///
	/// Equivalent to [`FileLayout::apply_edits`] with a one-element batch.
	///
	/// # Errors
	///
	/// See [`FileLayout::apply_edits`].
	pub fn apply_edit<F>(&mut self, file: &mut F, edit: ZoneEdit, options: ApplyOptions) -> Result<()>
	where
		F: FileLike,
		ZonePatchError: From<<F as Truncate>::Error>,
		ZonePatchError: From<<F as Length>::Error>,
	{
		self.apply_edits(file, vec![edit], options)
	}

	/// Applies a batch of zone edits to `file`
	///
	/// The batch is processed in ascending offset order, each edit seeing the offsets left
	/// behind by the previous one, so the result is identical to applying the edits one at
	/// a time. After every structural change the engine rewrites the affected position and
	/// length fields from the updated registry.
	///
	/// Validation happens before the first byte is touched; a rejected batch leaves the
	/// file untouched. Once bytes start moving there is no rollback: an I/O failure under
	/// [`ApplyStrategy::InPlace`] can leave the file partially shifted, and the session
	/// (layout included) must be discarded and the file re-read. [`ApplyStrategy::Buffered`]
	/// narrows that window to the final writeback.
	///
	/// # Errors
	///
	/// * [`ErrorKind::UnknownZone`](crate::error::ErrorKind::UnknownZone) if an edit or a
	///   registered reference targets an unregistered zone
	/// * [`ErrorKind::ZoneNotDeletable`](crate::error::ErrorKind::ZoneNotDeletable) for a
	///   `Remove` on a non-deletable zone without a placeholder
	/// * [`ErrorKind::BadEdit`](crate::error::ErrorKind::BadEdit) if an edit disagrees with
	///   the registered zone state
	/// * [`ErrorKind::FieldOverflow`](crate::error::ErrorKind::FieldOverflow) if a recomputed
	///   reference value no longer fits its declared width
	/// * [`ErrorKind::Io`](crate::error::ErrorKind::Io) on any read/write/truncate failure
	pub fn apply_edits<F>(
		&mut self,
		file: &mut F,
		edits: Vec<ZoneEdit>,
		options: ApplyOptions,
	) -> Result<()>
	where
		F: FileLike,
		ZonePatchError: From<<F as Truncate>::Error>,
		ZonePatchError: From<<F as Length>::Error>,
	{
		validate_batch(self, &edits)?;

		match options.strategy {
			ApplyStrategy::InPlace => apply_in_place(self, file, edits, options),
			ApplyStrategy::Buffered => apply_buffered(self, file, edits, options),
		}
	}

	/// Removes a zone's content from the file
	///
	/// Convenience wrapper around a [`ZoneAction::Remove`] edit.
	///
	/// # Errors
	///
	/// See [`FileLayout::apply_edits`].
	pub fn remove_zone_rewrite<F>(
		&mut self,
		file: &mut F,
		zone: &str,
		options: ApplyOptions,
	) -> Result<()>
	where
		F: FileLike,
		ZonePatchError: From<<F as Truncate>::Error>,
		ZonePatchError: From<<F as Length>::Error>,
	{
		self.apply_edits(file, vec![ZoneEdit::remove(zone)], options)
	}
}

// Everything here must fail before the first destructive step; past this point the only
// remaining failure sources are I/O and field overflow.
fn validate_batch(layout: &FileLayout, edits: &[ZoneEdit]) -> Result<()> {
	for position in layout.positions() {
		if layout.zone(position.target()).is_none() {
			err!(UnknownZone(position.target().to_owned()));
		}
	}

	for length in layout.lengths() {
		match length.target() {
			LengthTarget::Zone(name) => {
				if layout.zone(name).is_none() {
					err!(UnknownZone(name.clone()));
				}
			},
			LengthTarget::Aggregate(names) => {
				for name in names {
					if layout.zone(name).is_none() {
						err!(UnknownZone(name.clone()));
					}
				}
			},
			LengthTarget::FileSize => {},
		}
	}

	for (i, edit) in edits.iter().enumerate() {
		if edits[..i].iter().any(|e| e.zone == edit.zone) {
			err!(BadEdit("a batch may only contain one edit per zone"));
		}

		let Some(zone) = layout.zone(&edit.zone) else {
			err!(UnknownZone(edit.zone.clone()));
		};

		match edit.action {
			ZoneAction::Add if zone.size() != 0 => {
				err!(BadEdit("`Add` edit targets a zone that already occupies file space"));
			},
			ZoneAction::Remove if zone.placeholder().is_none() && !zone.deletable() => {
				err!(ZoneNotDeletable(edit.zone.clone()));
			},
			_ => {},
		}
	}

	Ok(())
}

fn apply_in_place<F>(
	layout: &mut FileLayout,
	file: &mut F,
	mut edits: Vec<ZoneEdit>,
	options: ApplyOptions,
) -> Result<()>
where
	F: FileLike,
	ZonePatchError: From<<F as Truncate>::Error>,
	ZonePatchError: From<<F as Length>::Error>,
{
	// Ascending offsets keep the boundary math of each edit independent of the ones
	// still pending; every zone an edit can move lies strictly after it
	edits.sort_by_key(|e| layout.zone(&e.zone).map_or(u64::MAX, Zone::offset));

	for edit in edits {
		apply_single(layout, file, edit, options)?;
	}

	Ok(())
}

fn apply_buffered<F>(
	layout: &mut FileLayout,
	file: &mut F,
	edits: Vec<ZoneEdit>,
	options: ApplyOptions,
) -> Result<()>
where
	F: FileLike,
	ZonePatchError: From<<F as Truncate>::Error>,
	ZonePatchError: From<<F as Length>::Error>,
{
	file.rewind()?;

	let mut staged = Vec::new();
	file.read_to_end(&mut staged)?;

	let mut staged = Cursor::new(staged);
	apply_in_place(layout, &mut staged, edits, options)?;

	// Only reached once every shift and reference rewrite succeeded
	let staged = staged.into_inner();

	file.rewind()?;
	file.write_all(&staged)?;
	file.truncate(staged.len() as u64)?;

	Ok(())
}

fn apply_single<F>(
	layout: &mut FileLayout,
	file: &mut F,
	edit: ZoneEdit,
	options: ApplyOptions,
) -> Result<()>
where
	F: FileLike,
	ZonePatchError: From<<F as Truncate>::Error>,
	ZonePatchError: From<<F as Length>::Error>,
{
	let ZoneEdit {
		zone: zone_name,
		content,
		action,
	} = edit;

	let (old_offset, old_size, placeholder) = {
		let Some(zone) = layout.zone(&zone_name) else {
			err!(UnknownZone(zone_name));
		};
		(
			zone.offset(),
			zone.size(),
			zone.placeholder().map(<[u8]>::to_vec),
		)
	};

	let new_content = match action {
		ZoneAction::Add | ZoneAction::Edit => content,
		// The "emptied, not removed" path: a placeholder is written verbatim, typically
		// leaving the delta at zero
		ZoneAction::Remove => placeholder.unwrap_or_default(),
	};

	let new_size = new_content.len() as u64;
	let delta = new_size as i64 - old_size as i64;

	// End of the old zone; everything at or after this moves
	let boundary = old_offset + old_size;

	if delta == 0 {
		// No structural change, no propagation. Only the zone's own bytes are touched,
		// reference values cannot have gone stale.
		file.seek(SeekFrom::Start(old_offset))?;
		file.write_all(&new_content)?;
		return Ok(());
	}

	let old_file_len = file.len()?;

	log::debug!(
		"Zone \"{zone_name}\": {old_size} -> {new_size} bytes, shifting tail at {boundary} by \
		 {delta}"
	);

	shift_range(file, boundary, old_file_len, delta, options.shift_buffer_size)?;

	if delta < 0 {
		file.truncate(old_file_len - delta.unsigned_abs())?;
	}

	// Registry propagation has to complete before any reference field is rewritten,
	// since the rewrites below read their values from the registry
	for zone in layout.zones_mut() {
		if zone.name != zone_name && zone.offset >= boundary {
			zone.offset = shifted(zone.offset, delta);
		}
	}

	if let Some(zone) = layout.zone_mut(&zone_name) {
		zone.size = new_size;
	}

	for position in layout.positions_mut() {
		// The pointer field itself physically relocated
		if position.location >= boundary {
			position.location = shifted(position.location, delta);
		}
		// So did the base its value is measured from
		if let Some(base) = position.base {
			if base >= boundary {
				position.base = Some(shifted(base, delta));
			}
		}
	}

	for length in layout.lengths_mut() {
		if length.location >= boundary {
			length.location = shifted(length.location, delta);
		}
	}

	file.seek(SeekFrom::Start(old_offset))?;
	file.write_all(&new_content)?;

	let new_file_len = shifted(old_file_len, delta);
	rewrite_references(layout, file, new_file_len)?;

	Ok(())
}

// Re-derives every reference value from the up-to-date registry and writes it at the
// reference's current location. Values that did not change are rewritten with identical
// bytes, so this stays a superset of the strictly-affected set without altering the file
// beyond it.
fn rewrite_references<F>(layout: &FileLayout, file: &mut F, file_len: u64) -> Result<()>
where
	F: FileLike,
	ZonePatchError: From<<F as Truncate>::Error>,
	ZonePatchError: From<<F as Length>::Error>,
{
	for position in layout.positions() {
		let Some(target) = layout.zone(position.target()) else {
			err!(UnknownZone(position.target().to_owned()));
		};

		let base = position.base().unwrap_or(0);
		let Some(value) = target.offset().checked_sub(base) else {
			err!(BadEdit("position reference base lies beyond its target zone"));
		};

		file.seek(SeekFrom::Start(position.location()))?;
		position
			.width()
			.write_value(file, value, position.endianness(), position.location())?;
	}

	for length in layout.lengths() {
		let measured = match length.target() {
			LengthTarget::Zone(name) => {
				let Some(zone) = layout.zone(name) else {
					err!(UnknownZone(name.clone()));
				};
				zone.size()
			},
			LengthTarget::Aggregate(names) => {
				let mut sum = 0_u64;
				for name in names {
					let Some(zone) = layout.zone(name) else {
						err!(UnknownZone(name.clone()));
					};
					sum += zone.size();
				}
				sum
			},
			LengthTarget::FileSize => file_len,
		};

		let Some(value) = measured.checked_add_signed(length.adjustment()) else {
			err!(BadEdit("length reference adjustment underflows"));
		};

		file.seek(SeekFrom::Start(length.location()))?;
		length
			.width()
			.write_value(file, value, length.endianness(), length.location())?;
	}

	Ok(())
}

fn shifted(offset: u64, delta: i64) -> u64 {
	if delta >= 0 {
		offset + delta as u64
	} else {
		offset - delta.unsigned_abs()
	}
}
