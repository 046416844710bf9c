//! Bounded, overlap-safe relocation of byte ranges within a stream

use crate::error::Result;
use crate::macros::{err, try_vec};

use std::io::{Read, Seek, SeekFrom, Write};

/// Moves the bytes `[src_start, src_end)` to `[src_start + delta, src_end + delta)`.
///
/// Copying is chunked through a buffer of at most `buf_len` bytes, so arbitrarily large
/// files never get loaded into memory. Source and destination ranges may overlap:
///
/// * `delta > 0` copies from the end of the range backward, so a chunk is always read
///   before the grown range overwrites it.
/// * `delta < 0` copies from the start of the range forward, for the symmetric reason.
///
/// Getting this direction wrong corrupts every shift where `|delta|` is smaller than the
/// range length, which is the normal case for tag edits. The stream is not resized here;
/// the caller truncates after a backward shift, and a forward shift past the end of the
/// stream extends it as a plain write would.
pub(crate) fn shift_range<F>(
	file: &mut F,
	src_start: u64,
	src_end: u64,
	delta: i64,
	buf_len: usize,
) -> Result<()>
where
	F: Read + Write + Seek,
{
	if delta == 0 || src_start >= src_end {
		return Ok(());
	}

	if delta < 0 && delta.unsigned_abs() > src_start {
		err!(BadEdit("shift would move bytes before the start of the file"));
	}

	let range_len = src_end - src_start;
	let buf_len = std::cmp::min(buf_len as u64, range_len) as usize;
	let mut buf = try_vec![0_u8; buf_len];

	let mut remaining = range_len;
	while remaining > 0 {
		let chunk_len = std::cmp::min(remaining, buf.len() as u64);

		let read_pos = if delta > 0 {
			// Backward: take the chunk closest to the end that we haven't moved yet
			src_start + remaining - chunk_len
		} else {
			// Forward: take the chunk closest to the start that we haven't moved yet
			src_end - remaining
		};
		// Guarded above: a negative delta never reaches past the start of the file
		let write_pos = if delta > 0 {
			read_pos + delta as u64
		} else {
			read_pos - delta.unsigned_abs()
		};

		let chunk = &mut buf[..chunk_len as usize];

		file.seek(SeekFrom::Start(read_pos))?;
		file.read_exact(chunk)?;

		file.seek(SeekFrom::Start(write_pos))?;
		file.write_all(chunk)?;

		remaining -= chunk_len;
	}

	Ok(())
}
