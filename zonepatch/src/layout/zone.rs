/// A named region of interest inside a file
///
/// Zones conceptually partition the parts of a file that a format adapter cares about
/// (tag blocks, index tables, header slots). They do not need to cover every byte; the
/// bytes between zones (ex. the audio payload) are never touched by the editor.
///
/// A zone's `offset` and `size` always describe the *current* view of the file. Applying
/// an edit that grows or shrinks an earlier zone moves every later zone, and the registry
/// entries move with them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Zone {
	pub(crate) name: String,
	pub(crate) offset: u64,
	pub(crate) size: u64,
	pub(crate) deletable: bool,
	pub(crate) placeholder: Option<Vec<u8>>,
}

impl Zone {
	/// Returns the name the zone was registered under
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the byte offset of the zone's first byte in the current view of the file
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// Returns the zone's current byte length
	pub fn size(&self) -> u64 {
		self.size
	}

	/// Whether the zone may be removed entirely, rather than only resized
	pub fn deletable(&self) -> bool {
		self.deletable
	}

	/// Returns the template bytes written when the zone is emptied, if any
	///
	/// Formats with fixed-size header slots (ex. a title field padded with zeroes) register
	/// a placeholder so that "removing" the zone blanks the slot instead of collapsing it.
	pub fn placeholder(&self) -> Option<&[u8]> {
		self.placeholder.as_deref()
	}
}
