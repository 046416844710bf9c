/// How an edit reaches the bytes of the target stream
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum ApplyStrategy {
	/// Mutate the target stream directly
	///
	/// This is the reference behavior: the tail of the file is relocated in place, with no
	/// staging copy. It touches the fewest bytes, but an I/O failure mid-patch leaves the
	/// file in a partially shifted, inconsistent state. Callers accepting that trade-off
	/// get edits that never need more memory than the shift buffer.
	#[default]
	InPlace,
	/// Stage the whole stream into memory first
	///
	/// The patch is applied to an in-memory copy, and the target stream is only rewritten
	/// once every shift and reference update has succeeded. This removes the mid-patch
	/// corruption window at the cost of holding the entire file in memory; the remaining
	/// window is the final writeback itself.
	Buffered,
}

/// Options to control how zonepatch applies edits to a file
///
/// # Examples
///
/// ```rust
/// use zonepatch::config::{ApplyOptions, ApplyStrategy};
///
/// // I'd rather pay for a staging copy than risk a torn file
/// let options = ApplyOptions::new().strategy(ApplyStrategy::Buffered);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ApplyOptions {
	pub(crate) strategy: ApplyStrategy,
	pub(crate) shift_buffer_size: usize,
}

impl ApplyOptions {
	/// Default size in bytes of the bounded copy buffer used when relocating file tails
	pub const DEFAULT_SHIFT_BUFFER_SIZE: usize = 64 * 1024;

	/// Creates a new `ApplyOptions`, alias for `Default` implementation
	///
	/// See also: [`ApplyOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use zonepatch::config::ApplyOptions;
	///
	/// let options = ApplyOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			strategy: ApplyStrategy::InPlace,
			shift_buffer_size: Self::DEFAULT_SHIFT_BUFFER_SIZE,
		}
	}

	/// Set the [`ApplyStrategy`]
	///
	/// # Examples
	///
	/// ```rust
	/// use zonepatch::config::{ApplyOptions, ApplyStrategy};
	///
	/// let options = ApplyOptions::new().strategy(ApplyStrategy::Buffered);
	/// ```
	pub fn strategy(mut self, strategy: ApplyStrategy) -> Self {
		self.strategy = strategy;
		self
	}

	/// Set the size of the copy buffer used to relocate file tails
	///
	/// Relocation never allocates more than this, no matter how large the file is. Values
	/// below 1 are clamped to 1.
	///
	/// # Examples
	///
	/// ```rust
	/// use zonepatch::config::ApplyOptions;
	///
	/// // Tiny buffer, many more read/write round trips
	/// let options = ApplyOptions::new().shift_buffer_size(512);
	/// ```
	pub fn shift_buffer_size(mut self, shift_buffer_size: usize) -> Self {
		self.shift_buffer_size = shift_buffer_size.max(1);
		self
	}
}

impl Default for ApplyOptions {
	/// The default implementation for `ApplyOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ApplyOptions {
	///     strategy: ApplyStrategy::InPlace,
	///     shift_buffer_size: 65536,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
