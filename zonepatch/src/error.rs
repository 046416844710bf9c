//! Contains the errors that can arise within zonepatch
//!
//! The primary error is [`ZonePatchError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.

use crate::layout::FieldWidth;

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, ZonePatchError>`
pub type Result<T> = std::result::Result<T, ZonePatchError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// Adapter related errors
	/// A format adapter rejected the file before the editor was invoked
	///
	/// This arises when a signature/magic-number check fails during the read pass. The
	/// editor itself never produces it; it exists so adapters and the editor share one
	/// error taxonomy.
	FormatMismatch,

	// Registration errors
	/// Attempted to register a zone under a name that is already taken
	///
	/// Re-registering requires an explicit [`FileLayout::remove_zone`](crate::layout::FileLayout::remove_zone)
	/// first; silently replacing the existing zone is never permitted.
	DuplicateZone(String),
	/// A patch operation named a zone that is not registered
	///
	/// This covers both the zone being edited and the target of any registered
	/// position/length reference, all of which are resolved at patch time.
	UnknownZone(String),
	/// Attempted to remove a zone that was registered as non-deletable
	ZoneNotDeletable(String),

	// Patch errors
	/// A recomputed reference value does not fit its declared field width
	FieldOverflow {
		/// Byte offset of the reference field in the file
		location: u64,
		/// The declared width the value had to fit into
		width: FieldWidth,
		/// The value that was to be written
		value: u64,
	},
	/// A zone edit disagrees with the registered zone state
	///
	/// Ex. an `Add` edit for a zone that already occupies file space.
	BadEdit(&'static str),

	// File data related errors
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,

	// Conversions for external errors
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
	/// This should **never** be encountered
	Infallible(std::convert::Infallible),
}

/// Errors that could occur within zonepatch
pub struct ZonePatchError {
	pub(crate) kind: ErrorKind,
}

impl ZonePatchError {
	/// Create a `ZonePatchError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use zonepatch::error::{ErrorKind, ZonePatchError};
	///
	/// let format_mismatch = ZonePatchError::new(ErrorKind::FormatMismatch);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use zonepatch::error::{ErrorKind, ZonePatchError};
	///
	/// let format_mismatch = ZonePatchError::new(ErrorKind::FormatMismatch);
	/// if let ErrorKind::FormatMismatch = format_mismatch.kind() {
	/// 	println!("Not a file we can edit");
	/// }
	/// ```
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl std::error::Error for ZonePatchError {}

impl Debug for ZonePatchError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<std::io::Error> for ZonePatchError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<TryReserveError> for ZonePatchError {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl From<std::convert::Infallible> for ZonePatchError {
	fn from(input: std::convert::Infallible) -> Self {
		Self {
			kind: ErrorKind::Infallible(input),
		}
	}
}

impl Display for ZonePatchError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::FormatMismatch => {
				write!(f, "The file did not match the adapter's expected format")
			},
			ErrorKind::DuplicateZone(ref name) => {
				write!(f, "A zone named \"{name}\" is already registered")
			},
			ErrorKind::UnknownZone(ref name) => {
				write!(f, "No zone named \"{name}\" is registered")
			},
			ErrorKind::ZoneNotDeletable(ref name) => {
				write!(f, "Zone \"{name}\" was registered as non-deletable")
			},
			ErrorKind::FieldOverflow {
				location,
				width,
				value,
			} => write!(
				f,
				"Value {value} does not fit a {width:?} reference field at offset {location}"
			),
			ErrorKind::BadEdit(message) => write!(f, "Invalid zone edit: {message}"),

			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),

			ErrorKind::Infallible(_) => write!(f, "A expected condition was not upheld"),
		}
	}
}
