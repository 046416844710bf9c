//! Various options to control how zonepatch applies edits

mod apply_options;

pub use apply_options::{ApplyOptions, ApplyStrategy};
