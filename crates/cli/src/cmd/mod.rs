mod list;
mod sync;

pub use list::cmd_list;
pub use sync::cmd_sync;

/// Process exit codes, one per failure class.
pub mod exit {
  pub const SUCCESS: u8 = 0;
  /// Unexpected error (unreadable config file, I/O failure).
  pub const FAILURE: u8 = 1;
  /// Missing prebuild directory or unknown variant.
  pub const CONFIG: u8 = 2;
  /// `cargo clean` or `cargo build` failed.
  pub const TOOLCHAIN: u8 = 3;
  /// The build's output directory could not be found.
  pub const DISCOVERY: u8 = 4;
  /// Finished, but some variant received no artifacts.
  pub const PARTIAL: u8 = 5;
}
