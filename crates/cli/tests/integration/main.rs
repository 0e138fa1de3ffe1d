mod common;
mod list_tests;
#[cfg(unix)]
mod sync_tests;
