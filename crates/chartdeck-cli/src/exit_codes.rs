//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Not found - repository, chart or version does not exist
pub const NOT_FOUND: i32 = 3;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;

/// Data error - unreadable index, config or archive (sysexits.h EX_DATAERR)
pub const DATA_ERROR: i32 = 65;
