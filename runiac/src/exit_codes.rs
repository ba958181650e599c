//! Stable exit codes for runiac CLI commands.

/// Deploy completed, or nothing to do (uninitialized project, `--test`).
pub const OK: i32 = 0;
/// Invalid config, identity failure, or other errors.
pub const INVALID: i32 = 1;
/// The image build failed or could not start.
pub const BUILD_FAILED: i32 = 3;
/// The deploy container could not start or was killed by a signal.
///
/// A container that exits non-zero on its own propagates its exit code.
pub const RUN_FAILED: i32 = 4;
