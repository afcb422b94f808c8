// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Bytes per pixel of every scannable format
pub const BYTES_PER_PIXEL: u32 = 4;

/// BT.601 luminance weights in 8.8 fixed point (sum to 256)
pub const LUMA_WEIGHT_R: u32 = 77;
pub const LUMA_WEIGHT_G: u32 = 150;
pub const LUMA_WEIGHT_B: u32 = 29;

/// Name given to the worker thread unless configured otherwise
pub const DEFAULT_THREAD_NAME: &str = "frame-scan";

/// Queue length at which a slow decoder gets logged
///
/// The queue itself is unbounded; this only controls the warning.
pub const DEFAULT_QUEUE_WARN_LEN: usize = 32;

/// Directory under the user config dir holding `config.json`
pub const CONFIG_DIR_NAME: &str = "framescan";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.json";
