// SPDX-License-Identifier: GPL-3.0-only

//! Frame types and pixel conversion
//!
//! - [`frame`]: frames as delivered by capture pipelines
//! - [`conversions`]: validation and luminance conversion for decoders

pub mod conversions;
pub mod frame;

pub use conversions::{LumaImage, TaggedBuffer, convert};
pub use frame::{FrameData, PixelFormat, VideoFrame};
