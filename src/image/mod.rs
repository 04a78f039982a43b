//! Image module: owned frame buffers and the per-frame pixel primitives.
//!
//! Components
//! - `frame`: owned `FrameBuf<T>` buffer for interleaved `(w, h, c)` frames
//!   and the `Sample` element trait (u8 / f32 polymorphism).
//! - `ops`: elementwise scale, RGB⇄gray, nearest/bilinear resize, alpha
//!   blend, light wrap, and the shared edge-reflect index helper.
//!
//! Design goals
//! - Keep hot loops simple and cache-friendly: row-major, pixel-interleaved,
//!   stride implicit (`channels * width` elements per row).
//! - All buffers are sized once at construction; no primitive reallocates.

pub mod frame;
pub mod ops;

pub use self::frame::{FrameBuf, Sample};
pub use self::ops::{
    alpha_blend, gray_to_rgb, light_wrap, reflect, resize_bilinear, resize_nn, rgb_to_gray, scale,
    scale_in_place,
};
