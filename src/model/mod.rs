//! Model stages: the inference seam plus the two consumers.
//!
//! Components
//! - `InferenceModel`: synchronous, fixed-shape inference backend trait. The
//!   pipeline never talks to a runtime directly; tests inject scripted
//!   stubs, the daemon injects the TensorFlow Lite backend.
//! - `segm`: selfie segmentation (binary foreground mask from logits).
//! - `face`: UltraFace-style detector with prior decoding, NMS and temporal
//!   stabilization.
//! - `tflite` (feature `tflite`): backend built on the TensorFlow Lite C
//!   API.

pub mod face;
pub mod segm;
#[cfg(feature = "tflite")]
pub mod tflite;

pub use self::face::{Detection, FaceDetection, FaceOptions, FramePad, Prior};
pub use self::segm::SelfieSegmentation;
#[cfg(feature = "tflite")]
pub use self::tflite::TfliteModel;

use crate::error::Result;

/// A loaded neural network with one float input tensor of shape
/// `(1, height, width, 3)` and indexed float output tensors.
///
/// `invoke` is synchronous and may be called once per frame; output slices
/// stay valid until the next `invoke`.
pub trait InferenceModel {
    /// Width of the input tensor in pixels.
    fn input_width(&self) -> usize;

    /// Height of the input tensor in pixels.
    fn input_height(&self) -> usize;

    /// Pixel count of the input tensor.
    fn input_pixels(&self) -> usize {
        self.input_width() * self.input_height()
    }

    /// Copy `3 * w * h` interleaved floats into the input tensor.
    fn load_input(&mut self, data: &[f32]) -> Result<()>;

    /// Run the network.
    fn invoke(&mut self) -> Result<()>;

    /// Output tensor `index` as a flat float slice.
    fn output(&self, index: usize) -> &[f32];
}
