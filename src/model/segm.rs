//! Selfie segmentation stage.
//!
//! Wraps a segmentation network whose output is a two-channel logits tensor
//! ordered `[bg, fg]` per pixel and reduces it to a binary foreground mask
//! at model resolution. Argmax over the pair suffices; no softmax is run.

use super::InferenceModel;
use crate::error::{Error, Result};

pub struct SelfieSegmentation<M: InferenceModel> {
    model: M,
}

impl<M: InferenceModel> SelfieSegmentation<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    #[inline]
    pub fn model_width(&self) -> usize {
        self.model.input_width()
    }

    #[inline]
    pub fn model_height(&self) -> usize {
        self.model.input_height()
    }

    #[inline]
    pub fn model_pixels(&self) -> usize {
        self.model.input_pixels()
    }

    /// Run the network on a `3 * w * h` float frame and write the binary
    /// mask (`0.0` background, `1.0` foreground) into `output`.
    pub fn invoke(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        let pixels = self.model_pixels();
        if output.len() != pixels {
            return Err(Error::Shape {
                expected: pixels,
                got: output.len(),
            });
        }

        self.model.load_input(input)?;
        self.model.invoke()?;

        let logits = self.model.output(0);
        for (i, mask) in output.iter_mut().enumerate() {
            *mask = if logits[2 * i] < logits[2 * i + 1] {
                1.0
            } else {
                0.0
            };
        }
        Ok(())
    }
}
