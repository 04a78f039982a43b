//! Scripted inference backend for pipeline tests.
//!
//! Emits a fixed `[bg, fg]` logits tensor regardless of the input, so tests
//! can force the segmentation mask pixel by pixel.

use spotlight::error::Result;
use spotlight::model::InferenceModel;

pub struct ScriptedModel {
    width: usize,
    height: usize,
    logits: Vec<f32>,
}

impl ScriptedModel {
    /// Model whose mask is `foreground` at every pixel.
    pub fn uniform(width: usize, height: usize, foreground: bool) -> Self {
        let mask = vec![foreground; width * height];
        Self::from_mask(width, height, &mask)
    }

    /// Model that reproduces the given per-pixel mask.
    pub fn from_mask(width: usize, height: usize, mask: &[bool]) -> Self {
        assert_eq!(mask.len(), width * height);
        let mut logits = Vec::with_capacity(2 * mask.len());
        for &fg in mask {
            // decisive margins either way
            if fg {
                logits.extend_from_slice(&[-4.0, 4.0]);
            } else {
                logits.extend_from_slice(&[4.0, -4.0]);
            }
        }
        Self {
            width,
            height,
            logits,
        }
    }
}

impl InferenceModel for ScriptedModel {
    fn input_width(&self) -> usize {
        self.width
    }

    fn input_height(&self) -> usize {
        self.height
    }

    fn load_input(&mut self, data: &[f32]) -> Result<()> {
        assert_eq!(data.len(), 3 * self.input_pixels());
        Ok(())
    }

    fn invoke(&mut self) -> Result<()> {
        Ok(())
    }

    fn output(&self, index: usize) -> &[f32] {
        assert_eq!(index, 0, "segmentation model has a single output");
        &self.logits
    }
}
