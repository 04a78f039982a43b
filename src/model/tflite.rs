//! TensorFlow Lite inference backend (feature `tflite`).
//!
//! Thin adapter from the `tflitec` interpreter to [`InferenceModel`]. Output
//! tensors are copied into owned buffers after each invoke so the trait can
//! hand out plain slices without tying callers to interpreter internals.

use std::path::Path;

use tflitec::interpreter::{Interpreter, Options};

use super::InferenceModel;
use crate::error::{Error, Result};

pub struct TfliteModel {
    interpreter: Interpreter,
    width: usize,
    height: usize,
    outputs: Vec<Vec<f32>>,
}

impl TfliteModel {
    /// Load a `.tflite` flatbuffer and allocate its tensors. `num_threads`
    /// is forwarded to the interpreter as an internal parallelism hint.
    pub fn open(path: &Path, num_threads: usize) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::Resource(format!("non-UTF-8 model path: {}", path.display())))?;

        let options = Options {
            thread_count: num_threads as i32,
            ..Default::default()
        };
        let interpreter = Interpreter::with_model_path(path_str, Some(options))
            .map_err(|e| Error::Resource(format!("failed to load model {path_str}: {e}")))?;
        interpreter
            .allocate_tensors()
            .map_err(|e| Error::Resource(format!("failed to allocate tensors for {path_str}: {e}")))?;

        let input = interpreter
            .input(0)
            .map_err(|e| Error::Resource(format!("missing input tensor in {path_str}: {e}")))?;
        let dims = input.shape().dimensions().clone();
        // NHWC input: [1, height, width, 3]
        if dims.len() != 4 || dims[3] != 3 {
            return Err(Error::Resource(format!(
                "unexpected input shape {dims:?} in {path_str}"
            )));
        }
        let (height, width) = (dims[1], dims[2]);

        let outputs = vec![Vec::new(); interpreter.output_tensor_count()];
        Ok(Self {
            interpreter,
            width,
            height,
            outputs,
        })
    }
}

impl InferenceModel for TfliteModel {
    fn input_width(&self) -> usize {
        self.width
    }

    fn input_height(&self) -> usize {
        self.height
    }

    fn load_input(&mut self, data: &[f32]) -> Result<()> {
        let expected = 3 * self.input_pixels();
        if data.len() != expected {
            return Err(Error::Shape {
                expected,
                got: data.len(),
            });
        }
        self.interpreter
            .copy(data, 0)
            .map_err(|e| Error::Resource(format!("failed to set input tensor: {e}")))
    }

    fn invoke(&mut self) -> Result<()> {
        self.interpreter
            .invoke()
            .map_err(|e| Error::Resource(format!("inference failed: {e}")))?;

        for (i, out) in self.outputs.iter_mut().enumerate() {
            let tensor = self
                .interpreter
                .output(i)
                .map_err(|e| Error::Resource(format!("missing output tensor {i}: {e}")))?;
            let data = tensor.data::<f32>();
            out.clear();
            out.extend_from_slice(data);
        }
        Ok(())
    }

    fn output(&self, index: usize) -> &[f32] {
        &self.outputs[index]
    }
}
