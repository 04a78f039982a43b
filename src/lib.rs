#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod error;
pub mod filters;
pub mod image;
pub mod model;
pub mod pipeline;

// Device-facing modules: Linux/V4L2 only, used by the daemon binary.
pub mod device;
pub mod formats;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::{DeviceConfig, Fourcc, Mode, PipelineConfig};
pub use crate::error::{Error, Result};
pub use crate::image::FrameBuf;
pub use crate::model::InferenceModel;
pub use crate::pipeline::{FrameTiming, Pipeline};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use spotlight::prelude::*;
///
/// # fn example(model: impl InferenceModel) -> Result<()> {
/// let cfg = PipelineConfig::default();
/// let mut pipeline = Pipeline::new(&cfg, model)?;
///
/// let inp = vec![0u8; 3 * cfg.inp_pixels()];
/// let mut out = vec![0u8; 3 * cfg.out_pixels()];
/// let timing = pipeline.invoke(&inp, &mut out)?;
/// println!("frame in {:.3} ms", timing.total_ms);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::config::{Mode, PipelineConfig};
    pub use crate::error::{Error, Result};
    pub use crate::model::InferenceModel;
    pub use crate::pipeline::Pipeline;
}
