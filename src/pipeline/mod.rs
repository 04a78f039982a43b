//! Compositor: the per-frame program turning one captured frame into one
//! rendered frame.
//!
//! Overview
//! - Resizes the captured frame to model resolution, runs selfie
//!   segmentation, feathers the binary mask with a small Gaussian, and
//!   resizes the feathered mask up to output resolution.
//! - Blur mode additionally runs the masked disc-bokeh over the model-scale
//!   frame and upscales the result; image mode substitutes a pre-loaded
//!   background. Either way the final alpha blend is driven by the
//!   feathered mask, so the alpha edge is smoother than the blur edge.
//! - Every intermediate buffer is allocated once at construction and reused
//!   each frame; `invoke` performs no allocation.
//!
//! The scale-by-1/255 / scale-by-255 bracket around the model call restores
//! 0..255 pixel magnitudes before the bokeh pass, which expects them.

pub mod background;

use std::path::Path;
use std::time::Instant;

use log::debug;
use serde::Serialize;

use crate::config::{
    Mode, PipelineConfig, BLUR_FILTER_COMPONENTS, BLUR_FILTER_RADIUS, BLUR_FILTER_TRANSITION,
    EDGE_FILTER_RADIUS, MASK_FILTER_RADIUS,
};
use crate::error::{Error, Result};
use crate::filters::{BokehFilter, GaussianFilter, LaplacianFilter};
use crate::image::{alpha_blend, resize_bilinear, scale_in_place};
use crate::model::{InferenceModel, SelfieSegmentation};

/// Per-stage wall-clock times of one `invoke`, milliseconds.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct FrameTiming {
    pub resize_ms: f64,
    pub inference_ms: f64,
    pub mask_ms: f64,
    pub composite_ms: f64,
    pub total_ms: f64,
}

/// Mode-specific buffers chosen once at construction.
enum Program {
    Blur { blur_s: Vec<u8>, blur_l: Vec<u8> },
    Image { bg_img: Vec<u8> },
}

pub struct Pipeline<M: InferenceModel> {
    inp_width: usize,
    inp_height: usize,
    out_width: usize,
    out_height: usize,

    segm: SelfieSegmentation<M>,
    mask_filter: GaussianFilter,
    edge_filter: LaplacianFilter,
    blur_filter: BokehFilter,

    inp_segm: Vec<f32>,
    out_segm: Vec<f32>,
    mask_s: Vec<f32>,
    mask_l: Vec<f32>,
    program: Program,
}

impl<M: InferenceModel> Pipeline<M> {
    /// Build the pipeline for `cfg` around a loaded segmentation model.
    /// Fails for video mode (`Unsupported`) and for a missing or
    /// undecodable background image in image mode.
    pub fn new(cfg: &PipelineConfig, model: M) -> Result<Self> {
        let segm = SelfieSegmentation::new(model);
        let (model_w, model_h) = (segm.model_width(), segm.model_height());
        let model_pixels = segm.model_pixels();
        let out_pixels = cfg.out_pixels();

        if cfg.inp_pixels() < out_pixels {
            return Err(Error::Config(format!(
                "capture {}x{} is smaller than output {}x{}; the composite samples \
                 the captured frame at output geometry",
                cfg.input.width, cfg.input.height, cfg.output.width, cfg.output.height
            )));
        }

        let program = match cfg.mode {
            Mode::Blur => Program::Blur {
                blur_s: vec![0u8; 3 * model_pixels],
                blur_l: vec![0u8; 3 * out_pixels],
            },
            Mode::Image => Program::Image {
                bg_img: background::load_background(
                    Path::new(&cfg.bg_img),
                    cfg.output.width,
                    cfg.output.height,
                )?,
            },
            Mode::Video => {
                return Err(Error::Unsupported("video mode is not implemented".into()));
            }
        };

        debug!(
            "pipeline: mode={} model={}x{} input={}x{} output={}x{}",
            cfg.mode, model_w, model_h, cfg.input.width, cfg.input.height,
            cfg.output.width, cfg.output.height
        );

        Ok(Self {
            inp_width: cfg.input.width,
            inp_height: cfg.input.height,
            out_width: cfg.output.width,
            out_height: cfg.output.height,
            mask_filter: GaussianFilter::new(MASK_FILTER_RADIUS, model_w, model_h, 1),
            edge_filter: LaplacianFilter::new(EDGE_FILTER_RADIUS, model_w, model_h, 1),
            blur_filter: BokehFilter::new(
                BLUR_FILTER_RADIUS,
                BLUR_FILTER_COMPONENTS,
                BLUR_FILTER_TRANSITION,
                model_w,
                model_h,
                3,
            ),
            segm,
            inp_segm: vec![0.0; 3 * model_pixels],
            out_segm: vec![0.0; model_pixels],
            mask_s: vec![0.0; model_pixels],
            mask_l: vec![0.0; out_pixels],
            program,
        })
    }

    #[inline]
    pub fn model_width(&self) -> usize {
        self.segm.model_width()
    }

    #[inline]
    pub fn model_height(&self) -> usize {
        self.segm.model_height()
    }

    /// Edge detector allocated for the planned edge-aware light-wrap
    /// composite; not part of the live blur/image programs.
    pub fn edge_filter(&self) -> &LaplacianFilter {
        &self.edge_filter
    }

    /// Process one captured RGB frame into one output RGB frame.
    ///
    /// Transparent to errors from the model; no partial frame is produced
    /// on failure. Not re-entrant: all scratch space is pipeline-owned.
    pub fn invoke(&mut self, inp: &[u8], out: &mut [u8]) -> Result<FrameTiming> {
        let expected_in = 3 * self.inp_width * self.inp_height;
        if inp.len() != expected_in {
            return Err(Error::Shape {
                expected: expected_in,
                got: inp.len(),
            });
        }
        let expected_out = 3 * self.out_width * self.out_height;
        if out.len() != expected_out {
            return Err(Error::Shape {
                expected: expected_out,
                got: out.len(),
            });
        }

        let total_start = Instant::now();
        let (model_w, model_h) = (self.model_width(), self.model_height());

        let resize_start = Instant::now();
        resize_bilinear(
            inp,
            &mut self.inp_segm,
            self.inp_width,
            self.inp_height,
            model_w,
            model_h,
            3,
        );
        let resize_ms = elapsed_ms(resize_start);

        let inference_start = Instant::now();
        scale_in_place(&mut self.inp_segm, 1.0 / 255.0, 0.0);
        self.segm.invoke(&self.inp_segm, &mut self.out_segm)?;
        scale_in_place(&mut self.inp_segm, 255.0, 0.0);
        let inference_ms = elapsed_ms(inference_start);

        let mask_start = Instant::now();
        self.mask_filter.invoke(&self.out_segm, &mut self.mask_s);
        resize_bilinear(
            &self.mask_s,
            &mut self.mask_l,
            model_w,
            model_h,
            self.out_width,
            self.out_height,
            1,
        );
        let mask_ms = elapsed_ms(mask_start);

        let composite_start = Instant::now();
        match &mut self.program {
            Program::Blur { blur_s, blur_l } => {
                self.blur_filter.invoke(&self.inp_segm, blur_s, &self.out_segm);
                resize_bilinear(
                    blur_s,
                    blur_l,
                    model_w,
                    model_h,
                    self.out_width,
                    self.out_height,
                    3,
                );
                alpha_blend(
                    inp,
                    blur_l,
                    out,
                    &self.mask_l,
                    self.out_width,
                    self.out_height,
                    3,
                );
            }
            Program::Image { bg_img } => {
                alpha_blend(
                    inp,
                    bg_img,
                    out,
                    &self.mask_l,
                    self.out_width,
                    self.out_height,
                    3,
                );
            }
        }
        let composite_ms = elapsed_ms(composite_start);

        let timing = FrameTiming {
            resize_ms,
            inference_ms,
            mask_ms,
            composite_ms,
            total_ms: elapsed_ms(total_start),
        };
        debug!(
            "frame: resize={:.2}ms inference={:.2}ms mask={:.2}ms composite={:.2}ms total={:.2}ms",
            timing.resize_ms, timing.inference_ms, timing.mask_ms, timing.composite_ms,
            timing.total_ms
        );
        Ok(timing)
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullModel;

    impl InferenceModel for NullModel {
        fn input_width(&self) -> usize {
            16
        }
        fn input_height(&self) -> usize {
            16
        }
        fn load_input(&mut self, _data: &[f32]) -> Result<()> {
            Ok(())
        }
        fn invoke(&mut self) -> Result<()> {
            Ok(())
        }
        fn output(&self, _index: usize) -> &[f32] {
            &[]
        }
    }

    #[test]
    fn video_mode_is_rejected_at_construction() {
        let cfg = PipelineConfig {
            mode: Mode::Video,
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::new(&cfg, NullModel),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn undersized_capture_is_rejected_at_construction() {
        let mut cfg = PipelineConfig::default();
        cfg.input.width = 640;
        cfg.input.height = 480;
        assert!(matches!(
            Pipeline::new(&cfg, NullModel),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn frame_timing_serializes_for_reports() {
        let json = serde_json::to_string(&FrameTiming::default()).unwrap();
        assert!(json.contains("total_ms") && json.contains("inference_ms"));
    }

    #[test]
    fn mismatched_frame_shapes_are_shape_errors() {
        let cfg = PipelineConfig::default();
        let mut pipeline = Pipeline::new(&cfg, NullModel).unwrap();
        let inp = vec![0u8; 3];
        let mut out = vec![0u8; 3 * cfg.out_pixels()];
        assert!(matches!(
            pipeline.invoke(&inp, &mut out),
            Err(Error::Shape { .. })
        ));
    }
}
