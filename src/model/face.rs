//! Face detection stage (UltraFace-style single-shot detector).
//!
//! Priors are generated once from a fixed multi-scale schedule; each frame
//! decodes box regressions against them, suppresses overlaps, and feeds the
//! survivor nearest to the tracked face frame into an EMA stabilizer with a
//! jerk dead-band. Not wired into the live composite; used for
//! auto-framing experiments.

use std::cmp::Ordering;

use serde::Serialize;

use super::InferenceModel;
use crate::error::Result;

const CENTER_VARIANCE: f32 = 0.1;
const SIZE_VARIANCE: f32 = 0.2;
const STRIDES: [f32; 4] = [8.0, 16.0, 32.0, 64.0];
const MIN_BOXES: [&[f32]; 4] = [
    &[10.0, 16.0, 24.0],
    &[32.0, 48.0],
    &[64.0, 96.0],
    &[128.0, 192.0, 256.0],
];

/// Anchor box in normalized `[0, 1]` coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prior {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn dist_sq(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Detection rectangle in model-pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
}

impl Detection {
    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point {
            x: (self.x1 + self.x2) * 0.5,
            y: (self.y1 + self.y2) * 0.5,
        }
    }

    pub fn iou(&self, other: &Detection) -> f32 {
        let xx1 = self.x1.max(other.x1);
        let yy1 = self.y1.max(other.y1);
        let xx2 = self.x2.min(other.x2);
        let yy2 = self.y2.min(other.y2);

        let w = (xx2 - xx1).max(0.0);
        let h = (yy2 - yy1).max(0.0);
        if w <= 0.0 || h <= 0.0 {
            return 0.0;
        }

        let inter = w * h;
        inter / (self.area() + other.area() - inter + 1e-6)
    }

    /// EMA update towards `d`, skipped entirely while the motion metric
    /// stays below `tolerance` (dead-band against low-amplitude jitter).
    pub fn stabilize(&mut self, d: &Detection, alpha: f32, tolerance: f32) {
        let dx = (self.x1 - d.x1).abs() + (self.x2 - d.x2).abs();
        let dy = (self.y1 - d.y1).abs() + (self.y2 - d.y2).abs();

        let motion = dx / self.width() + dy / self.height();
        if motion < tolerance {
            return;
        }

        let beta = 1.0 - alpha;
        self.x1 = alpha * self.x1 + beta * d.x1;
        self.x2 = alpha * self.x2 + beta * d.x2;
        self.y1 = alpha * self.y1 + beta * d.y1;
        self.y2 = alpha * self.y2 + beta * d.y2;
    }

    /// Grow the rectangle around its centre until it matches `aspect_ratio`.
    pub fn frame(&mut self, aspect_ratio: f32) {
        let c = self.center();
        let w0 = self.width();
        let h0 = self.height();
        let w = w0.max(h0 * aspect_ratio);
        let h = h0.max(w0 / aspect_ratio);

        self.x1 = c.x - 0.5 * w;
        self.y1 = c.y - 0.5 * h;
        self.x2 = c.x + 0.5 * w;
        self.y2 = c.y + 0.5 * h;
    }

    /// Pad each side by a fraction of the current width/height.
    pub fn pad(&mut self, left: f32, right: f32, top: f32, bottom: f32) {
        let w = self.width();
        let h = self.height();

        self.x1 -= w * left;
        self.y1 -= h * top;
        self.x2 += w * right;
        self.y2 += h * bottom;
    }

    pub fn scale(&mut self, factor_w: f32, factor_h: f32) {
        self.x1 *= factor_w;
        self.y1 *= factor_h;
        self.x2 *= factor_w;
        self.y2 *= factor_h;
    }

    pub fn clamp(&mut self, width: usize, height: usize) {
        let w = width as f32 - 1.0;
        let h = height as f32 - 1.0;
        self.x1 = self.x1.clamp(0.0, w);
        self.y1 = self.y1.clamp(0.0, h);
        self.x2 = self.x2.clamp(0.0, w);
        self.y2 = self.y2.clamp(0.0, h);
    }
}

/// Fractional padding applied around a tracked face, per side.
#[derive(Clone, Copy, Debug)]
pub struct FramePad {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for FramePad {
    fn default() -> Self {
        Self {
            up: 0.5,
            down: 0.25,
            left: 0.5,
            right: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FaceOptions {
    /// Survivors kept per frame before suppression.
    pub top_k: usize,
    pub score_threshold: f32,
    pub iou_threshold: f32,
    /// EMA weight of the previous face frame.
    pub temporal_alpha: f32,
    /// Dead-band threshold on the normalized motion metric.
    pub jerk_tolerance: f32,
    pub pad: FramePad,
}

impl Default for FaceOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            score_threshold: 0.8,
            iou_threshold: 0.2,
            temporal_alpha: 0.9,
            jerk_tolerance: 0.3,
            pad: FramePad::default(),
        }
    }
}

/// Generate the fixed prior schedule for a `(width, height)` model input:
/// per stride a `ceil(w/s) x ceil(h/s)` feature map, the listed box sizes at
/// every cell, emitted stride-outer, y-outer, x-inner, box-inner.
pub fn generate_priors(width: usize, height: usize) -> Vec<Prior> {
    let inv_w = 1.0 / width as f32;
    let inv_h = 1.0 / height as f32;

    let mut priors = Vec::new();
    for (s, &stride) in STRIDES.iter().enumerate() {
        let fm_w = (width as f32 / stride).ceil() as usize;
        let fm_h = (height as f32 / stride).ceil() as usize;

        let cx_scale = stride * inv_w;
        let cy_scale = stride * inv_h;
        for y in 0..fm_h {
            let cy = (y as f32 + 0.5) * cy_scale;
            for x in 0..fm_w {
                let cx = (x as f32 + 0.5) * cx_scale;
                for &bbox in MIN_BOXES[s] {
                    priors.push(Prior {
                        cx,
                        cy,
                        w: bbox * inv_w,
                        h: bbox * inv_h,
                    });
                }
            }
        }
    }
    priors
}

pub struct FaceDetection<M: InferenceModel> {
    opts: FaceOptions,
    model: M,
    priors: Vec<Prior>,
    selections: Vec<bool>,
    detections: Vec<Detection>,
    face_frame: Detection,
}

impl<M: InferenceModel> FaceDetection<M> {
    pub fn new(opts: FaceOptions, model: M) -> Self {
        let priors = generate_priors(model.input_width(), model.input_height());
        let face_frame = Detection {
            x1: 0.0,
            y1: 0.0,
            x2: model.input_width() as f32,
            y2: model.input_height() as f32,
            score: 0.0,
        };
        let n = priors.len();
        Self {
            opts,
            model,
            priors,
            selections: vec![true; n],
            detections: vec![Detection::default(); n],
            face_frame,
        }
    }

    #[inline]
    pub fn model_width(&self) -> usize {
        self.model.input_width()
    }

    #[inline]
    pub fn model_height(&self) -> usize {
        self.model.input_height()
    }

    pub fn priors(&self) -> &[Prior] {
        &self.priors
    }

    /// Run the detector on a `3 * w * h` float frame and return the
    /// stabilized face frame.
    pub fn invoke(&mut self, input: &[f32]) -> Result<Detection> {
        self.model.load_input(input)?;
        self.model.invoke()?;
        Ok(self.post_process())
    }

    fn post_process(&mut self) -> Detection {
        let count = self.decode_detections();
        let kept = self.non_max_suppression(count);

        let frame_center = self.face_frame.center();
        let mut min_idx = None;
        let mut min_dist = f32::INFINITY;
        for i in 0..kept {
            if !self.selections[i] {
                continue;
            }
            let dist = frame_center.dist_sq(&self.detections[i].center());
            if dist < min_dist {
                min_dist = dist;
                min_idx = Some(i);
            }
        }

        if let Some(i) = min_idx {
            let candidate = self.detections[i];
            self.face_frame.stabilize(
                &candidate,
                self.opts.temporal_alpha,
                self.opts.jerk_tolerance,
            );
        }

        self.face_frame
    }

    /// Decode every prior whose foreground score clears the threshold into
    /// corner coordinates at model-pixel scale. Returns the survivor count.
    fn decode_detections(&mut self) -> usize {
        let model_w = self.model.input_width() as f32;
        let model_h = self.model.input_height() as f32;
        let scores = self.model.output(0);
        let boxes = self.model.output(1);

        let mut count = 0usize;
        for (i, p) in self.priors.iter().enumerate() {
            let score = scores[2 * i + 1];
            if score < self.opts.score_threshold {
                continue;
            }

            let cx = boxes[4 * i] * CENTER_VARIANCE * p.w + p.cx;
            let cy = boxes[4 * i + 1] * CENTER_VARIANCE * p.h + p.cy;
            let w = (boxes[4 * i + 2] * SIZE_VARIANCE).exp() * p.w;
            let h = (boxes[4 * i + 3] * SIZE_VARIANCE).exp() * p.h;

            self.detections[count] = Detection {
                x1: (cx - w * 0.5) * model_w,
                y1: (cy - h * 0.5) * model_h,
                x2: (cx + w * 0.5) * model_w,
                y2: (cy + h * 0.5) * model_h,
                score,
            };
            count += 1;
        }
        count
    }

    /// Greedy suppression in score-descending order. With more than `top_k`
    /// survivors the top block is partition-selected first so only `top_k`
    /// candidates are fully sorted.
    fn non_max_suppression(&mut self, mut n: usize) -> usize {
        let top_k = self.opts.top_k;
        let by_score_desc = |a: &Detection, b: &Detection| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
        };

        if n > top_k {
            self.detections[..n].select_nth_unstable_by(top_k, by_score_desc);
            n = top_k;
        }
        self.detections[..n].sort_unstable_by(by_score_desc);

        self.selections[..n].fill(true);
        for i in 0..n {
            if !self.selections[i] {
                continue;
            }
            for j in (i + 1)..n {
                if self.selections[j]
                    && self.detections[i].iou(&self.detections[j]) > self.opts.iou_threshold
                {
                    self.selections[j] = false;
                }
            }
        }
        n
    }
}
