//! Guided filter (He et al.).
//!
//! Recovers per-window linear coefficients `Q = A * I + B` from a guide
//! image `I` and a filtering target `P`. All statistics are box-filtered
//! means; the `I*I` and `I*P` products go through the box filter's accessor
//! overload so they are never materialized. Intermediates are
//! channel-interleaved float buffers sized `w * h * c` at construction.

use super::box_filter::BoxFilter;
use crate::image::Sample;

pub struct GuidedFilter {
    pub radius: usize,
    pub eps: f32,
    box_filter: BoxFilter,
    mean_i: Vec<f32>,
    mean_p: Vec<f32>,
    corr_i: Vec<f32>,
    corr_ip: Vec<f32>,
    coeff_a: Vec<f32>,
    coeff_b: Vec<f32>,
    mean_a: Vec<f32>,
    mean_b: Vec<f32>,
}

impl GuidedFilter {
    pub fn new(radius: usize, eps: f32, width: usize, height: usize, channels: usize) -> Self {
        let n = height * width * channels;
        Self {
            radius,
            eps,
            box_filter: BoxFilter::new(radius, width, height, channels),
            mean_i: vec![0.0; n],
            mean_p: vec![0.0; n],
            corr_i: vec![0.0; n],
            corr_ip: vec![0.0; n],
            coeff_a: vec![0.0; n],
            coeff_b: vec![0.0; n],
            mean_a: vec![0.0; n],
            mean_b: vec![0.0; n],
        }
    }

    /// `q = boxed(A) * I + boxed(B)`, clamped to `[clamp_lo, clamp_hi]`.
    pub fn invoke<I: Sample, P: Sample, O: Sample>(
        &mut self,
        guide: &[I],
        target: &[P],
        out: &mut [O],
        clamp_lo: f32,
        clamp_hi: f32,
    ) {
        let n = self.mean_i.len();
        debug_assert!(guide.len() >= n && target.len() >= n && out.len() >= n);

        self.box_filter.invoke(guide, &mut self.mean_i);
        self.box_filter.invoke(target, &mut self.mean_p);

        let corr_i = &mut self.corr_i;
        self.box_filter.invoke_with(
            |idx| {
                let v = guide[idx].to_f32();
                v * v
            },
            |idx, val| corr_i[idx] = val,
        );
        let corr_ip = &mut self.corr_ip;
        self.box_filter.invoke_with(
            |idx| guide[idx].to_f32() * target[idx].to_f32(),
            |idx, val| corr_ip[idx] = val,
        );

        for i in 0..n {
            let var_i = self.corr_i[i] - self.mean_i[i] * self.mean_i[i];
            let cov_ip = self.corr_ip[i] - self.mean_i[i] * self.mean_p[i];
            self.coeff_a[i] = cov_ip / (var_i + self.eps);
            self.coeff_b[i] = self.mean_p[i] - self.coeff_a[i] * self.mean_i[i];
        }

        self.box_filter.invoke(&self.coeff_a, &mut self.mean_a);
        self.box_filter.invoke(&self.coeff_b, &mut self.mean_b);

        for i in 0..n {
            let q = self.mean_a[i] * guide[i].to_f32() + self.mean_b[i];
            out[i] = O::from_f32(q.clamp(clamp_lo, clamp_hi));
        }
    }
}
