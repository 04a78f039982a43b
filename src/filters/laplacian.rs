//! 3x3 Laplacian edge filter with a constant integer kernel.

use crate::image::{reflect, Sample};

const KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
const RADIUS: isize = 1;

pub struct LaplacianFilter {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl LaplacianFilter {
    /// The kernel is fixed at 3x3; `_radius` is accepted for signature parity
    /// with the other filters.
    pub fn new(_radius: usize, width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Edge response clamped to `[0, 1]`.
    pub fn invoke<I: Sample, O: Sample>(&self, inp: &[I], out: &mut [O]) {
        self.invoke_clamped(inp, out, 0.0, 1.0);
    }

    pub fn invoke_clamped<I: Sample, O: Sample>(
        &self,
        inp: &[I],
        out: &mut [O],
        clamp_lo: f32,
        clamp_hi: f32,
    ) {
        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    let mut k_idx = 0usize;
                    let mut sum = 0.0f32;
                    for yk in -RADIUS..=RADIUS {
                        let yi = reflect(y as isize + yk, self.height);
                        for xk in -RADIUS..=RADIUS {
                            let xi = reflect(x as isize + xk, self.width);
                            sum += KERNEL[k_idx]
                                * inp[(yi * self.width + xi) * self.channels + c].to_f32();
                            k_idx += 1;
                        }
                    }
                    out[idx] = O::from_f32(sum.clamp(clamp_lo, clamp_hi));
                    idx += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_regions_produce_zero_response() {
        let filter = LaplacianFilter::new(3, 6, 6, 1);
        let inp = vec![0.5f32; 36];
        let mut out = vec![1.0f32; 36];
        filter.invoke(&inp, &mut out);
        for &v in &out {
            assert!(v.abs() < 1e-6, "got {v}");
        }
    }

    #[test]
    fn isolated_peak_is_amplified_and_clamped() {
        let filter = LaplacianFilter::new(3, 5, 5, 1);
        let mut inp = vec![0f32; 25];
        inp[12] = 1.0;
        let mut out = vec![0f32; 25];
        filter.invoke(&inp, &mut out);
        // centre: 8 * 1.0 clamped to the [0, 1] default
        assert!((out[12] - 1.0).abs() < 1e-6);
        // direct neighbours go negative and clamp to 0
        assert_eq!(out[11], 0.0);
        assert_eq!(out[7], 0.0);
    }

    #[test]
    fn custom_clamp_bounds_are_honoured() {
        let filter = LaplacianFilter::new(3, 5, 5, 1);
        let mut inp = vec![0f32; 25];
        inp[12] = 1.0;
        let mut out = vec![0f32; 25];
        filter.invoke_clamped(&inp, &mut out, -8.0, 8.0);
        assert!((out[12] - 8.0).abs() < 1e-6);
        assert!((out[11] + 1.0).abs() < 1e-6);
    }
}
