//! Laplacian-of-Gaussian filter.
//!
//! The 2-D kernel is evaluated once at construction and shifted to zero mean
//! so flat regions produce no response. `sigma = radius / 3`; radii below 3
//! push sigma under 1 and can be numerically unstable.

use crate::image::{reflect, Sample};

pub struct LogFilter {
    pub radius: usize,
    pub sigma: f32,
    kernel: Vec<f32>,
    width: usize,
    height: usize,
    channels: usize,
}

impl LogFilter {
    pub fn new(radius: usize, width: usize, height: usize, channels: usize) -> Self {
        assert!(radius >= 1, "log filter requires radius >= 1");
        let sigma = radius as f32 / 3.0;
        let kernel_size = 2 * radius + 1;

        let sigma_sq = sigma as f64 * sigma as f64;
        let scale_a = 1.0 / (2.0 * sigma_sq);
        let scale_b = 1.0 / (std::f64::consts::PI * sigma_sq * sigma_sq);

        let r = radius as isize;
        let mut kernel = Vec::with_capacity(kernel_size * kernel_size);
        let mut sum = 0.0f64;
        for y in -r..=r {
            for x in -r..=r {
                let t = (y * y + x * x) as f64 * scale_a;
                let val = scale_b * (t - 1.0) * (-t).exp();
                kernel.push(val as f32);
                sum += val;
            }
        }
        let mean = (sum / (kernel_size * kernel_size) as f64) as f32;
        for tap in &mut kernel {
            *tap -= mean;
        }

        Self {
            radius,
            sigma,
            kernel,
            width,
            height,
            channels,
        }
    }

    /// Single-pass convolution with edge reflect, clamped to `[0, 1]`.
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
        let r = self.radius as isize;
        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    let mut k_idx = 0usize;
                    let mut sum = 0.0f32;
                    for yk in -r..=r {
                        let yi = reflect(y as isize + yk, self.height);
                        for xk in -r..=r {
                            let xi = reflect(x as isize + xk, self.width);
                            sum += self.kernel[k_idx]
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

    pub fn taps(&self) -> &[f32] {
        &self.kernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_sums_to_zero_after_mean_subtraction() {
        for radius in [3usize, 4, 6] {
            let filter = LogFilter::new(radius, 4, 4, 1);
            let sum: f32 = filter.taps().iter().sum();
            assert!(sum.abs() < 1e-5, "radius {radius}: sum {sum}");
        }
    }

    #[test]
    fn flat_image_yields_zero_response() {
        let filter = LogFilter::new(3, 10, 10, 1);
        let inp = vec![0.75f32; 100];
        let mut out = vec![1.0f32; 100];
        filter.invoke_clamped(&inp, &mut out, -1.0, 1.0);
        for &v in &out {
            assert!(v.abs() < 1e-4, "got {v}");
        }
    }
}
