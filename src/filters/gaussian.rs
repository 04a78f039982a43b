//! Separable Gaussian filter.
//!
//! The 1-D taps are built once at construction with `sigma = radius / 3` and
//! L1-normalized. Each pass reflects its own axis: the vertical pass mirrors
//! the row index, the horizontal pass the column index.

use crate::image::{reflect, Sample};

pub struct GaussianFilter {
    pub radius: usize,
    pub sigma: f32,
    kernel: Vec<f32>,
    buffer: Vec<f32>,
    width: usize,
    height: usize,
    channels: usize,
}

impl GaussianFilter {
    pub fn new(radius: usize, width: usize, height: usize, channels: usize) -> Self {
        assert!(radius >= 1, "gaussian filter requires radius >= 1");
        let sigma = radius as f32 / 3.0;
        let kernel_scale = 1.0 / (2.0 * sigma as f64 * sigma as f64);

        let mut kernel = Vec::with_capacity(2 * radius + 1);
        let mut sum = 0.0f64;
        let r = radius as isize;
        for i in -r..=r {
            let value = (-((i * i) as f64) * kernel_scale).exp();
            kernel.push(value as f32);
            sum += value;
        }
        for tap in &mut kernel {
            *tap = (*tap as f64 / sum) as f32;
        }

        Self {
            radius,
            sigma,
            kernel,
            buffer: vec![0.0; height * width * channels],
            width,
            height,
            channels,
        }
    }

    /// Vertical pass into the scratch buffer, then horizontal pass into
    /// `out`. Reads and writes `w * h * c` elements.
    pub fn invoke<I: Sample, O: Sample>(&mut self, inp: &[I], out: &mut [O]) {
        let r = self.radius as isize;

        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    let mut sum = 0.0f32;
                    for (k, &tap) in self.kernel.iter().enumerate() {
                        let sy = reflect(y as isize + k as isize - r, self.height);
                        sum += tap * inp[(sy * self.width + x) * self.channels + c].to_f32();
                    }
                    self.buffer[idx] = sum;
                    idx += 1;
                }
            }
        }

        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    let mut sum = 0.0f32;
                    for (k, &tap) in self.kernel.iter().enumerate() {
                        let sx = reflect(x as isize + k as isize - r, self.width);
                        sum += tap * self.buffer[(y * self.width + sx) * self.channels + c];
                    }
                    out[idx] = O::from_f32(sum);
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
    fn taps_are_l1_normalized() {
        for radius in 1..=5usize {
            let filter = GaussianFilter::new(radius, 4, 4, 1);
            let sum: f32 = filter.taps().iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "radius {radius}: sum {sum}");
        }
    }

    #[test]
    fn impulse_response_is_the_outer_product_of_the_taps() {
        // 13x13 single-channel image, impulse at the centre.
        let radius = 3usize;
        let (w, h) = (13usize, 13usize);
        let mut filter = GaussianFilter::new(radius, w, h, 1);
        let mut inp = vec![0f32; w * h];
        inp[6 * w + 6] = 1.0;
        let mut out = vec![0f32; w * h];
        filter.invoke(&inp, &mut out);

        let taps = filter.taps().to_vec();
        for y in 0..h {
            for x in 0..w {
                let dy = y as isize - 6;
                let dx = x as isize - 6;
                let expected = if dy.abs() <= radius as isize && dx.abs() <= radius as isize {
                    taps[(dy + radius as isize) as usize] * taps[(dx + radius as isize) as usize]
                } else {
                    0.0
                };
                assert!(
                    (out[y * w + x] - expected).abs() < 1e-6,
                    "({x},{y}): got {} expected {expected}",
                    out[y * w + x]
                );
            }
        }
    }

    #[test]
    fn impulse_response_is_symmetric_near_the_border() {
        // An impulse in the corner must produce the same response along both
        // axes, which only holds when each pass reflects its own axis.
        let (w, h) = (9usize, 9usize);
        let mut filter = GaussianFilter::new(2, w, h, 1);
        let mut inp = vec![0f32; w * h];
        inp[0] = 1.0;
        let mut out = vec![0f32; w * h];
        filter.invoke(&inp, &mut out);
        for d in 0..4 {
            assert!(
                (out[d] - out[d * w]).abs() < 1e-6,
                "asymmetric border response at offset {d}: {} vs {}",
                out[d],
                out[d * w]
            );
        }
    }

    #[test]
    fn constant_image_is_preserved() {
        let mut filter = GaussianFilter::new(2, 8, 6, 3);
        let inp = vec![100u8; 8 * 6 * 3];
        let mut out = vec![0u8; inp.len()];
        filter.invoke(&inp, &mut out);
        assert_eq!(inp, out);
    }
}
