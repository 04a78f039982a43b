//! Disc-bokeh filter: separable approximation of a circular aperture blur
//! as a sum of complex Gaussians (Garcia-Dorado et al.).
//!
//! A 1-D complex kernel per component is evaluated once at construction and
//! normalized so the component-weighted 2-D double sum equals one. Both
//! passes substitute the centre pixel for any tap whose *mask* value marks
//! foreground, which keeps foreground colour from bleeding into the blurred
//! background.

use super::complex::Complex;
use crate::image::{reflect, Sample};

/// One component of the complex-Gaussian decomposition: `(a, b)` shape
/// `exp(-a x^2) * exp(i b x^2)`, `(cr, ci)` weight its real and imaginary
/// parts in the final reduction.
#[derive(Clone, Copy, Debug)]
struct KernelParam {
    a: f32,
    b: f32,
    cr: f32,
    ci: f32,
}

/// Stacked triangular parameter table: row level `n` holds the `n`-component
/// decomposition, starting at offset `n * (n - 1) / 2`.
#[rustfmt::skip]
const KERNEL_PARAMS: [KernelParam; 21] = [
    KernelParam { a: 0.862325, b: 1.624835, cr: 0.767583, ci: 1.862321 },

    KernelParam { a: 0.886528, b: 5.268909, cr: 0.411259, ci: -0.548794 },
    KernelParam { a: 1.960518, b: 1.558213, cr: 0.513282, ci: 4.56111 },

    KernelParam { a: 2.17649,  b: 5.043495, cr: 1.621035, ci: -2.105439 },
    KernelParam { a: 1.019306, b: 9.027613, cr: -0.28086, ci: -0.162882 },
    KernelParam { a: 2.81511,  b: 1.597273, cr: -0.366471, ci: 10.300301 },

    KernelParam { a: 4.338459, b: 1.553635, cr: -5.767909, ci: 46.164397 },
    KernelParam { a: 3.839993, b: 4.693183, cr: 9.795391, ci: -15.227561 },
    KernelParam { a: 2.79188,  b: 8.178137, cr: -3.048324, ci: 0.302959 },
    KernelParam { a: 1.34219,  b: 12.328289, cr: 0.010001, ci: 0.24465 },

    KernelParam { a: 4.892608, b: 1.685979, cr: -22.356787, ci: 85.91246 },
    KernelParam { a: 4.71187,  b: 4.998496, cr: 35.918936, ci: -28.875618 },
    KernelParam { a: 4.052795, b: 8.244168, cr: -13.212253, ci: -1.578428 },
    KernelParam { a: 2.929212, b: 11.900859, cr: 0.507991, ci: 1.816328 },
    KernelParam { a: 1.512961, b: 16.116382, cr: 0.138051, ci: -0.01 },

    KernelParam { a: 5.143778, b: 2.079813, cr: -82.326596, ci: 111.231024 },
    KernelParam { a: 5.612426, b: 6.153387, cr: 113.878661, ci: 58.004879 },
    KernelParam { a: 5.982921, b: 9.802895, cr: 39.479083, ci: -162.028887 },
    KernelParam { a: 6.505167, b: 11.059237, cr: -71.286026, ci: 95.027069 },
    KernelParam { a: 3.869579, b: 14.81052, cr: 1.405746, ci: -3.704914 },
    KernelParam { a: 2.201904, b: 19.032909, cr: -0.152784, ci: -0.107988 },
];

const MAX_COMPONENTS: usize = 6;

pub struct BokehFilter {
    pub radius: usize,
    pub components: usize,
    pub transition: f32,
    width: usize,
    height: usize,
    channels: usize,
    param_offset: usize,
    kernels: Vec<Complex>,
    tmp: Vec<Complex>,
}

impl BokehFilter {
    pub fn new(
        radius: usize,
        components: usize,
        transition: f32,
        width: usize,
        height: usize,
        channels: usize,
    ) -> Self {
        assert!(radius >= 1, "bokeh filter requires radius >= 1");
        assert!(
            (1..=MAX_COMPONENTS).contains(&components),
            "bokeh filter supports 1..=6 components"
        );
        let kernel_size = 2 * radius + 1;
        let param_offset = components * (components - 1) / 2;

        let mut filter = Self {
            radius,
            components,
            transition,
            width,
            height,
            channels,
            param_offset,
            kernels: vec![Complex::ZERO; kernel_size * components],
            tmp: vec![Complex::ZERO; height * width * channels * components],
        };
        filter.generate_normalized_kernels();
        filter
    }

    fn kernel_function(i: f32, p: &KernelParam) -> Complex {
        let attenuation = (-p.a * i * i).exp();
        Complex::new(
            attenuation * (p.b * i * i).cos(),
            attenuation * (p.b * i * i).sin(),
        )
    }

    fn generate_normalized_kernels(&mut self) {
        let kernel_size = 2 * self.radius + 1;
        let scale = (1.0 + self.transition) / self.radius as f32;

        let mut k_idx = 0usize;
        let r = self.radius as isize;
        for i in -r..=r {
            for c in 0..self.components {
                let p = &KERNEL_PARAMS[self.param_offset + c];
                self.kernels[k_idx] = Self::kernel_function(scale * i as f32, p);
                k_idx += 1;
            }
        }

        let mut sum = 0.0f64;
        for i in 0..kernel_size {
            for j in 0..kernel_size {
                for c in 0..self.components {
                    let p = &KERNEL_PARAMS[self.param_offset + c];
                    let product =
                        self.kernels[i * self.components + c] * self.kernels[j * self.components + c];
                    sum += (p.cr * product.re + p.ci * product.im) as f64;
                }
            }
        }

        let norm = (1.0 / sum.sqrt()) as f32;
        for k in &mut self.kernels {
            *k *= norm;
        }
    }

    /// Masked two-pass convolution. `mask` is one float per pixel; values
    /// above 0.5 mark foreground whose colour must not reach the blur.
    /// Expects pixel magnitudes in `0..=255`; the output clamps to that
    /// range.
    pub fn invoke<I: Sample, O: Sample>(&mut self, inp: &[I], out: &mut [O], mask: &[f32]) {
        debug_assert!(inp.len() >= self.width * self.height * self.channels);
        debug_assert!(out.len() >= self.width * self.height * self.channels);
        debug_assert!(mask.len() >= self.width * self.height);
        self.horizontal_pass(inp, mask);
        self.vertical_pass(out, mask);
    }

    fn horizontal_pass<I: Sample>(&mut self, inp: &[I], mask: &[f32]) {
        let r = self.radius as isize;
        let mut acc = [Complex::ZERO; MAX_COMPONENTS];

        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                let idxc = y * self.width + x;
                for c in 0..self.channels {
                    acc[..self.components].fill(Complex::ZERO);

                    let mut k_idx = 0usize;
                    for i in -r..=r {
                        let sx = reflect(x as isize + i, self.width);
                        let idxn = y * self.width + sx;
                        let src_idx = if mask[idxn] > 0.5 {
                            idxc * self.channels + c
                        } else {
                            idxn * self.channels + c
                        };
                        let v = inp[src_idx].to_f32();
                        for a in acc[..self.components].iter_mut() {
                            *a += self.kernels[k_idx] * v;
                            k_idx += 1;
                        }
                    }

                    for a in acc[..self.components].iter() {
                        self.tmp[idx] = *a;
                        idx += 1;
                    }
                }
            }
        }
    }

    fn vertical_pass<O: Sample>(&mut self, out: &mut [O], mask: &[f32]) {
        let r = self.radius as isize;
        let mut acc = [Complex::ZERO; MAX_COMPONENTS];

        let mut idx = 0usize;
        for y in 0..self.height {
            for x in 0..self.width {
                let idxc = y * self.width + x;
                for c in 0..self.channels {
                    acc[..self.components].fill(Complex::ZERO);

                    let mut k_idx = 0usize;
                    for i in -r..=r {
                        let sy = reflect(y as isize + i, self.height);
                        let idxn = sy * self.width + x;
                        let buf_idx = if mask[idxn] > 0.5 {
                            idxc * self.channels + c
                        } else {
                            idxn * self.channels + c
                        };
                        let src = &self.tmp[buf_idx * self.components..];
                        for (k, a) in acc[..self.components].iter_mut().enumerate() {
                            *a += self.kernels[k_idx] * src[k];
                            k_idx += 1;
                        }
                    }

                    let mut sum = 0.0f32;
                    for (k, a) in acc[..self.components].iter().enumerate() {
                        let p = &KERNEL_PARAMS[self.param_offset + k];
                        sum += p.cr * a.re + p.ci * a.im;
                    }
                    out[idx] = O::from_f32(sum.clamp(0.0, 255.0));
                    idx += 1;
                }
            }
        }
    }

    #[cfg(test)]
    fn weighted_kernel_sum(&self) -> f32 {
        let kernel_size = 2 * self.radius + 1;
        let mut sum = 0.0f32;
        for i in 0..kernel_size {
            for j in 0..kernel_size {
                for c in 0..self.components {
                    let p = &KERNEL_PARAMS[self.param_offset + c];
                    let product =
                        self.kernels[i * self.components + c] * self.kernels[j * self.components + c];
                    sum += p.cr * product.re + p.ci * product.im;
                }
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_kernel_double_sum_is_one() {
        for components in 1..=MAX_COMPONENTS {
            let filter = BokehFilter::new(3, components, 0.4, 4, 4, 1);
            let sum = filter.weighted_kernel_sum();
            assert!(
                (sum - 1.0).abs() < 1e-5,
                "components {components}: sum {sum}"
            );
        }
    }

    #[test]
    fn param_offset_walks_the_triangular_table() {
        for components in 1..=MAX_COMPONENTS {
            let filter = BokehFilter::new(3, components, 0.4, 4, 4, 1);
            assert_eq!(filter.param_offset, components * (components - 1) / 2);
        }
        // the last row level must end exactly at the table length
        assert_eq!(
            MAX_COMPONENTS * (MAX_COMPONENTS - 1) / 2 + MAX_COMPONENTS,
            KERNEL_PARAMS.len()
        );
    }

    #[test]
    fn constant_background_is_preserved() {
        let (w, h) = (12usize, 10usize);
        let mut filter = BokehFilter::new(3, 2, 0.4, w, h, 3);
        let inp = vec![180u8; w * h * 3];
        let mask = vec![0.0f32; w * h];
        let mut out = vec![0u8; w * h * 3];
        filter.invoke(&inp, &mut out, &mask);
        for &v in &out {
            assert!((v as i32 - 180).abs() <= 1, "got {v}");
        }
    }

    #[test]
    fn foreground_colour_does_not_bleed_into_the_background() {
        // Bright foreground block in a dark background; every foreground tap
        // is replaced by the centre pixel, so background output stays dark.
        let (w, h) = (16usize, 8usize);
        let mut inp = vec![10u8; w * h * 3];
        let mut mask = vec![0.0f32; w * h];
        for y in 0..h {
            for x in 6..10 {
                mask[y * w + x] = 1.0;
                for c in 0..3 {
                    inp[(y * w + x) * 3 + c] = 250;
                }
            }
        }
        let mut filter = BokehFilter::new(3, 2, 0.4, w, h, 3);
        let mut out = vec![0u8; w * h * 3];
        filter.invoke(&inp, &mut out, &mask);
        for y in 0..h {
            for x in [4usize, 5, 10, 11] {
                for c in 0..3 {
                    let v = out[(y * w + x) * 3 + c];
                    assert!(v < 30, "bleed at ({x},{y},{c}): {v}");
                }
            }
        }
    }
}
