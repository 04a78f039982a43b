//! Minimal complex value type for the bokeh kernel.
//!
//! The kernel tables are complex but the image buffers stay real, so only
//! the operators the two filter passes need are implemented: addition,
//! complex-complex and complex-real multiplication.

use std::ops::{Add, AddAssign, Mul, MulAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    pub re: f32,
    pub im: f32,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }
}

impl Add for Complex {
    type Output = Complex;
    #[inline]
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl AddAssign for Complex {
    #[inline]
    fn add_assign(&mut self, rhs: Complex) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Mul for Complex {
    type Output = Complex;
    #[inline]
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl MulAssign for Complex {
    #[inline]
    fn mul_assign(&mut self, rhs: Complex) {
        *self = *self * rhs;
    }
}

impl Mul<f32> for Complex {
    type Output = Complex;
    #[inline]
    fn mul(self, rhs: f32) -> Complex {
        Complex::new(self.re * rhs, self.im * rhs)
    }
}

impl MulAssign<f32> for Complex {
    #[inline]
    fn mul_assign(&mut self, rhs: f32) {
        self.re *= rhs;
        self.im *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_product_follows_the_textbook() {
        let p = Complex::new(1.0, 2.0) * Complex::new(3.0, -1.0);
        assert_eq!(p, Complex::new(5.0, 5.0));
    }

    #[test]
    fn real_scaling_scales_both_parts() {
        let mut z = Complex::new(0.5, -2.0);
        z *= 2.0;
        assert_eq!(z, Complex::new(1.0, -4.0));
    }
}
