//! Spatial filters of the per-frame pipeline.
//!
//! Every filter is constructed once with `(radius, width, height, channels)`
//! style parameters, precomputes its kernel tables up front, and exposes an
//! `invoke` that reads and writes `w * h * c` elements with edge-reflect
//! boundary handling. Per-call allocation is limited to stack scalars; the
//! Gaussian and bokeh filters own the scratch buffers their two-pass
//! evaluation needs.

pub mod bilateral;
pub mod bokeh;
pub mod box_filter;
pub mod complex;
pub mod gaussian;
pub mod guided;
pub mod laplacian;
pub mod log;

pub use self::bilateral::JointBilateralFilter;
pub use self::bokeh::BokehFilter;
pub use self::box_filter::BoxFilter;
pub use self::complex::Complex;
pub use self::gaussian::GaussianFilter;
pub use self::guided::GuidedFilter;
pub use self::laplacian::LaplacianFilter;
pub use self::log::LogFilter;
