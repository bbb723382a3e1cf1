//! SPH smoothing kernels for grid splatting.
//!
//! Kernels are radially symmetric with compact support: the weight is zero at
//! and beyond the support radius. The splatter's neighbor search cuts off at
//! exactly that radius, so the cutoff is exact rather than approximate.

use glam::Vec2;

/// Radially symmetric smoothing kernel with compact support.
///
/// `weight` takes the offset from the query point to the particle (query
/// minus particle position) and the support radius `h`, and must return 0 for
/// any offset with magnitude >= `h`.
pub trait Kernel: Sync {
    fn weight(&self, offset: Vec2, support: f32) -> f32;
}

/// Any plain function with the right shape works as a kernel.
impl<F> Kernel for F
where
    F: Fn(Vec2, f32) -> f32 + Sync,
{
    #[inline]
    fn weight(&self, offset: Vec2, support: f32) -> f32 {
        self(offset, support)
    }
}

/// Standard 2D poly6 kernel.
///
/// W(r) = 4/(pi h^8) * (h^2 - r^2)^3 for r < h
/// W(r) = 0 for r >= h
#[derive(Clone, Copy, Debug, Default)]
pub struct Poly6;

impl Kernel for Poly6 {
    #[inline]
    fn weight(&self, offset: Vec2, support: f32) -> f32 {
        let r2 = offset.length_squared();
        let h2 = support * support;
        if r2 >= h2 {
            return 0.0;
        }
        let d = h2 - r2;
        4.0 / (std::f32::consts::PI * support.powi(8)) * d * d * d
    }
}

/// Linear tent kernel: W(r) = 1 - r/h for r < h, 0 beyond.
///
/// Not normalized. Weights are easy to compute by hand, which makes this the
/// kernel of choice for validation scenarios.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hat;

impl Kernel for Hat {
    #[inline]
    fn weight(&self, offset: Vec2, support: f32) -> f32 {
        let r = offset.length();
        if r >= support {
            0.0
        } else {
            1.0 - r / support
        }
    }
}
