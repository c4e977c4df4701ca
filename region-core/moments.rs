//! Spatial moments of a polygon up to third order, computed from its
//! boundary with Green's theorem.

use crate::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw moments of the area enclosed by a contour
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
    mu: CentralMoments,
}

/// Moments about the centroid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CentralMoments {
    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
    pub mu30: f64,
    pub mu21: f64,
    pub mu12: f64,
    pub mu03: f64,
}

/// Scale-normalized central moments
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedMoments {
    pub nu20: f64,
    pub nu11: f64,
    pub nu02: f64,
    pub nu30: f64,
    pub nu21: f64,
    pub nu12: f64,
    pub nu03: f64,
}

/// Green's theorem sums over the polygon edges, before the constant
/// divisors. Integer vertices make every sum an exact integer.
#[derive(Debug, Clone, Copy, Default)]
struct EdgeSums {
    a00: i128,
    a10: i128,
    a01: i128,
    a20: i128,
    a11: i128,
    a02: i128,
    a30: i128,
    a21: i128,
    a12: i128,
    a03: i128,
}

fn checked_product(factors: &[i128]) -> Option<i128> {
    factors.iter().try_fold(1i128, |acc, &f| acc.checked_mul(f))
}

impl EdgeSums {
    /// Sums with every vertex taken relative to `origin`
    fn accumulate(points: &[Point], origin: Point) -> Self {
        let local = |p: &Point| ((p.x as i128) - (origin.x as i128), (p.y as i128) - (origin.y as i128));
        let mut sums = Self::default();
        let Some(last) = points.last() else {
            return sums;
        };
        let (mut xp, mut yp) = local(last);

        for p in points {
            let (x, y) = local(p);
            let dxy = xp * y - x * yp;
            let xx = x * x;
            let yy = y * y;
            let xxp = xp * xp;
            let yyp = yp * yp;

            sums.a00 += dxy;
            sums.a10 += dxy * (xp + x);
            sums.a01 += dxy * (yp + y);
            sums.a20 += dxy * (xxp + xp * x + xx);
            sums.a11 += dxy * (xp * (2 * yp + y) + x * (yp + 2 * y));
            sums.a02 += dxy * (yyp + yp * y + yy);
            sums.a30 += dxy * (xp + x) * (xxp + xx);
            sums.a21 += dxy * (xxp * (3 * yp + y) + 2 * x * xp * (yp + y) + xx * (yp + 3 * y));
            sums.a12 += dxy * (yyp * (3 * xp + x) + 2 * y * yp * (xp + x) + yy * (xp + 3 * x));
            sums.a03 += dxy * (yp + y) * (yyp + yy);

            xp = x;
            yp = y;
        }
        sums
    }

    fn negated(self) -> Self {
        Self {
            a00: -self.a00,
            a10: -self.a10,
            a01: -self.a01,
            a20: -self.a20,
            a11: -self.a11,
            a02: -self.a02,
            a30: -self.a30,
            a21: -self.a21,
            a12: -self.a12,
            a03: -self.a03,
        }
    }

    /// Central moments as exact integer ratios, so shapes that are
    /// symmetric about an axis get exact zeros. `None` on overflow.
    fn exact_central(&self) -> Option<CentralMoments> {
        let (d, a10, a01) = (self.a00, self.a10, self.a01);
        let d2 = d.checked_mul(d)?;
        let sum = |terms: &[Option<i128>]| -> Option<i128> {
            terms.iter().try_fold(0i128, |acc, t| acc.checked_add((*t)?))
        };

        let n20 = sum(&[checked_product(&[3, self.a20, d]), checked_product(&[-2, a10, a10])])?;
        let n02 = sum(&[checked_product(&[3, self.a02, d]), checked_product(&[-2, a01, a01])])?;
        let n11 = sum(&[checked_product(&[3, self.a11, d]), checked_product(&[-4, a10, a01])])?;
        let n30 = sum(&[
            checked_product(&[27, self.a30, d2]),
            checked_product(&[-45, a10, self.a20, d]),
            checked_product(&[20, a10, a10, a10]),
        ])?;
        let n21 = sum(&[
            checked_product(&[9, self.a21, d2]),
            checked_product(&[-15, a10, self.a11, d]),
            checked_product(&[-15, a01, self.a20, d]),
            checked_product(&[20, a10, a10, a01]),
        ])?;
        let n12 = sum(&[
            checked_product(&[9, self.a12, d2]),
            checked_product(&[-15, a01, self.a11, d]),
            checked_product(&[-15, a10, self.a02, d]),
            checked_product(&[20, a01, a01, a10]),
        ])?;
        let n03 = sum(&[
            checked_product(&[27, self.a03, d2]),
            checked_product(&[-45, a01, self.a02, d]),
            checked_product(&[20, a01, a01, a01]),
        ])?;

        let second = 36.0 * d as f64;
        let third = 540.0 * d2 as f64;
        Some(CentralMoments {
            mu20: n20 as f64 / second,
            mu11: n11 as f64 / (2.0 * second),
            mu02: n02 as f64 / second,
            mu30: n30 as f64 / third,
            mu21: n21 as f64 / third,
            mu12: n12 as f64 / third,
            mu03: n03 as f64 / third,
        })
    }

    /// Floating-point fallback for polygons too large for the exact path
    fn approximate_central(&self) -> CentralMoments {
        let m = self.raw();
        let cx = m.m10 / m.m00;
        let cy = m.m01 / m.m00;
        let mu20 = m.m20 - cx * m.m10;
        let mu11 = m.m11 - cx * m.m01;
        let mu02 = m.m02 - cy * m.m01;

        CentralMoments {
            mu20,
            mu11,
            mu02,
            mu30: m.m30 - cx * (3.0 * mu20 + cx * m.m10),
            mu21: m.m21 - cx * (2.0 * mu11 + cx * m.m01) - cy * mu20,
            mu12: m.m12 - cy * (2.0 * mu11 + cy * m.m10) - cx * mu02,
            mu03: m.m03 - cy * (3.0 * mu02 + cy * m.m01),
        }
    }

    fn raw(&self) -> Moments {
        Moments {
            m00: self.a00 as f64 / 2.0,
            m10: self.a10 as f64 / 6.0,
            m01: self.a01 as f64 / 6.0,
            m20: self.a20 as f64 / 12.0,
            m11: self.a11 as f64 / 24.0,
            m02: self.a02 as f64 / 12.0,
            m30: self.a30 as f64 / 20.0,
            m21: self.a21 as f64 / 60.0,
            m12: self.a12 as f64 / 60.0,
            m03: self.a03 as f64 / 20.0,
            mu: CentralMoments::default(),
        }
    }
}

impl Moments {
    /// Moments of the polygon traced by `points`. Winding does not matter:
    /// the result is normalized so `m00` is never negative. Degenerate
    /// polygons (fewer than three points or no area) give all zeros.
    ///
    /// Central moments are taken about the first vertex and do not depend
    /// on where the polygon sits in the image.
    pub fn from_points(points: &[Point]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut raw = EdgeSums::accumulate(points, Point::new(0, 0));
        let mut local = EdgeSums::accumulate(points, points[0]);
        if raw.a00 == 0 {
            return Self::default();
        }
        if raw.a00 < 0 {
            raw = raw.negated();
            local = local.negated();
        }

        let mu = local.exact_central().unwrap_or_else(|| local.approximate_central());
        Self { mu, ..raw.raw() }
    }

    /// Centre of mass, `None` for a zero-area region
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            None
        } else {
            Some((self.m10 / self.m00, self.m01 / self.m00))
        }
    }

    pub fn central(&self) -> CentralMoments {
        self.mu
    }

    pub fn normalized(&self) -> NormalizedMoments {
        if self.m00 == 0.0 {
            return NormalizedMoments::default();
        }
        let mu = self.central();
        let s2 = self.m00 * self.m00;
        let s3 = s2 * self.m00.sqrt();

        NormalizedMoments {
            nu20: mu.mu20 / s2,
            nu11: mu.mu11 / s2,
            nu02: mu.mu02 / s2,
            nu30: mu.mu30 / s3,
            nu21: mu.mu21 / s3,
            nu12: mu.mu12 / s3,
            nu03: mu.mu03 / s3,
        }
    }

    /// The seven Hu invariants, untransformed
    pub fn hu(&self) -> [f64; 7] {
        let nu = self.normalized();

        let t0 = nu.nu30 + nu.nu12;
        let t1 = nu.nu21 + nu.nu03;
        let q0 = nu.nu20 - nu.nu02;
        let a = nu.nu30 - 3.0 * nu.nu12;
        let b = 3.0 * nu.nu21 - nu.nu03;

        let t0s = t0 * t0;
        let t1s = t1 * t1;

        [
            nu.nu20 + nu.nu02,
            q0 * q0 + 4.0 * nu.nu11 * nu.nu11,
            a * a + b * b,
            t0s + t1s,
            a * t0 * (t0s - 3.0 * t1s) + b * t1 * (3.0 * t0s - t1s),
            q0 * (t0s - t1s) + 4.0 * nu.nu11 * t0 * t1,
            b * t0 * (t0s - 3.0 * t1s) - a * t1 * (3.0 * t0s - t1s),
        ]
    }
}
