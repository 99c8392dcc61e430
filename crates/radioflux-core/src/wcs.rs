use tracing::warn;

use crate::error::Result;
use crate::io::FitsHeader;
use crate::resolve::{axis_increment, cd_is_rotated};

/// Celestial projection named by the `CTYPE1` suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    /// Gnomonic (`-TAN`).
    Tan,
    /// Orthographic (`-SIN`), the usual choice for synthesis images.
    Sin,
    /// No recognised projection: world offsets map linearly to pixels.
    Linear,
}

impl Projection {
    fn from_ctype(ctype: &str) -> Self {
        let ctype = ctype.trim().to_ascii_uppercase();
        if ctype.ends_with("-TAN") {
            Projection::Tan
        } else if ctype.ends_with("-SIN") {
            Projection::Sin
        } else {
            Projection::Linear
        }
    }
}

/// Two-axis celestial WCS without rotation or distortion terms.
#[derive(Clone, Debug, PartialEq)]
pub struct CelestialWcs {
    pub crpix: [f64; 2],
    pub cdelt: [f64; 2],
    pub crval: [f64; 2],
    pub projection: Projection,
}

impl CelestialWcs {
    pub fn from_header(header: &FitsHeader) -> Result<Self> {
        if cd_is_rotated(header) {
            warn!("ignoring CD matrix rotation in world-to-pixel transform");
        }
        let get = |key: &str| header.get_f64(key).unwrap_or(0.0);
        Ok(Self {
            crpix: [get("CRPIX1"), get("CRPIX2")],
            cdelt: [axis_increment(header, 1)?, axis_increment(header, 2)?],
            crval: [get("CRVAL1"), get("CRVAL2")],
            projection: Projection::from_ctype(header.get_str("CTYPE1").unwrap_or("")),
        })
    }

    /// Mean absolute pixel size in degrees.
    pub fn pixel_size(&self) -> f64 {
        (self.cdelt[0].abs() * self.cdelt[1].abs()).sqrt()
    }

    /// Sky position (degrees) to 1-based FITS pixel coordinates.
    pub fn world_to_pixel(&self, ra: f64, dec: f64) -> (f64, f64) {
        let (x, y) = match self.projection {
            Projection::Tan => self.zenithal(ra, dec, |theta| 1.0 / theta.tan()),
            Projection::Sin => self.zenithal(ra, dec, f64::cos),
            Projection::Linear => (wrap_degrees(ra - self.crval[0]), dec - self.crval[1]),
        };
        (
            self.crpix[0] + x / self.cdelt[0],
            self.crpix[1] + y / self.cdelt[1],
        )
    }

    /// Intermediate world coordinates (degrees) for a zenithal projection
    /// whose radial function is `radius(theta)` in radians.
    fn zenithal(&self, ra: f64, dec: f64, radius: impl Fn(f64) -> f64) -> (f64, f64) {
        let (ra, dec) = (ra.to_radians(), dec.to_radians());
        let (ra0, dec0) = (self.crval[0].to_radians(), self.crval[1].to_radians());
        let dra = ra - ra0;

        let phi = (-dec.cos() * dra.sin())
            .atan2(dec.sin() * dec0.cos() - dec.cos() * dec0.sin() * dra.cos())
            + std::f64::consts::PI;
        let theta = (dec.sin() * dec0.sin() + dec.cos() * dec0.cos() * dra.cos())
            .clamp(-1.0, 1.0)
            .asin();

        let r = radius(theta).to_degrees();
        (r * phi.sin(), -r * phi.cos())
    }
}

fn wrap_degrees(d: f64) -> f64 {
    (d + 180.0).rem_euclid(360.0) - 180.0
}
