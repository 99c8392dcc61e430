//! ds9-style region specifications and their rasterization to pixel masks.

pub mod mask;
pub mod parse;

use std::path::Path;

use ndarray::Array2;

use crate::error::{RadioError, Result};
use crate::io::FitsHeader;

pub use parse::parse_region;

/// Coordinate frame a shape was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordSystem {
    /// 1-based image pixels (`image`, `physical`).
    Image,
    /// Equatorial degrees (`fk5`, `icrs`, `j2000`).
    Sky,
}

/// A position in the shape's coordinate system: pixels for image shapes,
/// (RA, Dec) degrees for sky shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A size that carries its own unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Pixels(f64),
    Degrees(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Circle {
        center: Point,
        radius: Length,
    },
    Ellipse {
        center: Point,
        semi_major: Length,
        semi_minor: Length,
        angle_deg: f64,
    },
    Box {
        center: Point,
        width: Length,
        height: Length,
        angle_deg: f64,
    },
    Polygon {
        vertices: Vec<Point>,
    },
    Annulus {
        center: Point,
        inner: Length,
        outer: Length,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub system: CoordSystem,
    pub geometry: Geometry,
    /// Excluded shapes remove pixels from the mask.
    pub exclude: bool,
}

/// An ordered list of include/exclude shapes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    pub shapes: Vec<Shape>,
}

impl Region {
    /// Load a region from a file path, or parse `spec` as literal region
    /// text when no such file exists.
    pub fn from_spec(spec: &str) -> Result<Self> {
        if spec.trim().is_empty() {
            return Err(RadioError::RegionParse(
                "empty region specification".into(),
            ));
        }
        let path = Path::new(spec);
        if path.is_file() {
            let text = std::fs::read_to_string(path)?;
            return parse_region(&text).map_err(|e| match e {
                RadioError::RegionParse(msg) => {
                    RadioError::RegionParse(format!("{}: {}", path.display(), msg))
                }
                other => other,
            });
        }
        parse_region(spec)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// One region per include shape, each carrying every exclusion.
    pub fn split_individual(&self) -> Vec<Region> {
        let excludes: Vec<Shape> = self.shapes.iter().filter(|s| s.exclude).cloned().collect();
        self.shapes
            .iter()
            .filter(|s| !s.exclude)
            .map(|include| {
                let mut shapes = Vec::with_capacity(excludes.len() + 1);
                shapes.push(include.clone());
                shapes.extend(excludes.iter().cloned());
                Region { shapes }
            })
            .collect()
    }

    /// Rasterize against a plane's coordinate header.
    pub fn mask(&self, header: &FitsHeader, shape: (usize, usize)) -> Result<Array2<bool>> {
        mask::rasterize(self, header, shape)
    }

    /// One mask per plane header.
    pub fn masks(&self, headers: &[FitsHeader], shape: (usize, usize)) -> Result<Vec<Array2<bool>>> {
        headers.iter().map(|h| self.mask(h, shape)).collect()
    }
}
