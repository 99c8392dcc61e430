use ndarray::Array2;

use crate::error::Result;
use crate::io::FitsHeader;
use crate::wcs::CelestialWcs;

use super::{CoordSystem, Geometry, Length, Point, Region, Shape};

/// A shape resolved to 1-based pixel coordinates of one plane.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelShape {
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        a: f64,
        b: f64,
        angle: f64,
    },
    Box {
        cx: f64,
        cy: f64,
        half_w: f64,
        half_h: f64,
        angle: f64,
    },
    Polygon(Vec<(f64, f64)>),
    Annulus {
        cx: f64,
        cy: f64,
        inner: f64,
        outer: f64,
    },
}

impl PixelShape {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match *self {
            PixelShape::Circle { cx, cy, r } => (x - cx).powi(2) + (y - cy).powi(2) <= r * r,
            PixelShape::Ellipse {
                cx,
                cy,
                a,
                b,
                angle,
            } => {
                let (u, v) = rotate(x - cx, y - cy, angle);
                (u / a).powi(2) + (v / b).powi(2) <= 1.0
            }
            PixelShape::Box {
                cx,
                cy,
                half_w,
                half_h,
                angle,
            } => {
                let (u, v) = rotate(x - cx, y - cy, angle);
                u.abs() <= half_w && v.abs() <= half_h
            }
            PixelShape::Polygon(ref vertices) => point_in_polygon(vertices, x, y),
            PixelShape::Annulus {
                cx,
                cy,
                inner,
                outer,
            } => {
                let d2 = (x - cx).powi(2) + (y - cy).powi(2);
                d2 >= inner * inner && d2 <= outer * outer
            }
        }
    }
}

/// Rotate an offset into the frame of a shape tilted by `angle` radians.
fn rotate(dx: f64, dy: f64, angle: f64) -> (f64, f64) {
    let (s, c) = angle.sin_cos();
    (dx * c + dy * s, -dx * s + dy * c)
}

/// Even-odd ray casting.
fn point_in_polygon(vertices: &[(f64, f64)], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = vertices[i];
        let (xj, yj) = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Converts shape coordinates to pixels, using the WCS only when needed.
struct Projector<'a> {
    header: &'a FitsHeader,
    wcs: Option<CelestialWcs>,
}

impl Projector<'_> {
    fn wcs(&mut self) -> Result<&CelestialWcs> {
        let wcs = match self.wcs.take() {
            Some(wcs) => wcs,
            None => CelestialWcs::from_header(self.header)?,
        };
        Ok(self.wcs.insert(wcs))
    }

    fn point(&mut self, system: CoordSystem, p: Point) -> Result<(f64, f64)> {
        match system {
            CoordSystem::Image => Ok((p.x, p.y)),
            CoordSystem::Sky => Ok(self.wcs()?.world_to_pixel(p.x, p.y)),
        }
    }

    fn length(&mut self, l: Length) -> Result<f64> {
        match l {
            Length::Pixels(v) => Ok(v),
            Length::Degrees(v) => Ok(v / self.wcs()?.pixel_size()),
        }
    }

    fn shape(&mut self, shape: &Shape) -> Result<PixelShape> {
        let system = shape.system;
        Ok(match shape.geometry {
            Geometry::Circle { center, radius } => {
                let (cx, cy) = self.point(system, center)?;
                PixelShape::Circle {
                    cx,
                    cy,
                    r: self.length(radius)?,
                }
            }
            Geometry::Ellipse {
                center,
                semi_major,
                semi_minor,
                angle_deg,
            } => {
                let (cx, cy) = self.point(system, center)?;
                PixelShape::Ellipse {
                    cx,
                    cy,
                    a: self.length(semi_major)?,
                    b: self.length(semi_minor)?,
                    angle: angle_deg.to_radians(),
                }
            }
            Geometry::Box {
                center,
                width,
                height,
                angle_deg,
            } => {
                let (cx, cy) = self.point(system, center)?;
                PixelShape::Box {
                    cx,
                    cy,
                    half_w: self.length(width)? / 2.0,
                    half_h: self.length(height)? / 2.0,
                    angle: angle_deg.to_radians(),
                }
            }
            Geometry::Polygon { ref vertices } => PixelShape::Polygon(
                vertices
                    .iter()
                    .map(|&v| self.point(system, v))
                    .collect::<Result<_>>()?,
            ),
            Geometry::Annulus {
                center,
                inner,
                outer,
            } => {
                let (cx, cy) = self.point(system, center)?;
                PixelShape::Annulus {
                    cx,
                    cy,
                    inner: self.length(inner)?,
                    outer: self.length(outer)?,
                }
            }
        })
    }
}

/// Build a boolean mask of `shape` (rows, cols).
///
/// Pixel (row, col) is tested at its centre, image coordinate
/// (col + 1, row + 1). A region made only of exclusions starts from a
/// fully selected image.
pub fn rasterize(region: &Region, header: &FitsHeader, shape: (usize, usize)) -> Result<Array2<bool>> {
    let mut projector = Projector { header, wcs: None };
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for s in &region.shapes {
        let pixel_shape = projector.shape(s)?;
        if s.exclude {
            exclude.push(pixel_shape);
        } else {
            include.push(pixel_shape);
        }
    }

    let select_all = include.is_empty();
    Ok(Array2::from_shape_fn(shape, |(row, col)| {
        let (x, y) = (col as f64 + 1.0, row as f64 + 1.0);
        (select_all || include.iter().any(|s| s.contains(x, y)))
            && !exclude.iter().any(|s| s.contains(x, y))
    }))
}
