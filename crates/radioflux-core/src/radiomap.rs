use std::path::Path;

use ndarray::{Array2, ArrayD};
use tracing::info;

use crate::error::Result;
use crate::io::{FitsHeader, FitsImage};
use crate::planes::extract_planes;
use crate::resolve::{resolve_header, Beam, ConstructionMode, PixelScale};

/// A FITS image normalised for photometry: beam in pixels, one 2-D plane
/// and coordinate header per frequency channel.
///
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct RadioMap {
    header: FitsHeader,
    units: Option<String>,
    beam: Beam,
    pixel_scale: PixelScale,
    beam_major_pixels: f64,
    beam_minor_pixels: f64,
    beam_area_pixels: f64,
    is_cube: bool,
    frequencies: Vec<f64>,
    planes: Vec<Array2<f64>>,
    plane_headers: Vec<FitsHeader>,
}

impl RadioMap {
    /// Read a FITS file and build its map. The file is unmapped before
    /// this returns.
    pub fn open(path: &Path, mode: ConstructionMode) -> Result<Self> {
        let image = FitsImage::open(path)?;
        if mode.verbose() {
            info!(file = %path.display(), "Building radio map");
        }
        Self::from_image(image, mode)
    }

    pub fn from_image(image: FitsImage, mode: ConstructionMode) -> Result<Self> {
        Self::from_parts(image.header, image.data, mode)
    }

    /// Build from a primary header and its data array (reverse FITS axis
    /// order, as produced by the reader).
    pub fn from_parts(header: FitsHeader, data: ArrayD<f64>, mode: ConstructionMode) -> Result<Self> {
        let resolved = resolve_header(&header, mode)?;
        let set = extract_planes(&header, data, mode)?;

        Ok(Self {
            units: resolved.units.clone(),
            beam_area_pixels: resolved.beam_area_pixels(),
            beam: resolved.beam,
            pixel_scale: resolved.pixel_scale,
            beam_major_pixels: resolved.beam_major_pixels,
            beam_minor_pixels: resolved.beam_minor_pixels,
            is_cube: set.is_cube,
            frequencies: set.frequencies,
            planes: set.planes,
            plane_headers: set.headers,
            header,
        })
    }

    /// The primary header the map was built from.
    pub fn header(&self) -> &FitsHeader {
        &self.header
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    pub fn pixel_scale(&self) -> PixelScale {
        self.pixel_scale
    }

    pub fn beam_major_pixels(&self) -> f64 {
        self.beam_major_pixels
    }

    pub fn beam_minor_pixels(&self) -> f64 {
        self.beam_minor_pixels
    }

    /// Gaussian beam solid angle in pixels.
    pub fn beam_area_pixels(&self) -> f64 {
        self.beam_area_pixels
    }

    pub fn is_cube(&self) -> bool {
        self.is_cube
    }

    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    /// Channel frequencies in Hz; `0.0` means unknown.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn planes(&self) -> &[Array2<f64>] {
        &self.planes
    }

    pub fn plane_headers(&self) -> &[FitsHeader] {
        &self.plane_headers
    }

    /// Shape of every plane as (rows, cols).
    pub fn plane_shape(&self) -> (usize, usize) {
        self.planes.first().map(|p| p.dim()).unwrap_or((0, 0))
    }
}
