//! Beam, unit, frequency and pixel-scale resolution from a primary header.
//!
//! Real-world radio maps populate these keywords inconsistently, so every
//! quantity is resolved through an ordered chain of optional lookups and
//! only escalates to an error once the chain is exhausted.

use std::f64::consts::PI;

use tracing::{info, warn};

use crate::consts::{
    gaussian_fwhm_factor, BEAM_KEYWORDS, CLEAN_BEAM_MARKER, EXPECTED_UNITS, FREQUENCY_KEYWORDS,
    SHAPE_TOLERANCE, UNIT_KEYWORDS, UNKNOWN_FREQUENCY,
};
use crate::error::{RadioError, Result};
use crate::io::FitsHeader;

/// How chatty header resolution is while a map is being built.
///
/// `Quiet` suppresses the non-fatal warnings for one construction only;
/// `Verbose` additionally reports the beam geometry it derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConstructionMode {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl ConstructionMode {
    pub fn warnings(self) -> bool {
        self != ConstructionMode::Quiet
    }

    pub fn verbose(self) -> bool {
        self == ConstructionMode::Verbose
    }
}

/// Where the restoring beam was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BeamSource {
    Keywords(&'static str, &'static str),
    History,
}

/// Restoring beam full widths in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    pub major_deg: f64,
    pub minor_deg: f64,
    pub source: BeamSource,
}

impl Beam {
    pub fn is_circular(&self) -> bool {
        relative_difference(self.major_deg, self.minor_deg) <= SHAPE_TOLERANCE
    }
}

/// Signed pixel increments (degrees per pixel) along the two image axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelScale {
    pub cdelt1: f64,
    pub cdelt2: f64,
}

impl PixelScale {
    /// Pixel size along x with the right-ascension sign flip applied.
    pub fn cd1(&self) -> f64 {
        -self.cdelt1
    }

    pub fn cd2(&self) -> f64 {
        self.cdelt2
    }

    pub fn is_square(&self) -> bool {
        relative_difference(self.cd1().abs(), self.cd2().abs()) <= SHAPE_TOLERANCE
    }
}

/// Everything the header says about one map, before the data is touched.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedHeader {
    pub units: Option<String>,
    pub beam: Beam,
    pub pixel_scale: PixelScale,
    pub beam_major_pixels: f64,
    pub beam_minor_pixels: f64,
}

impl ResolvedHeader {
    pub fn beam_area_pixels(&self) -> f64 {
        beam_area(self.beam_major_pixels, self.beam_minor_pixels)
    }
}

/// Resolve units, beam and pixel scale. Frequency is resolved separately
/// since cubes with a spectral axis never need the whole-file value.
pub fn resolve_header(header: &FitsHeader, mode: ConstructionMode) -> Result<ResolvedHeader> {
    let units = resolve_units(header, mode);
    let beam = resolve_beam(header, mode)?;
    let pixel_scale = resolve_pixel_scale(header)?;
    if cd_is_rotated(header) && mode.warnings() {
        warn!("CD matrix has off-diagonal terms; using CD1_1/CD2_2 as the pixel scale");
    }
    let (beam_major_pixels, beam_minor_pixels) = beam_in_pixels(&beam, &pixel_scale)?;

    if mode.verbose() {
        info!(
            "beam is {} by {} pixels",
            beam_major_pixels, beam_minor_pixels
        );
        info!(
            "beam area is {} pixels",
            beam_area(beam_major_pixels, beam_minor_pixels)
        );
    }

    Ok(ResolvedHeader {
        units,
        beam,
        pixel_scale,
        beam_major_pixels,
        beam_minor_pixels,
    })
}

/// `BUNIT`, then `UNIT`. Anything other than Jy/beam is reported but
/// accepted.
pub fn resolve_units(header: &FitsHeader, mode: ConstructionMode) -> Option<String> {
    let units = UNIT_KEYWORDS
        .iter()
        .find_map(|key| header.get_str(key))
        .map(|s| s.trim().to_string());

    let expected = units
        .as_deref()
        .is_some_and(|u| u.eq_ignore_ascii_case(EXPECTED_UNITS));
    if !expected && mode.warnings() {
        warn!(
            "units are {} but code expects {}",
            units.as_deref().unwrap_or("None"),
            EXPECTED_UNITS
        );
    }
    units
}

/// `BMAJ`/`BMIN`, then `RESOL1`/`RESOL2`, then the AIPS clean-beam
/// record in the history.
pub fn resolve_beam(header: &FitsHeader, mode: ConstructionMode) -> Result<Beam> {
    for (major_key, minor_key) in BEAM_KEYWORDS {
        let major = header.get_f64(major_key).filter(|v| is_valid_size(*v));
        let minor = header.get_f64(minor_key).filter(|v| is_valid_size(*v));
        if let (Some(major_deg), Some(minor_deg)) = (major, minor) {
            return Ok(Beam {
                major_deg,
                minor_deg,
                source: BeamSource::Keywords(major_key, minor_key),
            });
        }
    }

    if mode.verbose() {
        info!("Can't find BMAJ in headers, checking history");
    }
    beam_from_history(header).ok_or(RadioError::BeamNotFound)
}

/// Scan HISTORY records for the last AIPS `CLEAN BMAJ= x BMIN= y` entry.
///
/// Records that themselves contain `HISTORY` are echoes of an older
/// header and are skipped.
pub fn beam_from_history(header: &FitsHeader) -> Option<Beam> {
    header
        .history()
        .filter(|line| !line.contains("HISTORY"))
        .filter(|line| line.contains(CLEAN_BEAM_MARKER))
        .filter_map(parse_clean_beam)
        .last()
}

fn parse_clean_beam(line: &str) -> Option<Beam> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let major_deg = parse_number(tokens.get(3)?)?;
    let minor_deg = parse_number(tokens.get(5)?)?;
    if !is_valid_size(major_deg) || !is_valid_size(minor_deg) {
        return None;
    }
    Some(Beam {
        major_deg,
        minor_deg,
        source: BeamSource::History,
    })
}

/// Whole-file frequency: rest-frequency keywords, then a `FREQ` axis
/// reference value, otherwise [`UNKNOWN_FREQUENCY`].
pub fn resolve_frequency(header: &FitsHeader, mode: ConstructionMode) -> f64 {
    let from_keywords = FREQUENCY_KEYWORDS
        .iter()
        .find_map(|key| header.get_f64(key).filter(|f| *f != 0.0));

    let frequency = from_keywords.or_else(|| frequency_from_axes(header));
    match frequency {
        Some(f) => f,
        None => {
            if mode.warnings() {
                warn!("can't get frequency -- set to zero");
            }
            UNKNOWN_FREQUENCY
        }
    }
}

/// Reference value of the first axis whose type is exactly `FREQ`.
/// Scanning stops at the first missing `CTYPEi`.
fn frequency_from_axes(header: &FitsHeader) -> Option<f64> {
    let mut i = 1;
    while let Some(ctype) = header.get_str(&format!("CTYPE{i}")) {
        if ctype.trim().eq_ignore_ascii_case("FREQ") {
            return header.get_f64(&format!("CRVAL{i}"));
        }
        i += 1;
    }
    None
}

/// Signed pixel increments from `CDELTi`, falling back to `CDi_i`.
pub fn resolve_pixel_scale(header: &FitsHeader) -> Result<PixelScale> {
    Ok(PixelScale {
        cdelt1: axis_increment(header, 1)?,
        cdelt2: axis_increment(header, 2)?,
    })
}

/// True when `CD1_2` or `CD2_1` is present and non-zero. Only the
/// diagonal is used for pixel sizes, so such grids are measured as if
/// unrotated.
pub fn cd_is_rotated(header: &FitsHeader) -> bool {
    ["CD1_2", "CD2_1"]
        .iter()
        .any(|key| header.get_f64(key).is_some_and(|v| v != 0.0))
}

pub(crate) fn axis_increment(header: &FitsHeader, axis: usize) -> Result<f64> {
    let value = header
        .get_f64(&format!("CDELT{axis}"))
        .or_else(|| header.get_f64(&format!("CD{axis}_{axis}")))
        .ok_or_else(|| RadioError::InvalidPixelScale {
            axis,
            reason: format!("neither CDELT{axis} nor CD{axis}_{axis} present"),
        })?;
    if value == 0.0 || !value.is_finite() {
        return Err(RadioError::InvalidPixelScale {
            axis,
            reason: format!("increment is {value}"),
        });
    }
    Ok(value)
}

/// Convert the beam from degrees to pixels.
///
/// An elliptical beam on non-square pixels is rejected: there is no single
/// pixel size to convert each axis with.
pub fn beam_in_pixels(beam: &Beam, scale: &PixelScale) -> Result<(f64, f64)> {
    let cd1 = scale.cd1();
    let cd2 = scale.cd2();
    if !scale.is_square() && !beam.is_circular() {
        return Err(RadioError::AsymmetricBeam { cd1, cd2 });
    }
    Ok((beam.major_deg / cd1.abs(), beam.minor_deg / cd2.abs()))
}

/// Gaussian beam solid angle in pixels, `2*pi*major*minor / (8 ln 2)`.
pub fn beam_area(major_pixels: f64, minor_pixels: f64) -> f64 {
    let g = gaussian_fwhm_factor();
    2.0 * PI * major_pixels * minor_pixels / (g * g)
}

fn relative_difference(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs()
}

fn is_valid_size(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn parse_number(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .or_else(|| token.replace(['D', 'd'], "E").parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_difference() {
        assert!(relative_difference(1.0, 1.0) == 0.0);
        assert!((relative_difference(2.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_clean_beam_tokens() {
        let beam = parse_clean_beam("AIPS   CLEAN BMAJ=  1.2500E-03 BMIN=  8.3333E-04 BPA=  12.5")
            .unwrap();
        assert!((beam.major_deg - 1.25e-3).abs() < 1e-12);
        assert!((beam.minor_deg - 8.3333e-4).abs() < 1e-12);
        assert!(parse_clean_beam("AIPS CLEAN BMAJ=").is_none());
    }

    #[test]
    fn test_fwhm_factor() {
        let g = gaussian_fwhm_factor();
        assert!((g * g - 8.0 * std::f64::consts::LN_2).abs() < 1e-12);
    }
}
