#![allow(dead_code)]

use fitsio_pure::header::{serialize_header, Card as RawCard};
use fitsio_pure::image::{serialize_image_f32, serialize_image_i16};
use fitsio_pure::value::Value;
use ndarray::{ArrayD, IxDyn};
use radioflux_core::io::{FitsHeader, HeaderValue};

/// Beam FWHM (in pixels) whose Gaussian area is exactly one pixel.
pub fn unit_area_beam() -> f64 {
    (4.0 * std::f64::consts::LN_2 / std::f64::consts::PI).sqrt()
}

/// Header with the mandatory keywords for a `BITPIX = -32` image of
/// `axes` (FITS order, NAXIS1 first), followed by `extra` keywords.
pub fn image_header(axes: &[usize], extra: &[(&str, HeaderValue)]) -> FitsHeader {
    let mut header = FitsHeader::new();
    header.set("SIMPLE", true);
    header.set("BITPIX", -32i64);
    header.set("NAXIS", axes.len() as i64);
    for (i, n) in axes.iter().enumerate() {
        header.set(&format!("NAXIS{}", i + 1), *n as i64);
    }
    for (key, value) in extra {
        header.set(key, value.clone());
    }
    header
}

/// Jy/beam units, a circular beam of `beam_pixels` FWHM and a SIN
/// projection with square `pixel_deg` pixels.
pub fn radio_keywords(pixel_deg: f64, beam_pixels: f64) -> Vec<(&'static str, HeaderValue)> {
    vec![
        ("BUNIT", "JY/BEAM".into()),
        ("BMAJ", (beam_pixels * pixel_deg).into()),
        ("BMIN", (beam_pixels * pixel_deg).into()),
        ("CTYPE1", "RA---SIN".into()),
        ("CRPIX1", 1.0.into()),
        ("CRVAL1", 180.0.into()),
        ("CDELT1", (-pixel_deg).into()),
        ("CTYPE2", "DEC--SIN".into()),
        ("CRPIX2", 1.0.into()),
        ("CRVAL2", 45.0.into()),
        ("CDELT2", pixel_deg.into()),
    ]
}

/// Data array in reader order (NAXISn first) from values stored FITS
/// style, NAXIS1 fastest.
pub fn data_array(axes: &[usize], values: Vec<f64>) -> ArrayD<f64> {
    let shape: Vec<usize> = axes.iter().rev().copied().collect();
    ArrayD::from_shape_vec(IxDyn(&shape), values).expect("shape matches values")
}

/// Header cards as written to disk, `END` appended by the serializer.
pub fn raw_cards(header: &FitsHeader) -> Vec<RawCard> {
    header
        .cards()
        .iter()
        .map(|card| {
            let mut keyword = [b' '; 8];
            keyword[..card.keyword.len()].copy_from_slice(card.keyword.as_bytes());
            let value = card.value.as_ref().map(|v| match v {
                HeaderValue::Str(s) => Value::String(s.clone()),
                HeaderValue::Int(n) => Value::Integer(*n),
                HeaderValue::Float(f) => Value::Float(*f),
                HeaderValue::Bool(b) => Value::Logical(*b),
            });
            RawCard {
                keyword,
                value,
                comment: card.text.clone(),
            }
        })
        .collect()
}

/// Serialize a header and `f32` samples as a complete FITS file.
pub fn build_fits(header: &FitsHeader, values: &[f32]) -> Vec<u8> {
    let mut buf = serialize_header(&raw_cards(header));
    buf.extend(serialize_image_f32(values));
    buf
}

/// Serialize a header and big-endian `i16` samples.
pub fn build_fits_i16(header: &FitsHeader, values: &[i16]) -> Vec<u8> {
    let mut buf = serialize_header(&raw_cards(header));
    buf.extend(serialize_image_i16(values));
    buf
}

/// Write FITS bytes to a temporary file.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_fits(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::Builder::new()
        .suffix(".fits")
        .tempfile()
        .expect("create temp file");
    f.write_all(data).expect("write FITS data");
    f.flush().expect("flush");
    f
}
