use std::path::Path;

use fitsio_pure::hdu::{parse_fits, HduInfo};
use fitsio_pure::image::read_image_physical;
use ndarray::{ArrayD, IxDyn};
use tracing::debug;

use crate::error::{RadioError, Result};
use crate::io::header::FitsHeader;

/// Decoded primary HDU: header plus pixel values as `f64`.
///
/// Array axes are in reverse FITS order, so `data.shape()[0]` is `NAXISn`
/// and the last axis is `NAXIS1`.
#[derive(Clone, Debug)]
pub struct FitsImage {
    pub header: FitsHeader,
    pub data: ArrayD<f64>,
}

impl FitsImage {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode the primary HDU of an in-memory FITS file, applying
    /// `BSCALE`/`BZERO` and mapping `BLANK` integers to NaN.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fits = parse_fits(bytes).map_err(fits_error)?;
        let primary = fits.primary();
        let axes = match &primary.info {
            HduInfo::Primary { naxes, .. } => naxes.clone(),
            _ => return Err(RadioError::InvalidFits("First HDU is not primary".into())),
        };
        let header = FitsHeader::from_cards(&primary.cards);
        let values = read_image_physical(bytes, primary).map_err(fits_error)?;
        debug!(
            cards = header.len(),
            hdus = fits.len(),
            ?axes,
            "Read FITS primary HDU"
        );

        let shape: Vec<usize> = if axes.is_empty() {
            vec![0]
        } else {
            axes.iter().rev().copied().collect()
        };
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| RadioError::InvalidFits(format!("Bad data shape: {e}")))?;
        Ok(Self { header, data })
    }
}

fn fits_error(err: fitsio_pure::Error) -> RadioError {
    match err {
        fitsio_pure::Error::InvalidBitpix(bitpix) => RadioError::UnsupportedBitpix(bitpix),
        fitsio_pure::Error::Io(e) => RadioError::Io(e),
        other => RadioError::InvalidFits(other.to_string()),
    }
}
