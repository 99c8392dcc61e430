use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FITS file: {0}")]
    InvalidFits(String),

    #[error("Unsupported BITPIX: {0}")]
    UnsupportedBitpix(i64),

    #[error("No beam information found")]
    BeamNotFound,

    #[error("Pixels are not square ({cd1}, {cd2}) and beam is elliptical")]
    AsymmetricBeam { cd1: f64, cd2: f64 },

    #[error("Invalid pixel scale on axis {axis}: {reason}")]
    InvalidPixelScale { axis: usize, reason: String },

    #[error("Can't make map from this: NAXIS = {0}")]
    InsufficientAxes(usize),

    #[error("Too many axes: NAXIS = {0} (at most 4 supported)")]
    TooManyAxes(usize),

    #[error("Unknown axis type on axis {axis}: {ctype:?}")]
    UnknownAxis { axis: usize, ctype: String },

    #[error("Can't deal with {planes} Stokes planes, only single-polarization maps are supported")]
    MultiStokes { planes: usize },

    #[error("More than one frequency axis with multiple channels (axes {first} and {second})")]
    DuplicateFrequencyAxis { first: usize, second: usize },

    #[error("Background subtraction requested but no background region")]
    BackgroundRequired,

    #[error("Region error: {0}")]
    RegionParse(String),

    #[error("Mask shape {mask:?} does not match plane shape {plane:?}")]
    MaskShape {
        mask: (usize, usize),
        plane: (usize, usize),
    },

    #[error("Expected {expected} per-channel values for {what}, got {actual}")]
    ChannelMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<RadioError>,
    },
}

pub type Result<T> = std::result::Result<T, RadioError>;
