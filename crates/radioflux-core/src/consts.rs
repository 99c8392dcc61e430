/// Brightness unit the flux normalisation assumes.
pub const EXPECTED_UNITS: &str = "JY/BEAM";

/// Relative tolerance used to decide whether pixels are square and
/// whether the beam is circular (0.01%).
pub const SHAPE_TOLERANCE: f64 = 1.0e-4;

/// Marker that identifies AIPS clean-beam records in HISTORY cards.
pub const CLEAN_BEAM_MARKER: &str = "CLEAN BMAJ";

/// Keyword pairs searched, in order, for the restoring beam (degrees).
pub const BEAM_KEYWORDS: [(&str, &str); 2] = [("BMAJ", "BMIN"), ("RESOL1", "RESOL2")];

/// Keywords searched, in order, for the image brightness unit.
pub const UNIT_KEYWORDS: [&str; 2] = ["BUNIT", "UNIT"];

/// Keywords searched, in order, for a whole-file frequency (Hz).
pub const FREQUENCY_KEYWORDS: [&str; 3] = ["RESTFRQ", "RESTFREQ", "FREQ"];

/// Sentinel stored when no frequency could be found.
pub const UNKNOWN_FREQUENCY: f64 = 0.0;

/// Smallest and largest image dimensionality a map can be built from.
pub const MIN_AXES: usize = 2;
pub const MAX_AXES: usize = 4;

/// Keywords copied verbatim into each flattened plane header.
pub const PLANE_COPY_KEYWORDS: [&str; 2] = ["EQUINOX", "EPOCH"];

/// Default foreground region file, as used by the ds9 analysis plugin.
pub const DEFAULT_FOREGROUND_REGION: &str = "ds9.reg";

/// Gaussian FWHM-to-sigma factor, 2*sqrt(2 ln 2).
pub fn gaussian_fwhm_factor() -> f64 {
    2.0 * (2.0 * std::f64::consts::LN_2).sqrt()
}
