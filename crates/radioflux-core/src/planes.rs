use ndarray::{Array2, ArrayD, ArrayViewD, Axis, Ix2};
use tracing::debug;

use crate::consts::{MAX_AXES, MIN_AXES, PLANE_COPY_KEYWORDS};
use crate::error::{RadioError, Result};
use crate::io::FitsHeader;
use crate::resolve::{axis_increment, resolve_frequency, ConstructionMode};

/// Meaning of a non-spatial image axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisKind {
    Frequency,
    Stokes,
}

/// A classified axis beyond the two spatial ones.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraAxis {
    /// FITS axis number (3 or 4).
    pub number: usize,
    pub kind: AxisKind,
    pub length: usize,
    pub crval: Option<f64>,
    pub cdelt: Option<f64>,
}

/// Per-channel planes of one image, in channel order.
#[derive(Clone, Debug)]
pub struct PlaneSet {
    pub is_cube: bool,
    pub planes: Vec<Array2<f64>>,
    pub headers: Vec<FitsHeader>,
    pub frequencies: Vec<f64>,
}

/// Classify axes `3..=naxis` by their `CTYPE`.
///
/// `shape` is the data shape in array order (NAXISn first).
pub fn classify_axes(header: &FitsHeader, shape: &[usize]) -> Result<Vec<ExtraAxis>> {
    let naxis = shape.len();
    (3..=naxis)
        .map(|number| {
            let ctype = header
                .get_str(&format!("CTYPE{number}"))
                .unwrap_or("")
                .to_ascii_uppercase();
            let kind = if ctype.contains("FREQ") {
                AxisKind::Frequency
            } else if ctype.contains("STOKES") {
                AxisKind::Stokes
            } else {
                return Err(RadioError::UnknownAxis {
                    axis: number,
                    ctype,
                });
            };
            let length = shape[naxis - number];
            if kind == AxisKind::Stokes && length > 1 {
                return Err(RadioError::MultiStokes { planes: length });
            }
            Ok(ExtraAxis {
                number,
                kind,
                length,
                crval: header.get_f64(&format!("CRVAL{number}")),
                cdelt: header.get_f64(&format!("CDELT{number}")),
            })
        })
        .collect()
}

/// Split an image into 2-D planes, one per frequency channel.
///
/// A 2-D image is returned unchanged as a single plane with the original
/// header. For cubes the spectral axis (if any) selects the channel and
/// every other extra axis is collapsed to its first index.
pub fn extract_planes(
    header: &FitsHeader,
    data: ArrayD<f64>,
    mode: ConstructionMode,
) -> Result<PlaneSet> {
    let naxis = header
        .get_i64("NAXIS")
        .map(|n| n.max(0) as usize)
        .unwrap_or(data.ndim());
    if naxis < MIN_AXES {
        return Err(RadioError::InsufficientAxes(naxis));
    }
    if naxis > MAX_AXES {
        return Err(RadioError::TooManyAxes(naxis));
    }
    if data.ndim() != naxis {
        return Err(RadioError::InvalidFits(format!(
            "NAXIS = {} but data has {} dimensions",
            naxis,
            data.ndim()
        )));
    }

    if naxis == 2 {
        let plane = data
            .into_dimensionality::<Ix2>()
            .map_err(|e| RadioError::InvalidFits(e.to_string()))?;
        return Ok(PlaneSet {
            is_cube: false,
            planes: vec![plane],
            headers: vec![header.clone()],
            frequencies: vec![resolve_frequency(header, mode)],
        });
    }

    let extra = classify_axes(header, data.shape())?;
    if let Some(empty) = extra.iter().find(|a| a.length == 0) {
        return Err(RadioError::InvalidFits(format!(
            "axis {} has zero length",
            empty.number
        )));
    }
    let spectral = spectral_axis(&extra)?;

    let frequencies = match spectral {
        Some(axis) => {
            let base = axis
                .crval
                .unwrap_or_else(|| resolve_frequency(header, mode));
            let step = axis.cdelt.unwrap_or(0.0);
            (0..axis.length).map(|i| base + step * i as f64).collect()
        }
        None => vec![resolve_frequency(header, mode)],
    };
    debug!(
        naxis,
        channels = frequencies.len(),
        spectral_axis = spectral.map(|a| a.number),
        "Classified cube axes"
    );

    let (rows, cols) = {
        let shape = data.shape();
        (shape[naxis - 2], shape[naxis - 1])
    };
    let plane_header = flatten_header(header, rows, cols)?;

    let view = data.view();
    let planes = (0..frequencies.len())
        .map(|channel| {
            slice_plane(view.clone(), naxis, |number| match spectral {
                Some(axis) if axis.number == number => channel,
                _ => 0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PlaneSet {
        is_cube: true,
        headers: vec![plane_header; planes.len()],
        planes,
        frequencies,
    })
}

/// The axis that indexes channels: the first frequency axis with more
/// than one plane, else the first frequency axis at all.
fn spectral_axis(extra: &[ExtraAxis]) -> Result<Option<&ExtraAxis>> {
    let mut multi = extra
        .iter()
        .filter(|a| a.kind == AxisKind::Frequency && a.length > 1);
    if let Some(first) = multi.next() {
        if let Some(second) = multi.next() {
            return Err(RadioError::DuplicateFrequencyAxis {
                first: first.number,
                second: second.number,
            });
        }
        return Ok(Some(first));
    }
    Ok(extra.iter().find(|a| a.kind == AxisKind::Frequency))
}

/// Fix every extra axis at the index chosen by `index_of` and return the
/// remaining spatial plane.
fn slice_plane(
    mut view: ArrayViewD<'_, f64>,
    naxis: usize,
    index_of: impl Fn(usize) -> usize,
) -> Result<Array2<f64>> {
    // FITS axis `naxis` is always the outermost remaining array axis.
    for number in (3..=naxis).rev() {
        view = view.index_axis_move(Axis(0), index_of(number));
    }
    view.into_dimensionality::<Ix2>()
        .map(|v| v.to_owned())
        .map_err(|e| RadioError::InvalidFits(e.to_string()))
}

/// Two-axis coordinate header for a flattened plane: spatial `CRPIX`,
/// `CDELT`, `CRVAL`, `CTYPE` plus `EQUINOX`/`EPOCH`.
pub fn flatten_header(header: &FitsHeader, rows: usize, cols: usize) -> Result<FitsHeader> {
    let mut flat = FitsHeader::new();
    flat.set("NAXIS", 2i64);
    flat.set("NAXIS1", cols as i64);
    flat.set("NAXIS2", rows as i64);
    for axis in 1..=2 {
        flat.set(
            &format!("CRPIX{axis}"),
            header.get_f64(&format!("CRPIX{axis}")).unwrap_or(0.0),
        );
        flat.set(&format!("CDELT{axis}"), axis_increment(header, axis)?);
        flat.set(
            &format!("CRVAL{axis}"),
            header.get_f64(&format!("CRVAL{axis}")).unwrap_or(0.0),
        );
        if let Some(ctype) = header.get_str(&format!("CTYPE{axis}")) {
            flat.set(&format!("CTYPE{axis}"), ctype);
        }
    }
    for key in PLANE_COPY_KEYWORDS {
        if let Some(value) = header.get(key) {
            flat.set(key, value.clone());
        }
    }
    Ok(flat)
}
