mod common;

use common::{data_array, image_header, radio_keywords};
use radioflux_core::error::RadioError;
use radioflux_core::io::HeaderValue;
use radioflux_core::planes::{classify_axes, extract_planes, flatten_header, AxisKind};
use radioflux_core::radiomap::RadioMap;
use radioflux_core::resolve::ConstructionMode;

const MODE: ConstructionMode = ConstructionMode::Quiet;

fn cube_keywords(extra: &[(&'static str, HeaderValue)]) -> Vec<(&'static str, HeaderValue)> {
    let mut keys = radio_keywords(0.001, 3.0);
    keys.extend(extra.iter().cloned());
    keys
}

fn sequential(n: usize) -> Vec<f64> {
    (0..n).map(|v| v as f64).collect()
}

#[test]
fn test_two_dimensional_image_is_single_plane() {
    let keys = cube_keywords(&[("RESTFRQ", 1.4e9.into())]);
    let header = image_header(&[4, 3], &keys);
    let set = extract_planes(&header, data_array(&[4, 3], sequential(12)), MODE).unwrap();

    assert!(!set.is_cube);
    assert_eq!(set.planes.len(), 1);
    assert_eq!(set.planes[0].dim(), (3, 4));
    assert_eq!(set.planes[0][[1, 2]], 6.0);
    assert_eq!(set.headers[0], header);
    assert_eq!(set.frequencies, vec![1.4e9]);
}

#[test]
fn test_frequency_cube_channels() {
    let keys = cube_keywords(&[
        ("CTYPE3", "FREQ".into()),
        ("CRVAL3", 1.0e9.into()),
        ("CDELT3", 1.0e6.into()),
        ("CRPIX3", 1.0.into()),
    ]);
    let header = image_header(&[2, 2, 3], &keys);
    let set = extract_planes(&header, data_array(&[2, 2, 3], sequential(12)), MODE).unwrap();

    assert!(set.is_cube);
    assert_eq!(set.frequencies, vec![1.0e9, 1.001e9, 1.002e9]);
    assert_eq!(set.planes.len(), 3);
    for (channel, plane) in set.planes.iter().enumerate() {
        assert_eq!(plane.dim(), (2, 2));
        assert_eq!(plane[[0, 0]], (channel * 4) as f64);
        assert_eq!(plane[[1, 1]], (channel * 4 + 3) as f64);
    }
}

#[test]
fn test_single_stokes_axis_is_dropped() {
    let keys = cube_keywords(&[
        ("CTYPE3", "FREQ".into()),
        ("CRVAL3", 1.4e9.into()),
        ("CDELT3", 1.0e6.into()),
        ("CTYPE4", "STOKES".into()),
        ("CRVAL4", 1.0.into()),
    ]);
    let header = image_header(&[2, 2, 2, 1], &keys);
    let set = extract_planes(&header, data_array(&[2, 2, 2, 1], sequential(8)), MODE).unwrap();

    assert_eq!(set.planes.len(), 2);
    assert_eq!(set.planes[1][[0, 0]], 4.0);
    assert_eq!(set.frequencies, vec![1.4e9, 1.401e9]);
}

#[test]
fn test_spectral_axis_on_fourth_axis() {
    let keys = cube_keywords(&[
        ("CTYPE3", "STOKES".into()),
        ("CTYPE4", "FREQ".into()),
        ("CRVAL4", 150e6.into()),
        ("CDELT4", 10e6.into()),
    ]);
    let header = image_header(&[2, 2, 1, 3], &keys);
    let set = extract_planes(&header, data_array(&[2, 2, 1, 3], sequential(12)), MODE).unwrap();

    assert_eq!(set.frequencies, vec![150e6, 160e6, 170e6]);
    assert_eq!(set.planes[2][[0, 0]], 8.0);
}

#[test]
fn test_multiple_stokes_rejected() {
    let keys = cube_keywords(&[
        ("CTYPE3", "FREQ".into()),
        ("CTYPE4", "STOKES".into()),
    ]);
    let header = image_header(&[2, 2, 1, 4], &keys);
    let result = extract_planes(&header, data_array(&[2, 2, 1, 4], sequential(16)), MODE);
    assert!(matches!(result, Err(RadioError::MultiStokes { planes: 4 })));
}

#[test]
fn test_unknown_axis_rejected() {
    let keys = cube_keywords(&[("CTYPE3", "VELO-LSR".into())]);
    let header = image_header(&[2, 2, 2], &keys);
    let result = extract_planes(&header, data_array(&[2, 2, 2], sequential(8)), MODE);
    match result {
        Err(RadioError::UnknownAxis { axis, ctype }) => {
            assert_eq!(axis, 3);
            assert_eq!(ctype, "VELO-LSR");
        }
        other => panic!("expected UnknownAxis, got {other:?}"),
    }
}

#[test]
fn test_axis_count_limits() {
    let keys = cube_keywords(&[]);
    let header = image_header(&[6], &keys);
    assert!(matches!(
        extract_planes(&header, data_array(&[6], sequential(6)), MODE),
        Err(RadioError::InsufficientAxes(1))
    ));

    let axes = [2, 2, 1, 1, 1];
    let header = image_header(&axes, &keys);
    assert!(matches!(
        extract_planes(&header, data_array(&axes, sequential(4)), MODE),
        Err(RadioError::TooManyAxes(5))
    ));
}

#[test]
fn test_duplicate_frequency_axes_rejected() {
    let keys = cube_keywords(&[("CTYPE3", "FREQ".into()), ("CTYPE4", "FREQ-OBS".into())]);
    let header = image_header(&[2, 2, 2, 2], &keys);
    assert!(matches!(
        extract_planes(&header, data_array(&[2, 2, 2, 2], sequential(16)), MODE),
        Err(RadioError::DuplicateFrequencyAxis {
            first: 3,
            second: 4
        })
    ));
}

#[test]
fn test_stokes_only_cube_uses_file_frequency() {
    let keys = cube_keywords(&[("CTYPE3", "STOKES".into()), ("FREQ", 5.0e9.into())]);
    let header = image_header(&[2, 2, 1], &keys);
    let set = extract_planes(&header, data_array(&[2, 2, 1], sequential(4)), MODE).unwrap();
    assert!(set.is_cube);
    assert_eq!(set.frequencies, vec![5.0e9]);
    assert_eq!(set.planes.len(), 1);
}

#[test]
fn test_frequency_axis_without_increment() {
    let keys = cube_keywords(&[("CTYPE3", "FREQ".into()), ("RESTFRQ", 8.0e9.into())]);
    let header = image_header(&[2, 2, 2], &keys);
    let set = extract_planes(&header, data_array(&[2, 2, 2], sequential(8)), MODE).unwrap();
    assert_eq!(set.frequencies, vec![8.0e9, 8.0e9]);
}

#[test]
fn test_classify_axes() {
    let keys = cube_keywords(&[
        ("CTYPE3", "freq".into()),
        ("CRVAL3", 1.0e9.into()),
        ("CTYPE4", "STOKES".into()),
    ]);
    let header = image_header(&[4, 4, 5, 1], &keys);
    let axes = classify_axes(&header, &[1, 5, 4, 4]).unwrap();
    assert_eq!(axes.len(), 2);
    assert_eq!(axes[0].kind, AxisKind::Frequency);
    assert_eq!(axes[0].length, 5);
    assert_eq!(axes[0].crval, Some(1.0e9));
    assert_eq!(axes[1].kind, AxisKind::Stokes);
    assert_eq!(axes[1].number, 4);
}

#[test]
fn test_flattened_plane_header() {
    let keys = cube_keywords(&[
        ("CTYPE3", "FREQ".into()),
        ("CRVAL3", 1.0e9.into()),
        ("EQUINOX", 2000.0.into()),
    ]);
    let header = image_header(&[5, 4, 2], &keys);
    let flat = flatten_header(&header, 4, 5).unwrap();

    assert_eq!(flat.get_i64("NAXIS"), Some(2));
    assert_eq!(flat.get_i64("NAXIS1"), Some(5));
    assert_eq!(flat.get_i64("NAXIS2"), Some(4));
    assert_eq!(flat.get_f64("CDELT1"), Some(-0.001));
    assert_eq!(flat.get_f64("CRVAL2"), Some(45.0));
    assert_eq!(flat.get_str("CTYPE1"), Some("RA---SIN"));
    assert_eq!(flat.get_f64("EQUINOX"), Some(2000.0));
    assert!(!flat.contains("CTYPE3"));
    assert!(!flat.contains("BMAJ"));
}

#[test]
fn test_radiomap_cube_shares_plane_headers() {
    let keys = cube_keywords(&[
        ("CTYPE3", "FREQ".into()),
        ("CRVAL3", 1.0e9.into()),
        ("CDELT3", 2.0e6.into()),
    ]);
    let header = image_header(&[3, 2, 4], &keys);
    let map = RadioMap::from_parts(header, data_array(&[3, 2, 4], sequential(24)), MODE).unwrap();

    assert!(map.is_cube());
    assert_eq!(map.channel_count(), 4);
    assert_eq!(map.plane_shape(), (2, 3));
    assert_eq!(map.plane_headers().len(), 4);
    assert!(map.plane_headers().windows(2).all(|w| w[0] == w[1]));
    assert!((map.beam_major_pixels() - 3.0).abs() < 1e-9);
    assert_eq!(map.units(), Some("JY/BEAM"));
}
