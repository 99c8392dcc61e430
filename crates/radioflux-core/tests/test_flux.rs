mod common;

use std::path::PathBuf;

use approx::assert_relative_eq;
use common::{build_fits, image_header, radio_keywords, write_test_fits};
use radioflux_core::config::FluxConfig;
use radioflux_core::error::RadioError;
use radioflux_core::flux::{flux_for_files, measure_file, FluxRecord, FluxRequest};
use radioflux_core::io::HeaderValue;
use radioflux_core::resolve::{beam_area, ConstructionMode};

const MODE: ConstructionMode = ConstructionMode::Quiet;

/// 8x8 map, 0.001 deg pixels, 10-pixel circular beam at 1.4 GHz.
fn continuum_fits(values: &[f32]) -> tempfile::NamedTempFile {
    let mut keys = radio_keywords(0.001, 10.0);
    keys.push(("RESTFRQ", HeaderValue::from(1.4e9)));
    let header = image_header(&[8, 8], &keys);
    write_test_fits(&build_fits(&header, values))
}

fn config(foreground: &str) -> FluxConfig {
    FluxConfig {
        foreground: foreground.to_string(),
        ..FluxConfig::default()
    }
}

fn request(config: &FluxConfig) -> FluxRequest {
    FluxRequest::from_config(config, MODE).unwrap()
}

#[test]
fn test_full_frame_flux() {
    let file = continuum_fits(&[1.0; 64]);
    let measurement = measure_file(file.path(), &request(&config("box(4.5,4.5,8,8)"))).unwrap();

    assert_relative_eq!(measurement.map.beam_major_pixels(), 10.0, epsilon = 1e-9);
    assert_relative_eq!(measurement.map.beam_area_pixels(), 113.3090, epsilon = 1e-4);
    assert!(measurement.background.is_none());

    let record = &measurement.records[0];
    assert_eq!(record.label, None);
    assert_eq!(record.pixel_count, 64);
    assert_eq!(record.channels.len(), 1);
    let channel = &record.channels[0];
    assert_eq!(channel.frequency, 1.4e9);
    assert_relative_eq!(channel.flux, 64.0 / beam_area(10.0, 10.0), epsilon = 1e-9);
    assert_eq!(channel.error, None);
}

#[test]
fn test_background_noise_and_subtraction() {
    // Left half alternates 0/2 (mean 1, rms 1), right half is 5.
    let values: Vec<f32> = (0..64)
        .map(|i| {
            let (row, col) = (i / 8, i % 8);
            if col < 4 {
                if (row + col) % 2 == 0 {
                    0.0
                } else {
                    2.0
                }
            } else {
                5.0
            }
        })
        .collect();
    let file = continuum_fits(&values);
    let config = FluxConfig {
        foreground: "box(6.5,4.5,4,8)".into(),
        background: Some("box(2.5,4.5,4,8)".into()),
        subtract_background: true,
        ..FluxConfig::default()
    };
    let measurement = measure_file(file.path(), &request(&config)).unwrap();

    let bg = measurement.background.as_ref().unwrap();
    assert_eq!(bg.pixel_count, 32);
    assert_relative_eq!(bg.mean[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(bg.rms[0], 1.0, epsilon = 1e-12);

    let area = beam_area(10.0, 10.0);
    let channel = &measurement.records[0].channels[0];
    assert_relative_eq!(channel.flux, 32.0 * 4.0 / area, epsilon = 1e-9);
    assert_relative_eq!(channel.mean, 4.0, epsilon = 1e-12);
    let error = channel.error.unwrap();
    assert_relative_eq!(error, (32.0 / area).sqrt(), epsilon = 1e-9);
}

#[test]
fn test_individual_regions_are_labelled() {
    let file = continuum_fits(&[1.0; 64]);
    let config = FluxConfig {
        foreground: "box(2.5,2.5,4,4)\nbox(6.5,6.5,4,4)\n-circle(7,7,0.5)".into(),
        individual: true,
        ..FluxConfig::default()
    };
    let measurement = measure_file(file.path(), &request(&config)).unwrap();
    let labels: Vec<Option<usize>> = measurement.records.iter().map(|r| r.label).collect();
    assert_eq!(labels, vec![Some(1), Some(2)]);
    assert_eq!(measurement.records[0].pixel_count, 16);
    assert_eq!(measurement.records[1].pixel_count, 15);
}

#[test]
fn test_cube_reports_every_channel() {
    let mut keys = radio_keywords(0.001, 10.0);
    keys.extend([
        ("CTYPE3", HeaderValue::from("FREQ")),
        ("CRVAL3", HeaderValue::from(1.0e9)),
        ("CDELT3", HeaderValue::from(5.0e8)),
        ("CTYPE4", HeaderValue::from("STOKES")),
    ]);
    let header = image_header(&[2, 2, 3, 1], &keys);
    let values: Vec<f32> = (0..12).map(|i| (i / 4) as f32).collect();
    let file = write_test_fits(&build_fits(&header, &values));

    let measurement = measure_file(file.path(), &request(&config("box(1.5,1.5,2,2)"))).unwrap();
    let record = &measurement.records[0];
    let frequencies: Vec<f64> = record.channels.iter().map(|c| c.frequency).collect();
    assert_eq!(frequencies, vec![1.0e9, 1.5e9, 2.0e9]);
    let area = beam_area(10.0, 10.0);
    for (i, channel) in record.channels.iter().enumerate() {
        assert_relative_eq!(channel.flux, 4.0 * i as f64 / area, epsilon = 1e-9);
    }
}

#[test]
fn test_batch_stops_on_first_failure() {
    let good = continuum_fits(&[1.0; 64]);
    let missing = PathBuf::from("/nonexistent/radioflux/missing.fits");
    let files = vec![good.path().to_path_buf(), missing.clone(), good.path().to_path_buf()];

    let mut seen: Vec<FluxRecord> = Vec::new();
    let result = flux_for_files(&files, &request(&config("box(4.5,4.5,8,8)")), |r| {
        seen.push(r.clone())
    });
    match result {
        Err(RadioError::File { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected a file error, got {other:?}"),
    }
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_batch_keep_going() {
    let good = continuum_fits(&[1.0; 64]);
    let missing = PathBuf::from("/nonexistent/radioflux/missing.fits");
    let files = vec![good.path().to_path_buf(), missing, good.path().to_path_buf()];
    let config = FluxConfig {
        foreground: "box(4.5,4.5,8,8)".into(),
        keep_going: true,
        ..FluxConfig::default()
    };

    let mut count = 0;
    let summary = flux_for_files(&files, &request(&config), |_| count += 1).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(count, 2);
}

#[test]
fn test_request_validation_happens_before_io() {
    assert!(matches!(
        FluxRequest::from_config(&config(""), MODE),
        Err(RadioError::RegionParse(_))
    ));

    let subtract_without_background = FluxConfig {
        foreground: "circle(1,1,1)".into(),
        subtract_background: true,
        ..FluxConfig::default()
    };
    assert!(matches!(
        FluxRequest::from_config(&subtract_without_background, MODE),
        Err(RadioError::BackgroundRequired)
    ));
}

#[test]
fn test_beamless_file_is_an_error() {
    let header = image_header(&[2, 2], &[("CDELT1", (-0.001).into()), ("CDELT2", 0.001.into())]);
    let file = write_test_fits(&build_fits(&header, &[1.0; 4]));
    assert!(matches!(
        measure_file(file.path(), &request(&config("circle(1,1,1)"))),
        Err(RadioError::BeamNotFound)
    ));
}

#[test]
fn test_config_toml() {
    let parsed: FluxConfig = toml::from_str(
        r#"
        foreground = "source.reg"
        background = "sky.reg"
        subtract_background = true
        "#,
    )
    .unwrap();
    assert_eq!(parsed.foreground, "source.reg");
    assert_eq!(parsed.background.as_deref(), Some("sky.reg"));
    assert!(parsed.subtract_background);
    assert!(!parsed.individual);
    assert!(!parsed.keep_going);

    let defaults: FluxConfig = toml::from_str("").unwrap();
    assert_eq!(defaults, FluxConfig::default());
    assert_eq!(defaults.foreground, "ds9.reg");

    let text = toml::to_string_pretty(&parsed).unwrap();
    assert_eq!(toml::from_str::<FluxConfig>(&text).unwrap(), parsed);
}
