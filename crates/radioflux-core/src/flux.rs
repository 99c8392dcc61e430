use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::FluxConfig;
use crate::error::{RadioError, Result};
use crate::radiomap::RadioMap;
use crate::region::Region;
use crate::resolve::ConstructionMode;
use crate::stats::{apply_region, apply_region_masks, MeasureOptions, RegionResult};

/// A validated measurement request: regions parsed, options checked.
#[derive(Clone, Debug)]
pub struct FluxRequest {
    pub foreground: Region,
    pub background: Option<Region>,
    pub individual: bool,
    pub subtract_background: bool,
    pub keep_going: bool,
    pub mode: ConstructionMode,
}

impl FluxRequest {
    /// Validate a config before any image is opened.
    pub fn from_config(config: &FluxConfig, mode: ConstructionMode) -> Result<Self> {
        if config.foreground.trim().is_empty() {
            return Err(RadioError::RegionParse(
                "a foreground region is required".into(),
            ));
        }
        let background_spec = config
            .background
            .as_deref()
            .filter(|spec| !spec.trim().is_empty());
        if config.subtract_background && background_spec.is_none() {
            return Err(RadioError::BackgroundRequired);
        }

        Ok(Self {
            foreground: Region::from_spec(&config.foreground)?,
            background: background_spec.map(Region::from_spec).transpose()?,
            individual: config.individual,
            subtract_background: config.subtract_background,
            keep_going: config.keep_going,
            mode,
        })
    }
}

/// Flux of one region in one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelFlux {
    pub frequency: f64,
    pub flux: f64,
    pub error: Option<f64>,
    pub mean: f64,
    pub rms: f64,
}

/// Result of one foreground region (or sub-region) on one file.
#[derive(Clone, Debug, PartialEq)]
pub struct FluxRecord {
    pub file: PathBuf,
    /// Sub-region number, from 1, in individual mode.
    pub label: Option<usize>,
    pub pixel_count: usize,
    pub channels: Vec<ChannelFlux>,
}

/// Everything measured on one file.
#[derive(Clone, Debug)]
pub struct FileMeasurement {
    pub map: RadioMap,
    pub background: Option<RegionResult>,
    pub records: Vec<FluxRecord>,
}

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Measure a region on every channel, rasterizing once when all planes
/// share a coordinate header.
pub fn measure_region(
    map: &RadioMap,
    region: &Region,
    options: &MeasureOptions,
) -> Result<RegionResult> {
    let headers = map.plane_headers();
    let shape = map.plane_shape();
    let shared = headers.windows(2).all(|pair| pair[0] == pair[1]);
    match headers.first() {
        Some(first) if shared => apply_region(map, &region.mask(first, shape)?, options),
        _ => apply_region_masks(map, &region.masks(headers, shape)?, options),
    }
}

/// Open one file and measure the request on it.
pub fn measure_file(path: &Path, request: &FluxRequest) -> Result<FileMeasurement> {
    let map = RadioMap::open(path, request.mode)?;
    measure_map(path, map, request)
}

/// Measure background and foreground region(s) on an already built map.
/// A failing sub-region fails the whole file.
pub fn measure_map(path: &Path, map: RadioMap, request: &FluxRequest) -> Result<FileMeasurement> {
    let background = request
        .background
        .as_ref()
        .map(|region| measure_region(&map, region, &MeasureOptions::default()))
        .transpose()?;
    let options = MeasureOptions::from_background(request.subtract_background, background.as_ref())?;

    let regions: Vec<(Option<usize>, Region)> = if request.individual {
        request
            .foreground
            .split_individual()
            .into_iter()
            .enumerate()
            .map(|(n, region)| (Some(n + 1), region))
            .collect()
    } else {
        vec![(None, request.foreground.clone())]
    };

    let records = regions
        .iter()
        .map(|(label, region)| {
            let result = measure_region(&map, region, &options)?;
            Ok(to_record(path, *label, &map, &result))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FileMeasurement {
        map,
        background,
        records,
    })
}

fn to_record(path: &Path, label: Option<usize>, map: &RadioMap, result: &RegionResult) -> FluxRecord {
    let channels = map
        .frequencies()
        .iter()
        .enumerate()
        .map(|(i, &frequency)| ChannelFlux {
            frequency,
            flux: result.flux[i],
            error: result.error.as_ref().map(|e| e[i]),
            mean: result.mean[i],
            rms: result.rms[i],
        })
        .collect();
    FluxRecord {
        file: path.to_path_buf(),
        label,
        pixel_count: result.pixel_count,
        channels,
    }
}

/// Measure every file in turn, handing each record to `action`.
///
/// Each file is fully processed and released before the next is opened.
/// The first failure stops the batch unless `keep_going` is set, in which
/// case it is logged and counted.
pub fn flux_for_files<P, F>(files: &[P], request: &FluxRequest, mut action: F) -> Result<BatchSummary>
where
    P: AsRef<Path>,
    F: FnMut(&FluxRecord),
{
    let mut summary = BatchSummary::default();
    for file in files {
        let path = file.as_ref();
        match measure_file(path, request) {
            Ok(measurement) => {
                info!(
                    file = %path.display(),
                    channels = measurement.map.channel_count(),
                    records = measurement.records.len(),
                    "Measured file"
                );
                measurement.records.iter().for_each(&mut action);
                summary.processed += 1;
            }
            Err(e) if request.keep_going => {
                warn!(file = %path.display(), error = %e, "Skipping file");
                summary.failed += 1;
            }
            Err(e) => {
                return Err(RadioError::File {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })
            }
        }
    }
    Ok(summary)
}
