use ndarray::Array2;

use crate::error::{RadioError, Result};
use crate::radiomap::RadioMap;

/// Optional per-channel inputs to a region measurement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasureOptions {
    /// Level subtracted from every selected pixel, one value per channel.
    pub background: Option<Vec<f64>>,
    /// Off-source noise (typically a background-region RMS), one value per
    /// channel. Enables the propagated flux error.
    pub offsource_noise: Option<Vec<f64>>,
}

impl MeasureOptions {
    /// Options derived from a measured background region.
    ///
    /// The background RMS always becomes the off-source noise; its mean is
    /// only subtracted when `subtract_background` is set, and asking for
    /// subtraction without a background region is an error.
    pub fn from_background(
        subtract_background: bool,
        background: Option<&RegionResult>,
    ) -> Result<Self> {
        match background {
            Some(bg) => Ok(Self {
                background: subtract_background.then(|| bg.mean.clone()),
                offsource_noise: Some(bg.rms.clone()),
            }),
            None if subtract_background => Err(RadioError::BackgroundRequired),
            None => Ok(Self::default()),
        }
    }
}

/// Statistics of one region applied to every channel of a map.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionResult {
    /// Number of pixels selected by the mask, NaN pixels included.
    pub pixel_count: usize,
    pub mean: Vec<f64>,
    pub rms: Vec<f64>,
    /// Sum of finite selected values divided by the beam area.
    pub flux: Vec<f64>,
    pub error: Option<Vec<f64>>,
}

impl RegionResult {
    pub fn channel_count(&self) -> usize {
        self.flux.len()
    }
}

/// Apply one mask to every plane of `map`.
///
/// Region geometry does not depend on frequency, so the same mask serves
/// all channels.
pub fn apply_region(
    map: &RadioMap,
    mask: &Array2<bool>,
    options: &MeasureOptions,
) -> Result<RegionResult> {
    let masks = vec![mask; map.channel_count()];
    measure(map, &masks, options)
}

/// Apply one mask per plane. The pixel count is taken from the first mask.
pub fn apply_region_masks(
    map: &RadioMap,
    masks: &[Array2<bool>],
    options: &MeasureOptions,
) -> Result<RegionResult> {
    let masks: Vec<&Array2<bool>> = masks.iter().collect();
    measure(map, &masks, options)
}

fn measure(
    map: &RadioMap,
    masks: &[&Array2<bool>],
    options: &MeasureOptions,
) -> Result<RegionResult> {
    let channels = map.channel_count();
    check_channels("masks", channels, masks.len())?;
    if let Some(ref bg) = options.background {
        check_channels("background", channels, bg.len())?;
    }
    if let Some(ref noise) = options.offsource_noise {
        check_channels("off-source noise", channels, noise.len())?;
    }
    for (mask, plane) in masks.iter().zip(map.planes()) {
        if mask.dim() != plane.dim() {
            return Err(RadioError::MaskShape {
                mask: mask.dim(),
                plane: plane.dim(),
            });
        }
    }

    let pixel_count = masks
        .first()
        .map(|m| m.iter().filter(|&&selected| selected).count())
        .unwrap_or(0);
    let area = map.beam_area_pixels();

    let mut mean = Vec::with_capacity(channels);
    let mut rms = Vec::with_capacity(channels);
    let mut flux = Vec::with_capacity(channels);
    for (channel, (plane, mask)) in map.planes().iter().zip(masks).enumerate() {
        let level = options
            .background
            .as_ref()
            .map_or(0.0, |bg| bg[channel]);
        let values: Vec<f64> = plane
            .iter()
            .zip(mask.iter())
            .filter(|(_, selected)| **selected)
            .map(|(&v, _)| v - level)
            .collect();
        let stats = FiniteStats::of(&values);
        mean.push(stats.mean());
        rms.push(stats.std_dev());
        flux.push(stats.sum / area);
    }

    let error = options
        .offsource_noise
        .as_ref()
        .map(|noise| propagate_error(noise, pixel_count, area));

    Ok(RegionResult {
        pixel_count,
        mean,
        rms,
        flux,
        error,
    })
}

/// Beam-correlated noise propagation: `noise * sqrt(pixels / beam_area)`.
pub fn propagate_error(noise: &[f64], pixel_count: usize, beam_area: f64) -> Vec<f64> {
    let independent_beams = (pixel_count as f64 / beam_area).sqrt();
    noise.iter().map(|n| n * independent_beams).collect()
}

fn check_channels(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(RadioError::ChannelMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Sum, mean and population standard deviation over finite values only.
struct FiniteStats {
    count: usize,
    sum: f64,
    sum_sq_dev: f64,
}

impl FiniteStats {
    fn of(values: &[f64]) -> Self {
        let finite = || values.iter().copied().filter(|v| v.is_finite());
        let count = finite().count();
        let sum: f64 = finite().sum();
        let sum_sq_dev = if count == 0 {
            0.0
        } else {
            let mean = sum / count as f64;
            finite().map(|v| (v - mean).powi(2)).sum()
        };
        Self {
            count,
            sum,
            sum_sq_dev,
        }
    }

    /// NaN when no finite value was selected.
    fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }

    fn std_dev(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            (self.sum_sq_dev / self.count as f64).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_stats_skip_nan() {
        let stats = FiniteStats::of(&[1.0, f64::NAN, 3.0]);
        assert_eq!(stats.count, 2);
        assert!((stats.sum - 4.0).abs() < 1e-12);
        assert!((stats.mean() - 2.0).abs() < 1e-12);
        assert!((stats.std_dev() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_finite_stats_empty() {
        let stats = FiniteStats::of(&[f64::NAN]);
        assert_eq!(stats.sum, 0.0);
        assert!(stats.mean().is_nan());
        assert!(stats.std_dev().is_nan());
    }
}
