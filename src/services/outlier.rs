//! Location-outlier detection over simultaneous check-ins.
//!
//! Two interchangeable strategies over the located check-ins of one
//! class+date:
//!
//! - **Pairwise consensus** ([`consensus_statuses`]): each sample is judged
//!   by how many *other* samples sit within a fixed radius. Used to annotate
//!   live per-date views; needs at least two samples.
//! - **Centroid/deviation** ([`deviation_analysis`]): distances to the mean
//!   center, each judged against the mean and standard deviation of the
//!   *other* samples' distances. Used by the standalone detection pass
//!   ([`detect_class_outliers`]), which also persists the verdicts; needs at
//!   least three samples.
//!
//! Both strategies exclude the judged sample from its own reference
//! statistics. A pooled z-score over n values is bounded by sqrt(n-1), so a
//! pooled 2-sigma bar can never single out one bad sample among five;
//! self-exclusion removes that masking.

use chrono::NaiveDate;
use log::info;
use uuid::Uuid;

use crate::api::{ClassId, GeoPoint, LocationStatus, OutlierAnalysis, OutlierResult, StudentId};
use crate::db::repository::FullRepository;
use crate::services::{fetch_class, ServiceError};

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minimum sample count for the centroid/deviation strategy.
pub const MIN_DEVIATION_SAMPLES: usize = 3;

/// Tuning for both detection strategies.
#[derive(Debug, Clone, Copy)]
pub struct OutlierConfig {
    /// Pairwise-consensus radius in meters
    pub proximity_radius_m: f64,
    /// Minimum fraction of other samples within the radius
    pub proximity_quorum: f64,
    /// Standard-deviation multiplier for the centroid threshold
    pub deviation_multiplier: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            proximity_radius_m: 50.0,
            proximity_quorum: 0.5,
            deviation_multiplier: 2.0,
        }
    }
}

/// One located check-in.
#[derive(Debug, Clone, Copy)]
pub struct LocatedSample {
    pub record_id: Uuid,
    pub student_id: StudentId,
    pub point: GeoPoint,
}

/// Great-circle distance between two points in meters.
///
/// Haversine with mean Earth radius 6371 km:
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `c = 2·atan2(√a, √(1−a))`, `d = R·c`.
pub fn haversine_distance_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Pairwise-consensus verdicts, one per sample, in input order.
///
/// A sample is `Outlier` when the fraction of *other* samples within the
/// configured radius is below the quorum. With fewer than two samples there
/// is nothing to compare against and every verdict is `Unknown`.
pub fn consensus_statuses(samples: &[LocatedSample], config: &OutlierConfig) -> Vec<LocationStatus> {
    if samples.len() < 2 {
        return vec![LocationStatus::Unknown; samples.len()];
    }

    samples
        .iter()
        .map(|sample| {
            let nearby = samples
                .iter()
                .filter(|other| other.record_id != sample.record_id)
                .filter(|other| {
                    haversine_distance_m(&sample.point, &other.point) <= config.proximity_radius_m
                })
                .count();
            let fraction = nearby as f64 / (samples.len() - 1) as f64;
            if fraction < config.proximity_quorum {
                LocationStatus::Outlier
            } else {
                LocationStatus::Normal
            }
        })
        .collect()
}

/// Arithmetic mean of the sample coordinates.
fn mean_center(samples: &[LocatedSample]) -> GeoPoint {
    let n = samples.len() as f64;
    let lat = samples.iter().map(|s| s.point.latitude).sum::<f64>() / n;
    let lon = samples.iter().map(|s| s.point.longitude).sum::<f64>() / n;
    GeoPoint {
        latitude: lat,
        longitude: lon,
    }
}

/// Mean and population standard deviation.
fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Centroid/deviation analysis over the samples of one class+date.
///
/// Requires at least [`MIN_DEVIATION_SAMPLES`] samples; fewer is declined
/// with `InsufficientData` rather than treated as an exception.
///
/// Each sample's haversine distance to the mean center is compared against
/// `mean + multiplier·stddev` of the *other* samples' distances (population
/// standard deviation). When the other distances are degenerate (near-zero
/// spread) the consensus radius serves as an absolute margin instead. The
/// reported `outlier_threshold_m` is the same bound computed over the
/// distances of the samples that passed.
pub fn deviation_analysis(
    class_id: ClassId,
    date: NaiveDate,
    samples: &[LocatedSample],
    config: &OutlierConfig,
) -> Result<OutlierAnalysis, ServiceError> {
    if samples.len() < MIN_DEVIATION_SAMPLES {
        return Err(ServiceError::InsufficientData {
            found: samples.len(),
            required: MIN_DEVIATION_SAMPLES,
        });
    }

    let center = mean_center(samples);
    let distances: Vec<f64> = samples
        .iter()
        .map(|s| haversine_distance_m(&s.point, &center))
        .collect();

    let flags: Vec<bool> = distances
        .iter()
        .enumerate()
        .map(|(i, &distance)| {
            let others: Vec<f64> = distances
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, &d)| d)
                .collect();
            let (mean, stddev) = mean_and_stddev(&others);
            if stddev < 1e-6 {
                // Degenerate spread among the others; any bar derived from
                // it would flag on float noise.
                distance - mean > config.proximity_radius_m
            } else {
                distance > mean + config.deviation_multiplier * stddev
            }
        })
        .collect();

    let (mean_distance, _) = mean_and_stddev(&distances);

    let passing: Vec<f64> = distances
        .iter()
        .zip(&flags)
        .filter(|(_, &flagged)| !flagged)
        .map(|(&d, _)| d)
        .collect();
    let threshold_basis = if passing.is_empty() {
        &distances
    } else {
        &passing
    };
    let (pass_mean, pass_stddev) = mean_and_stddev(threshold_basis);
    let threshold = pass_mean + config.deviation_multiplier * pass_stddev;

    let results = samples
        .iter()
        .zip(distances.iter().zip(&flags))
        .map(|(sample, (&distance, &is_outlier))| OutlierResult {
            student_id: sample.student_id,
            record_id: sample.record_id,
            distance_m: distance,
            is_outlier,
        })
        .collect();

    Ok(OutlierAnalysis {
        class_id,
        date,
        mean_center: center,
        mean_distance_m: mean_distance,
        outlier_threshold_m: threshold,
        results,
    })
}

/// Run the centroid/deviation pass over a class+date and persist the
/// verdicts onto the matching records.
///
/// Idempotent: rerunning with unchanged inputs overwrites each record's
/// location status with the same value. Records without a location are left
/// untouched.
pub async fn detect_class_outliers<R: FullRepository + ?Sized>(
    repo: &R,
    class_id: ClassId,
    date: NaiveDate,
    config: &OutlierConfig,
) -> Result<OutlierAnalysis, ServiceError> {
    fetch_class(repo, class_id).await?;

    let records = repo.records_for_class_on(class_id, date).await?;
    let samples: Vec<LocatedSample> = records
        .iter()
        .filter_map(|r| {
            r.location.map(|point| LocatedSample {
                record_id: r.id,
                student_id: r.student_id,
                point,
            })
        })
        .collect();

    let analysis = deviation_analysis(class_id, date, &samples, config)?;

    for result in &analysis.results {
        let status = if result.is_outlier {
            LocationStatus::Outlier
        } else {
            LocationStatus::Normal
        };
        repo.update_location_status(result.record_id, status).await?;
    }

    info!(
        "Outlier pass for class {} on {}: {}/{} flagged (threshold {:.1} m)",
        class_id,
        date,
        analysis.results.iter().filter(|r| r.is_outlier).count(),
        analysis.results.len(),
        analysis.outlier_threshold_m
    );

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u128, lat: f64, lon: f64) -> LocatedSample {
        LocatedSample {
            record_id: Uuid::from_u128(id),
            student_id: StudentId::new(id as i64),
            point: GeoPoint {
                latitude: lat,
                longitude: lon,
            },
        }
    }

    #[test]
    fn test_haversine_zero_self_distance() {
        let p = GeoPoint::new(13.736717, 100.523186).unwrap();
        assert_eq!(haversine_distance_m(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_symmetry() {
        let a = GeoPoint::new(13.7367, 100.5232).unwrap();
        let b = GeoPoint::new(13.7400, 100.5300).unwrap();
        let ab = haversine_distance_m(&a, &b);
        let ba = haversine_distance_m(&b, &a);
        assert_eq!(ab, ba);
        assert!(ab > 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // One degree of latitude is ~111.2 km
        let a = GeoPoint::new(13.0, 100.0).unwrap();
        let b = GeoPoint::new(14.0, 100.0).unwrap();
        let d = haversine_distance_m(&a, &b);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn test_consensus_too_few_samples_unknown() {
        let config = OutlierConfig::default();
        assert!(consensus_statuses(&[], &config).is_empty());

        let one = vec![sample(1, 13.0, 100.0)];
        assert_eq!(
            consensus_statuses(&one, &config),
            vec![LocationStatus::Unknown]
        );
    }

    #[test]
    fn test_consensus_flags_distant_sample() {
        // Three clustered within meters, one ~1.1 km away
        let samples = vec![
            sample(1, 13.73670, 100.52320),
            sample(2, 13.73672, 100.52321),
            sample(3, 13.73671, 100.52318),
            sample(4, 13.74670, 100.52320),
        ];
        let verdicts = consensus_statuses(&samples, &OutlierConfig::default());
        assert_eq!(verdicts[0], LocationStatus::Normal);
        assert_eq!(verdicts[1], LocationStatus::Normal);
        assert_eq!(verdicts[2], LocationStatus::Normal);
        assert_eq!(verdicts[3], LocationStatus::Outlier);
    }

    #[test]
    fn test_consensus_all_nearby_normal() {
        let samples = vec![
            sample(1, 13.73670, 100.52320),
            sample(2, 13.73672, 100.52321),
        ];
        let verdicts = consensus_statuses(&samples, &OutlierConfig::default());
        assert_eq!(
            verdicts,
            vec![LocationStatus::Normal, LocationStatus::Normal]
        );
    }

    #[test]
    fn test_deviation_requires_three_samples() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let samples = vec![sample(1, 13.0, 100.0), sample(2, 13.0, 100.0)];
        let err = deviation_analysis(
            ClassId::new(1),
            date,
            &samples,
            &OutlierConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InsufficientData {
                found: 2,
                required: 3
            }
        ));
    }

    #[test]
    fn test_deviation_flags_distant_sample() {
        // Four samples clustered within ~5 m of each other, one ~500 m away
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let samples = vec![
            sample(1, 13.736700, 100.523200),
            sample(2, 13.736730, 100.523210),
            sample(3, 13.736710, 100.523190),
            sample(4, 13.736720, 100.523205),
            sample(5, 13.741200, 100.523200), // ~500 m north
        ];

        let analysis = deviation_analysis(
            ClassId::new(1),
            date,
            &samples,
            &OutlierConfig::default(),
        )
        .unwrap();

        let flagged: Vec<bool> = analysis.results.iter().map(|r| r.is_outlier).collect();
        assert_eq!(flagged, vec![false, false, false, false, true]);
        assert!(analysis.outlier_threshold_m < analysis.results[4].distance_m);
    }

    #[test]
    fn test_deviation_uniform_cluster_flags_nothing() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let samples = vec![
            sample(1, 13.736700, 100.523200),
            sample(2, 13.736705, 100.523205),
            sample(3, 13.736710, 100.523210),
        ];

        let analysis = deviation_analysis(
            ClassId::new(1),
            date,
            &samples,
            &OutlierConfig::default(),
        )
        .unwrap();
        assert!(analysis.results.iter().all(|r| !r.is_outlier));
    }

    #[test]
    fn test_deviation_coincident_points_flag_nothing() {
        // All samples at the same spot; degenerate spread must not flag
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let samples = vec![
            sample(1, 13.7367, 100.5232),
            sample(2, 13.7367, 100.5232),
            sample(3, 13.7367, 100.5232),
        ];

        let analysis = deviation_analysis(
            ClassId::new(1),
            date,
            &samples,
            &OutlierConfig::default(),
        )
        .unwrap();
        assert!(analysis.results.iter().all(|r| !r.is_outlier));
        assert_eq!(analysis.mean_distance_m, 0.0);
    }

    #[test]
    fn test_deviation_reports_distances_per_sample() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let samples = vec![
            sample(1, 13.7367, 100.5232),
            sample(2, 13.7368, 100.5232),
            sample(3, 13.7369, 100.5232),
        ];

        let analysis = deviation_analysis(
            ClassId::new(1),
            date,
            &samples,
            &OutlierConfig::default(),
        )
        .unwrap();
        assert_eq!(analysis.results.len(), 3);
        // Middle sample sits at the center
        assert!(analysis.results[1].distance_m < analysis.results[0].distance_m);
        assert_eq!(analysis.results[0].student_id, StudentId::new(1));
    }

    #[test]
    fn test_mean_center_is_arithmetic_mean() {
        let samples = vec![sample(1, 10.0, 100.0), sample(2, 14.0, 102.0)];
        let center = mean_center(&samples);
        assert_eq!(center.latitude, 12.0);
        assert_eq!(center.longitude, 101.0);
    }
}
