use rand::SeedableRng;
use rand::rngs::StdRng;
use shell_theorem::gravity::convergence::{
    TierStatistics, Trend, mean_magnitude_trend, study,
};
use shell_theorem::gravity::{
    AccumulateOptions, Accumulation, GravityError, ParameterError, ShellRequest,
};
use shell_theorem::vector::{Point3, Vector3};

fn accumulation(acceleration: Vector3) -> Accumulation {
    Accumulation {
        acceleration,
        numpoints: 10,
        point_mass: 1.0,
        distributed_mass: 10.0,
    }
}

fn stats(mean: f64, se: f64) -> TierStatistics {
    TierStatistics {
        numpoints: 1,
        trials: 4,
        mean_acceleration: Vector3::ZERO,
        mean_magnitude: mean,
        std_dev_magnitude: se * 2.0,
        standard_error: se,
    }
}

#[test]
fn statistics_from_known_runs() {
    let runs = [
        accumulation(Vector3::new(3.0, 0.0, 0.0)),
        accumulation(Vector3::new(0.0, 4.0, 0.0)),
        accumulation(Vector3::new(0.0, 0.0, 5.0)),
    ];
    let s = TierStatistics::from_accumulations(&runs).unwrap();
    assert_eq!(s.numpoints, 10);
    assert_eq!(s.trials, 3);
    assert!((s.mean_magnitude - 4.0).abs() < 1e-12);
    assert!((s.std_dev_magnitude - 1.0).abs() < 1e-12);
    assert!((s.standard_error - 1.0 / 3f64.sqrt()).abs() < 1e-12);
    assert!((s.mean_acceleration.y - 4.0 / 3.0).abs() < 1e-12);

    let single = TierStatistics::from_accumulations(&runs[..1]).unwrap();
    assert_eq!(single.std_dev_magnitude, 0.0);
    assert!(TierStatistics::from_accumulations(&[]).is_none());
}

#[test]
fn trend_uses_standard_error_band() {
    assert_eq!(mean_magnitude_trend(&[stats(1.0, 0.1), stats(0.1, 0.01)]), Trend::Decreasing);
    assert_eq!(mean_magnitude_trend(&[stats(0.1, 0.01), stats(1.0, 0.1)]), Trend::Increasing);
    assert_eq!(mean_magnitude_trend(&[stats(1.0, 0.5), stats(0.9, 0.5)]), Trend::Flat);
    assert_eq!(mean_magnitude_trend(&[stats(1.0, 0.1)]), Trend::Flat);
    assert_eq!(mean_magnitude_trend(&[]), Trend::Flat);
}

#[test]
fn interior_estimate_shrinks_with_sample_count() {
    let mut rng = StdRng::seed_from_u64(2024);
    for location in [Point3::ORIGIN, Point3::new(0.0, 0.5, 0.0)] {
        let request = ShellRequest {
            radius: 1.0,
            location,
            numpoints: 1,
            total_mass: 1.0e9,
        };
        let tiers = study(
            &request,
            &[1_000, 100_000],
            6,
            &AccumulateOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].numpoints, 1_000);
        assert_eq!(tiers[1].numpoints, 100_000);
        assert!(
            tiers[1].mean_magnitude < tiers[0].mean_magnitude,
            "{location}: {} -> {}",
            tiers[0].mean_magnitude,
            tiers[1].mean_magnitude
        );
        assert_eq!(mean_magnitude_trend(&tiers), Trend::Decreasing, "{location}");
    }
}

#[test]
fn study_requires_trials() {
    let request = ShellRequest::north_pole(1.0, 1, 1.0);
    let err = study(
        &request,
        &[10],
        0,
        &AccumulateOptions::default(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap_err();
    assert_eq!(err, GravityError::InvalidParameter(ParameterError::ZeroTrials));
}
