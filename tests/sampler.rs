use rand::SeedableRng;
use rand::rngs::StdRng;
use shell_theorem::sampler::{
    SamplerError, SamplingMethod, Sphere, random_point_on_sphere, sample_points,
};

const METHODS: [SamplingMethod; 2] = [SamplingMethod::Archimedes, SamplingMethod::Marsaglia];

#[test]
fn sampled_points_lie_on_the_sphere() {
    let mut rng = StdRng::seed_from_u64(17);
    for method in METHODS {
        for radius in [0.5, 1.0, 7.25, 6.371e6] {
            let points = sample_points(2_000, radius, method, &mut rng).expect("valid radius");
            assert_eq!(points.len(), 2_000);
            for p in points {
                let rel = (p.length() - radius).abs() / radius;
                assert!(rel < 1e-12, "{method}: |{p}| = {} for r = {radius}", p.length());
            }
        }
    }
}

#[test]
fn extreme_radii_stay_on_the_sphere() {
    // r² would under- or overflow here, so compare on the unit sphere
    let mut rng = StdRng::seed_from_u64(1);
    for method in METHODS {
        for radius in [1e-170, 1e-300, 1e200, 1e300] {
            let points = sample_points(500, radius, method, &mut rng).expect("valid radius");
            let mut off_axis = 0;
            for p in &points {
                let unit = p.scale(1.0 / radius);
                assert!(
                    (unit.length() - 1.0).abs() < 1e-12,
                    "{method}: {p} is not on the sphere of radius {radius}"
                );
                if unit.x.abs() > 1e-3 || unit.z.abs() > 1e-3 {
                    off_axis += 1;
                }
            }
            assert!(off_axis > 400, "{method}: points collapsed onto the y axis");
        }
    }
}

#[test]
fn samples_are_area_uniform() {
    let n = 50_000;
    for method in METHODS {
        let mut rng = StdRng::seed_from_u64(11);
        let points = sample_points(n, 2.0, method, &mut rng).unwrap();
        let nf = n as f64;

        let mean = points.iter().fold([0.0; 3], |mut acc, p| {
            acc[0] += p.x / 2.0;
            acc[1] += p.y / 2.0;
            acc[2] += p.z / 2.0;
            acc
        });
        for c in mean {
            assert!((c / nf).abs() < 0.02, "{method}: mean component {}", c / nf);
        }

        // each coordinate of a uniform unit-sphere point has E[c²] = 1/3
        let y_sq = points.iter().map(|p| (p.y / 2.0).powi(2)).sum::<f64>() / nf;
        assert!((y_sq - 1.0 / 3.0).abs() < 0.01, "{method}: E[y²] = {y_sq}");

        let upper = points.iter().filter(|p| p.y > 0.0).count() as f64 / nf;
        assert!((upper - 0.5).abs() < 0.02, "{method}: upper fraction {upper}");
    }
}

#[test]
fn same_seed_same_points() {
    for method in METHODS {
        let a = sample_points(64, 3.0, method, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = sample_points(64, 3.0, method, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn invalid_radius_is_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = random_point_on_sphere(radius, SamplingMethod::Archimedes, &mut rng).unwrap_err();
        assert!(matches!(err, SamplerError::InvalidRadius(_)));
        assert!(Sphere::new(radius).is_err());
    }
}

#[test]
fn method_names_round_trip() {
    for method in METHODS {
        assert_eq!(method.label().parse::<SamplingMethod>().unwrap(), method);
    }
    assert_eq!("MARSAGLIA".parse::<SamplingMethod>().unwrap(), SamplingMethod::Marsaglia);
    assert!(matches!(
        "cylinder".parse::<SamplingMethod>(),
        Err(SamplerError::UnknownMethod(_))
    ));
    assert_eq!(SamplingMethod::default(), SamplingMethod::Archimedes);
}
