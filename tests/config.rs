use std::fs;

use shell_theorem::config::{
    ConfigError, DEFAULT_TIERS, ExperimentConfig, SamplingMethodConfig, SummationConfig,
    experiment_from_toml, experiment_from_yaml, load_experiment,
};

#[test]
fn defaults_reproduce_reference_driver() {
    let config = ExperimentConfig::default();
    assert_eq!(config.tiers, vec![1_000, 10_000, 100_000, 1_000_000]);
    assert_eq!(config.tiers, DEFAULT_TIERS.to_vec());
    assert_eq!(config.trials, 1);
    assert_eq!(config.shell.radius_m, 1.0);
    assert_eq!(config.shell.mass_kg, 1.0e9);
    assert_eq!(config.shell.observer(), [0.0, 1.0, 0.0]);
    assert_eq!(config.sampling.method, SamplingMethodConfig::Archimedes);
    assert_eq!(config.sampling.summation, SummationConfig::Pairwise);
    assert!(!config.sampling.parallel);
    assert!(config.sampling.seed.is_none());
    config.validate().expect("defaults are valid");
}

#[test]
fn partial_toml_fills_defaults() {
    let config = experiment_from_toml(
        r#"
        tiers = [10, 20]

        [shell]
        radius_m = 2.5
        "#,
    )
    .unwrap();
    assert_eq!(config.tiers, vec![10, 20]);
    assert_eq!(config.shell.radius_m, 2.5);
    assert_eq!(config.shell.mass_kg, 1.0e9);
    // observer follows the radius onto the north pole
    assert_eq!(config.shell.observer(), [0.0, 2.5, 0.0]);
}

#[test]
fn full_yaml_parses() {
    let config = experiment_from_yaml(
        r#"
tiers: [100, 1000]
trials: 4
shell:
  radius_m: 3.0
  mass_kg: 5.0e12
  observer_m: [0.5, -1.0, 0.0]
sampling:
  method: marsaglia
  summation: compensated
  parallel: true
  chunk_size: 512
  seed: 99
"#,
    )
    .unwrap();
    assert_eq!(config.trials, 4);
    assert_eq!(config.shell.observer(), [0.5, -1.0, 0.0]);
    assert_eq!(config.sampling.method, SamplingMethodConfig::Marsaglia);
    assert_eq!(config.sampling.summation, SummationConfig::Compensated);
    assert!(config.sampling.parallel);
    assert_eq!(config.sampling.chunk_size, 512);
    assert_eq!(config.sampling.seed, Some(99));
}

#[test]
fn validation_names_the_bad_field() {
    let cases = [
        ("[shell]\nradius_m = -1.0\n", "shell.radius_m"),
        ("[shell]\nradius_m = 0.0\n", "shell.radius_m"),
        ("tiers = []\n", "tiers"),
        ("tiers = [10, 0]\n", "tiers"),
        ("trials = 0\n", "trials"),
        ("[sampling]\nchunk_size = 0\n", "sampling.chunk_size"),
        ("[shell]\nobserver_m = [0.0, inf, 0.0]\n", "shell.observer_m"),
        ("[shell]\nmass_kg = nan\n", "shell.mass_kg"),
    ];
    for (toml, expected) in cases {
        match experiment_from_toml(toml) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{toml}"),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(matches!(
        experiment_from_toml("[shell]\nradius = 1.0\n"),
        Err(ConfigError::Toml(_))
    ));
    assert!(matches!(
        experiment_from_yaml("sampling:\n  method: cylinder\n"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn loads_by_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml_path = dir.path().join("exp.toml");
    let yaml_path = dir.path().join("exp.yaml");
    fs::write(&toml_path, "tiers = [5]\n[sampling]\nseed = 1\n").unwrap();
    fs::write(&yaml_path, "tiers: [6]\nsampling:\n  seed: 2\n").unwrap();

    let from_toml = load_experiment(&toml_path).unwrap();
    assert_eq!(from_toml.tiers, vec![5]);
    assert_eq!(from_toml.sampling.seed, Some(1));

    let from_yaml = load_experiment(&yaml_path).unwrap();
    assert_eq!(from_yaml.tiers, vec![6]);
    assert_eq!(from_yaml.sampling.seed, Some(2));

    assert!(matches!(
        load_experiment(dir.path().join("missing.toml")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn loaded_files_are_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "trials: 0\n").unwrap();
    match load_experiment(&path) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "trials"),
        other => panic!("expected invalid trials, got {other:?}"),
    }
}

#[test]
fn shipped_configs_load() {
    let default = load_experiment("configs/default.toml").expect("default config");
    assert_eq!(default, ExperimentConfig::default());

    let interior = load_experiment("configs/interior.yaml").expect("interior config");
    assert_eq!(interior.shell.observer(), [0.0, 0.5, 0.0]);
    assert!(interior.sampling.parallel);
}
