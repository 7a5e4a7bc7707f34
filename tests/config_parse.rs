use mediaforge_worker::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../mediaforge-worker.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.classification.sample_pages, 3);
    assert_eq!(cfg.download.timeout_seconds, 60);
    assert!(!cfg.paths.out_dir.is_empty());
}

#[test]
fn empty_config_uses_defaults() {
    let cfg: Config = toml::from_str("").expect("parse empty TOML");
    assert_eq!(cfg.state.channel_prefix, "progress");
    assert_eq!(cfg.tools.process_timeout_seconds, 600);
    assert!((cfg.classification.scanned_page_fraction - 0.8).abs() < f32::EPSILON);
}
