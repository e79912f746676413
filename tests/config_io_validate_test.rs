use agile_tracker::config::Config;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.tariff.tariff_code = "E-1R-AGILE-FLEX-22-11-25-A".to_string();
    cfg.release.timezone = "Europe/London".to_string();
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.tariff.tariff_code, "E-1R-AGILE-FLEX-22-11-25-A");
    assert_eq!(loaded.release.timezone, "Europe/London");
    assert_eq!(loaded.logging.file, cfg.logging.file);
}

#[test]
fn partial_yaml_falls_back_to_defaults() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"search:\n  duration_hours: 3\n").unwrap();
    let cfg = Config::from_file(tmp.path()).unwrap();
    assert_eq!(cfg.search.duration_hours, 3);
    assert_eq!(cfg.search.horizon_hours, 24);
    assert_eq!(cfg.release.time, "16:00");
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();

    // Missing tariff
    cfg.tariff.tariff_code.clear();
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.tariff.page_size = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.cache.expiry_days = 0;
    assert!(cfg.validate().is_err());

    // Unparseable release schedule
    cfg = Config::default();
    cfg.release.time = "4pm".to_string();
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.release.timezone = "Mars/Olympus".to_string();
    assert!(cfg.validate().is_err());

    // Search window must be at least an hour
    cfg = Config::default();
    cfg.search.duration_hours = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.search.horizon_hours = 0;
    assert!(cfg.validate().is_err());

    // Empty upcoming view
    cfg = Config::default();
    cfg.chart_hours = 0;
    assert!(cfg.validate().is_err());

    // Log levels are checked up front, not at logging init
    cfg = Config::default();
    cfg.logging.level = "chatty".to_string();
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.logging.file_level = Some("verbose".to_string());
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.logging.console_level = Some("warning".to_string());
    assert!(cfg.validate().is_ok());

    // Band thresholds out of order
    cfg = Config::default();
    cfg.bands.low_below = 0.30;
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}

#[test]
fn schema_lists_sections() {
    let schema = Config::json_schema();
    let props = schema.get("properties").unwrap();
    for section in ["tariff", "cache", "release", "search", "bands", "logging"] {
        assert!(props.get(section).is_some(), "missing {}", section);
    }
}
