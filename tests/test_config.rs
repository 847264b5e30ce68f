// Loading training configurations from JSON files.

use mlbl::config::load_config;
use mlbl::error::TrainError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_minimal_config_takes_defaults() {
    let file = write_config(
        r#"{
            "vocab_size": 1000,
            "embed_dim": 50,
            "image_dim": 4096,
            "hidden_dim": 256,
            "context_length": 5
        }"#,
    );
    let cfg = load_config(file.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.vocab_size, 1000);
    assert_eq!(cfg.context_length, 5);
    assert_eq!(cfg.seed, 1234);
    assert_eq!(cfg.batchsize, 20);
    assert_eq!(cfg.maxepoch, 10);
    assert_eq!(cfg.captions_per_image, 5);
    assert_eq!(cfg.log_every, 2000);
    assert_eq!(cfg.sample_every, 10000);
    assert_eq!(cfg.schedule_every, 10000);
    assert_eq!(cfg.validate_every, 25000);
    assert_eq!(cfg.dropout, 0.0);
    assert!((cfg.momentum_initial - 0.5).abs() < 1e-8);
    assert!((cfg.momentum_final - 0.5).abs() < 1e-8);
}

#[test]
fn test_load_overrides() {
    let file = write_config(
        r#"{
            "vocab_size": 1000,
            "embed_dim": 50,
            "image_dim": 4096,
            "hidden_dim": 256,
            "context_length": 5,
            "dropout": 0.5,
            "eta": 0.43,
            "batchsize": 40,
            "patience": 3,
            "validate_every": 500
        }"#,
    );
    let cfg = load_config(file.path().to_str().unwrap()).unwrap();
    assert!((cfg.dropout - 0.5).abs() < 1e-8);
    assert!((cfg.eta - 0.43).abs() < 1e-8);
    assert_eq!(cfg.batchsize, 40);
    assert_eq!(cfg.patience, 3);
    assert_eq!(cfg.validate_every, 500);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_config("/nonexistent/path/config.json").unwrap_err();
    assert!(matches!(err, TrainError::Io(_)));
}

#[test]
fn test_malformed_json_is_json_error() {
    let file = write_config("{ not json");
    let err = load_config(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, TrainError::Json(_)));
}

#[test]
fn test_invalid_values_fail_validation() {
    let file = write_config(
        r#"{
            "vocab_size": 1000,
            "embed_dim": 50,
            "image_dim": 4096,
            "hidden_dim": 256,
            "context_length": 5,
            "dropout": 1.5
        }"#,
    );
    let err = load_config(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, TrainError::Config { .. }));
}
