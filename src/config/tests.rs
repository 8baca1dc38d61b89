use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

const ALL_VARS: [&str; 8] = [
    Config::ENV_MODEL_PATH,
    Config::ENV_CORPUS_PATH,
    Config::ENV_THRESHOLD,
    Config::ENV_MIN_MATCH_CHARS,
    Config::ENV_MAX_CONCURRENCY,
    Config::ENV_EMBED_TIMEOUT_MS,
    Config::ENV_INDEX_CAPACITY,
    Config::ENV_MAX_EXACT_SCAN_WORDS,
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_plagiarism_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for var in ALL_VARS {
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(config.model_path.is_none());
    assert_eq!(config.corpus_path, PathBuf::from("./.corpus"));
    assert_eq!(config.threshold, 0.7);
    assert_eq!(config.min_match_chars, 50);
    assert_eq!(config.max_concurrency, 4);
    assert_eq!(config.embed_timeout, Duration::from_secs(30));
    assert_eq!(config.index_capacity, 10_000);
    assert_eq!(config.max_exact_scan_words, 20_000);
}

#[test]
fn test_default_config_is_valid() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        corpus_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_plagiarism_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert!(config.model_path.is_none());
    assert_eq!(config.threshold, 0.7);
    assert_eq!(config.max_concurrency, 4);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_plagiarism_env();

    with_env_vars(
        &[
            (Config::ENV_CORPUS_PATH, "/var/lib/plagiarism/corpus"),
            (Config::ENV_MODEL_PATH, "/models/minilm"),
            (Config::ENV_THRESHOLD, "0.85"),
            (Config::ENV_MIN_MATCH_CHARS, "30"),
            (Config::ENV_MAX_CONCURRENCY, "16"),
            (Config::ENV_EMBED_TIMEOUT_MS, "1500"),
            (Config::ENV_INDEX_CAPACITY, "128"),
            (Config::ENV_MAX_EXACT_SCAN_WORDS, "5000"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.corpus_path, PathBuf::from("/var/lib/plagiarism/corpus"));
            assert_eq!(config.model_path, Some(PathBuf::from("/models/minilm")));
            assert_eq!(config.threshold, 0.85);
            assert_eq!(config.min_match_chars, 30);
            assert_eq!(config.max_concurrency, 16);
            assert_eq!(config.embed_timeout, Duration::from_millis(1500));
            assert_eq!(config.index_capacity, 128);
            assert_eq!(config.max_exact_scan_words, 5000);
        },
    );
}

#[test]
#[serial]
fn test_blank_model_path_selects_stub() {
    clear_plagiarism_env();

    with_env_vars(&[(Config::ENV_MODEL_PATH, "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.model_path.is_none());
        assert!(config.embedder_config().testing_stub);
    });
}

#[test]
#[serial]
fn test_invalid_threshold_not_number() {
    clear_plagiarism_env();

    with_env_vars(&[(Config::ENV_THRESHOLD, "high")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "PLAGIARISM_THRESHOLD",
                ..
            }
        ));
        assert!(err.to_string().contains("high"));
    });
}

#[test]
#[serial]
fn test_negative_concurrency_is_parse_error() {
    clear_plagiarism_env();

    with_env_vars(&[(Config::ENV_MAX_CONCURRENCY, "-2")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    });
}

#[test]
#[serial]
fn test_threshold_out_of_range_fails_validate() {
    clear_plagiarism_env();

    with_env_vars(&[(Config::ENV_THRESHOLD, "1.5")], || {
        let config = Config::from_env().expect("parses");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    });
}

#[test]
fn test_validate_rejects_zero_values() {
    let cases = [
        Config {
            min_match_chars: 0,
            ..Default::default()
        },
        Config {
            max_concurrency: 0,
            ..Default::default()
        },
        Config {
            embed_timeout: Duration::ZERO,
            ..Default::default()
        },
        Config {
            index_capacity: 0,
            ..Default::default()
        },
    ];

    for config in cases {
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }
}

#[test]
fn test_validate_corpus_path_is_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("corpus.txt");
    std::fs::write(&file, "not a directory").unwrap();

    let config = Config {
        corpus_path: file.clone(),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { path }) if path == file
    ));
}

#[test]
fn test_validate_missing_model_path() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        corpus_path: dir.path().to_path_buf(),
        model_path: Some(dir.path().join("missing-model")),
        ..Default::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_derived_configs() {
    let config = Config {
        min_match_chars: 25,
        max_concurrency: 2,
        embed_timeout: Duration::from_millis(900),
        index_capacity: 64,
        max_exact_scan_words: 1000,
        ..Default::default()
    };

    let detector = config.detector_config();
    assert_eq!(detector.min_match_chars, 25);
    assert_eq!(detector.max_concurrency, 2);
    assert_eq!(detector.embed_timeout, Duration::from_millis(900));
    assert_eq!(detector.max_exact_scan_words, 1000);

    let index = config.index_config();
    assert_eq!(index.capacity, 64);
    assert_eq!(index.embed_timeout, Duration::from_millis(900));
}

#[test]
fn test_embedder_config_uses_model_dir() {
    let config = Config {
        model_path: Some(PathBuf::from("/models/paraphrase-multilingual-MiniLM-L12-v2")),
        ..Default::default()
    };

    let embedder = config.embedder_config();
    assert!(!embedder.testing_stub);
    assert_eq!(embedder.model_id, "paraphrase-multilingual-MiniLM-L12-v2");
}
