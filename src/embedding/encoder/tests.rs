use super::*;
use crate::vector::{euclidean_distance, is_unit};
use std::path::PathBuf;

#[test]
fn test_stub_config_validates() {
    let config = EncoderConfig::stub();
    assert!(config.testing_stub);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_requires_model_path_without_stub() {
    let config = EncoderConfig::default();
    assert!(matches!(
        config.validate(),
        Err(EmbeddingError::InvalidConfig { .. })
    ));
}

#[test]
fn test_config_missing_model_dir() {
    let config = EncoderConfig::new(PathBuf::from("/nonexistent/encoder"));
    assert!(!config.model_available());
    assert!(matches!(
        config.validate(),
        Err(EmbeddingError::ModelNotFound { .. })
    ));
}

#[test]
fn test_config_incomplete_model_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();

    let config = EncoderConfig::new(dir.path());
    assert!(config.model_available());
    match config.validate() {
        Err(EmbeddingError::ModelLoadFailed { reason }) => {
            assert!(reason.contains("model.safetensors"));
        }
        other => panic!("expected ModelLoadFailed, got {:?}", other),
    }
}

#[test]
fn test_config_rejects_zero_dimensions() {
    let config = EncoderConfig::stub().with_embedding_dim(0);
    assert!(config.validate().is_err());

    let config = EncoderConfig::stub().with_max_seq_len(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_stub_encoder_reports_mode() {
    let encoder = SentenceEncoder::stub().unwrap();
    assert!(encoder.is_stub());
    assert!(!encoder.has_model());
    assert_eq!(encoder.embedding_dim(), ENCODER_EMBEDDING_DIM);
}

#[test]
fn test_stub_encode_is_unit_and_deterministic() {
    let encoder = SentenceEncoder::stub().unwrap();
    let texts = ["spam link", "hello friend", "spam link"];

    let first = encoder.encode(&texts, 2).unwrap();
    let second = encoder.encode(&texts, 64).unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    for embedding in &first {
        assert_eq!(embedding.len(), ENCODER_EMBEDDING_DIM);
        assert!(is_unit(embedding, 1e-5));
    }
    assert_eq!(first[0], first[2]);
    assert!(euclidean_distance(&first[0], &first[1]) > 0.0);
}

#[test]
fn test_stub_encode_empty_batch() {
    let encoder = SentenceEncoder::stub().unwrap();
    assert!(encoder.encode(&[], 8).unwrap().is_empty());
}

#[test]
fn test_stub_respects_configured_dimension() {
    let encoder = SentenceEncoder::load(EncoderConfig::stub().with_embedding_dim(16)).unwrap();
    let out = encoder.encode(&["abc"], 1).unwrap();
    assert_eq!(out[0].len(), 16);
}

#[test]
fn test_from_config_without_model_path_is_stub() {
    let config = crate::config::Config {
        embedding_dim: 32,
        ..Default::default()
    };
    let encoder_config = EncoderConfig::from_config(&config);
    assert!(encoder_config.testing_stub);
    assert_eq!(encoder_config.embedding_dim, 32);
}

#[test]
fn test_encoder_debug_format() {
    let encoder = SentenceEncoder::stub().unwrap();
    let rendered = format!("{:?}", encoder);
    assert!(rendered.contains("Stub"));
    assert!(rendered.contains("embedding_dim"));
}
