use super::*;
use crate::foundation::error::ErrorKind;

#[test]
fn empty_object_yields_defaults() {
    let cfg = EngineConfig::from_reader(&b"{}"[..]).unwrap();
    assert_eq!(cfg, EngineConfig::default());
    assert_eq!(cfg.bucket, "nailian-assets");
    assert_eq!(cfg.batch_policy, BatchPolicy::AllOrNothing);
}

#[test]
fn fields_parse_and_feed_decode_limits() {
    let json = br#"{
        "bucket": "masks",
        "asset_root": "/srv/assets",
        "threads": 3,
        "max_image_dim": 2048,
        "batch_policy": "per_item"
    }"#;
    let cfg = EngineConfig::from_reader(&json[..]).unwrap();
    assert_eq!(cfg.bucket, "masks");
    assert_eq!(cfg.asset_root, PathBuf::from("/srv/assets"));
    assert_eq!(cfg.threads, Some(3));
    assert_eq!(cfg.batch_policy, BatchPolicy::PerItem);
    assert_eq!(cfg.decode_limits().max_width, 2048);
    assert_eq!(cfg.decode_limits().max_height, 2048);
}

#[test]
fn unknown_fields_and_bad_values_are_config_errors() {
    let err = EngineConfig::from_reader(&br#"{"bukket":"x"}"#[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = EngineConfig::from_reader(&br#"{"threads":0}"#[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = EngineConfig::from_reader(&br#"{"bucket":"  "}"#[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn missing_file_is_a_config_error() {
    let err = EngineConfig::from_path("definitely/missing/tipmask.json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn overrides_replace_bucket_and_root_but_ignore_blanks() {
    let cfg = EngineConfig::default().apply_overrides(|name| match name {
        ENV_BUCKET => Some("staging-assets".to_string()),
        ENV_ASSET_ROOT => Some(" ".to_string()),
        _ => None,
    });
    assert_eq!(cfg.bucket, "staging-assets");
    assert_eq!(cfg.asset_root, PathBuf::from("."));
}
