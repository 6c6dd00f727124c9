use std::path::PathBuf;

use tidyfile_core::{
    AnalyzeSummary, BackendError, DriveInfo, DriveKind, SessionConfig, USER_OVERRIDE_CONFIDENCE,
    validate_filename, validate_folder_name,
};

#[test]
fn test_analyze_summary_parses_engine_output() {
    // Shape emitted by the engine sidecar on stdout.
    let json = r#"{
        "total_files": 4,
        "images": 2,
        "documents": 1,
        "other_files": 1,
        "classifications": [
            {
                "index": 0,
                "filename": "beach.jpg",
                "filepath": "/pics/beach.jpg",
                "suggested_folder": "Travel_Photos",
                "suggested_name": "2023_beach_sunset.jpg",
                "confidence": 0.91,
                "selected": true,
                "is_duplicate": false,
                "duplicate_of": null
            },
            {
                "index": 1,
                "filename": "beach_copy.jpg",
                "filepath": "/pics/beach_copy.jpg",
                "suggested_folder": "Travel_Photos",
                "suggested_name": null,
                "confidence": 0.91,
                "selected": false,
                "is_duplicate": true,
                "duplicate_of": "/pics/beach.jpg"
            }
        ],
        "scan_time": 1.73,
        "total_duplicates": 1
    }"#;

    let summary: AnalyzeSummary = serde_json::from_str(json).unwrap();
    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.classifications.len(), 2);
    assert_eq!(summary.total_duplicates, 1);

    let duplicate = &summary.classifications[1];
    assert!(duplicate.is_duplicate);
    assert!(!duplicate.selected);
    assert_eq!(
        duplicate.duplicate_of,
        Some(PathBuf::from("/pics/beach.jpg"))
    );
    assert!(!duplicate.is_user_override());
}

#[test]
fn test_drive_kind_serialization() {
    let drive = DriveInfo {
        name: "Home".into(),
        path: "/home/user".into(),
        kind: DriveKind::Home,
        total_space: 1000,
        available_space: 400,
        used_space: 600,
    };

    let json = serde_json::to_string(&drive).unwrap();
    assert!(json.contains("\"kind\":\"home\""));
    assert_eq!(DriveKind::Media.as_str(), "media");
    assert_eq!(DriveKind::Root.as_str(), "root");
}

#[test]
fn test_user_override_sentinel() {
    assert_eq!(USER_OVERRIDE_CONFIDENCE, 1.0);
}

#[test]
fn test_session_config_builder_and_validation() {
    let config = SessionConfig::builder()
        .engine_program("engine")
        .preview_max_bytes(1024u64)
        .build()
        .unwrap();
    assert_eq!(config.preview_max_bytes, 1024);

    assert!(SessionConfig::builder().preview_max_bytes(0u64).build().is_err());
    assert!(SessionConfig::builder().engine_program("").build().is_err());
}

#[test]
fn test_validation_rules() {
    assert!(validate_filename("report_2024.pdf").is_ok());
    assert!(validate_filename("nested/name").is_err());
    assert!(validate_folder_name("My_Folder").is_ok());
    assert!(validate_folder_name("bad\\folder").is_err());
}

#[test]
fn test_backend_error_display() {
    let err = BackendError::io(
        "/data",
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    assert_eq!(err.to_string(), "Path not found: /data");

    let err = BackendError::unavailable("engine exited with status 1");
    assert!(err.to_string().contains("engine exited"));
}
