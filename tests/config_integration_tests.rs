// Integration tests for settings persistence - the YAML file format and the
// round trip into application state.

use camino::Utf8PathBuf;
use picflip::models::{RotateSettings, UserConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use picflip::{ConfigManager, StateManager};
use tempfile::TempDir;

fn manager_in(temp: &TempDir) -> ConfigManager {
    let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
    ConfigManager::new(&dir).unwrap()
}

#[test]
fn test_settings_file_uses_friendly_keys() {
    let temp = TempDir::new().unwrap();
    let manager = manager_in(&temp);

    manager.save_user_config(&UserConfig::default()).unwrap();

    let written =
        std::fs::read_to_string(temp.path().join("PicFlip Settings.yaml")).unwrap();
    assert!(written.contains("PicFlip_Settings:"));
    assert!(written.contains("Input Folder:"));
    assert!(written.contains("Output Folder:"));
    assert!(written.contains("Worker Threads:"));
}

#[test]
fn test_hand_written_settings_parse() {
    let temp = TempDir::new().unwrap();
    let manager = manager_in(&temp);

    let yaml = "\
PicFlip_Settings:
  Input Folder: Vacation
  Output Folder: VacationFlipped
  Worker Threads: 4
";
    std::fs::write(temp.path().join("PicFlip Settings.yaml"), yaml).unwrap();

    let config = manager.load_user_config().unwrap();
    assert_eq!(config.settings.input_dir, "Vacation");
    assert_eq!(config.settings.output_dir, "VacationFlipped");
    assert_eq!(config.settings.worker_threads, 4);
    // Omitted keys fall back to defaults
    assert!(!config.settings.debug_mode);
}

#[test]
fn test_missing_file_defaults_match_constants() {
    let temp = TempDir::new().unwrap();
    let manager = manager_in(&temp);

    let config = manager.load_user_config().unwrap();
    assert_eq!(config.settings.input_dir, DEFAULT_INPUT_DIR);
    assert_eq!(config.settings.output_dir, DEFAULT_OUTPUT_DIR);
    assert_eq!(config.settings.worker_threads, 0);
}

#[test]
fn test_corrupt_settings_file_errors() {
    let temp = TempDir::new().unwrap();
    let manager = manager_in(&temp);

    std::fs::write(
        temp.path().join("PicFlip Settings.yaml"),
        "PicFlip_Settings: [not, a, mapping",
    )
    .unwrap();

    assert!(manager.load_user_config().is_err());
}

#[test]
fn test_settings_round_trip_through_state() {
    let temp = TempDir::new().unwrap();
    let manager = manager_in(&temp);

    let config = UserConfig {
        settings: RotateSettings {
            input_dir: "Camera".to_string(),
            output_dir: "CameraRotated".to_string(),
            worker_threads: 6,
            debug_mode: true,
        },
    };
    manager.save_user_config(&config).unwrap();

    let state_manager = StateManager::new();
    let loaded = manager.load_user_config().unwrap();
    state_manager.load_from_user_config(&loaded);

    let state = state_manager.snapshot();
    assert_eq!(state.input_dir, Utf8PathBuf::from("Camera"));
    assert_eq!(state.output_dir, Utf8PathBuf::from("CameraRotated"));
    assert_eq!(state.worker_threads, 6);
    assert!(state.debug_mode);
}

#[test]
fn test_empty_directories_in_config_keep_defaults() {
    let state_manager = StateManager::new();

    let config = UserConfig {
        settings: RotateSettings {
            input_dir: String::new(),
            output_dir: String::new(),
            worker_threads: 0,
            debug_mode: false,
        },
    };
    state_manager.load_from_user_config(&config);

    let state = state_manager.snapshot();
    assert_eq!(state.input_dir, Utf8PathBuf::from(DEFAULT_INPUT_DIR));
    assert_eq!(state.output_dir, Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));
}
