use serde::{Deserialize, Serialize};

use crate::models::app_state::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};

/// User configuration from `PicFlip Settings.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "PicFlip_Settings")]
    pub settings: RotateSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateSettings {
    #[serde(rename = "Input Folder", default = "default_input_dir")]
    pub input_dir: String,

    #[serde(rename = "Output Folder", default = "default_output_dir")]
    pub output_dir: String,

    /// 0 means one worker per logical processor.
    #[serde(rename = "Worker Threads", default)]
    pub worker_threads: usize,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for RotateSettings {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            worker_threads: 0,
            debug_mode: false,
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            settings: RotateSettings::default(),
        }
    }
}

fn default_input_dir() -> String {
    DEFAULT_INPUT_DIR.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = RotateSettings::default();
        assert_eq!(settings.input_dir, DEFAULT_INPUT_DIR);
        assert_eq!(settings.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(settings.worker_threads, 0);
        assert!(!settings.debug_mode);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "PicFlip_Settings:\n  Worker Threads: 2\n";
        let config: UserConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.settings.worker_threads, 2);
        assert_eq!(config.settings.input_dir, DEFAULT_INPUT_DIR);
        assert_eq!(config.settings.output_dir, DEFAULT_OUTPUT_DIR);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = UserConfig::default();
        config.settings.input_dir = "Holiday Photos".to_string();
        config.settings.worker_threads = 4;

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let loaded: UserConfig = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(loaded.settings.input_dir, "Holiday Photos");
        assert_eq!(loaded.settings.worker_threads, 4);
    }
}
