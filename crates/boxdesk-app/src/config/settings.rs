//! Settings loader and writer for .boxdesk/config.toml

use super::types::Settings;
use boxdesk_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const BOXDESK_DIR: &str = ".boxdesk";

/// Path of the settings file under `base`
pub fn config_path(base: &Path) -> PathBuf {
    base.join(BOXDESK_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `<base>/.boxdesk/config.toml`.
///
/// A missing or unparsable file yields defaults.
pub fn load_settings(base: &Path) -> Settings {
    let path = config_path(base);

    if !path.exists() {
        debug!("No config file at {:?}, using defaults", path);
        return Settings::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}, using defaults", path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}, using defaults", path, e);
            Settings::default()
        }
    }
}

/// Write settings to `<base>/.boxdesk/config.toml` atomically.
pub fn save_settings(base: &Path, settings: &Settings) -> Result<()> {
    let dir = base.join(BOXDESK_DIR);
    std::fs::create_dir_all(&dir)
        .map_err(|e| Error::config(format!("Failed to create {:?}: {}", dir, e)))?;

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("{}{}", generate_config_header(), content);

    let path = dir.join(CONFIG_FILENAME);
    let temp_path = dir.join(".config.toml.tmp");

    std::fs::write(&temp_path, full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    debug!("Saved settings to {:?}", path);
    Ok(())
}

fn generate_config_header() -> String {
    "# boxdesk configuration\n\
     # [connection] endpoint/workspace, [sync] timing, [terminal], [storage]\n\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join(".boxdesk")).unwrap();
        std::fs::write(
            config_path(temp.path()),
            "[connection]\nworkspace = \"alpha\"\n\n[terminal]\nclear_on_attach = false\n",
        )
        .unwrap();

        let settings = load_settings(temp.path());
        assert_eq!(settings.connection.workspace, "alpha");
        assert!(!settings.terminal.clear_on_attach);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join(".boxdesk")).unwrap();
        std::fs::write(config_path(temp.path()), "this is [not valid").unwrap();

        assert_eq!(load_settings(temp.path()), Settings::default());
    }

    #[test]
    fn test_save_settings_roundtrip() {
        let temp = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.connection.workspace = "beta".to_string();
        settings.sync.request_timeout_ms = 5_000;

        save_settings(temp.path(), &settings).unwrap();

        let content = std::fs::read_to_string(config_path(temp.path())).unwrap();
        assert!(content.starts_with("# boxdesk configuration"));
        assert!(!temp.path().join(".boxdesk/.config.toml.tmp").exists());
        assert_eq!(load_settings(temp.path()), settings);
    }
}
