use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::APP_DIR;
use crate::error::JoyError;

use super::{ControllerProfile, ProfileStore};

pub const PROFILES_FILE: &str = "controllers.toml";

#[derive(Deserialize, Serialize, Debug, Default)]
struct ProfileFile {
    #[serde(default)]
    controllers: BTreeMap<String, ControllerProfile>,
}

/// Profiles kept in one TOML file, one table per controller identifier.
/// Changes stay in memory until [`ProfileStore::flush`].
#[derive(Debug)]
pub struct TomlProfileStore {
    path: PathBuf,
    file: ProfileFile,
    dirty: bool,
}

impl TomlProfileStore {
    /// `<config dir>/joycore/controllers.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(PROFILES_FILE))
    }

    /// Reads `path` if it exists. A file that does not parse is logged and
    /// treated as empty; it is only overwritten on the next flush.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JoyError> {
        let path = path.into();
        let file = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| JoyError::io(&path, e))?;
            match toml::from_str::<ProfileFile>(&content) {
                Ok(file) => {
                    info!(
                        "Loaded {} controller profiles from {}",
                        file.controllers.len(),
                        path.display()
                    );
                    file
                }
                Err(e) => {
                    warn!("Ignoring unreadable profiles {}: {}", path.display(), e);
                    ProfileFile::default()
                }
            }
        } else {
            debug!("No controller profiles at {}", path.display());
            ProfileFile::default()
        };

        Ok(Self {
            path,
            file,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.file.controllers.keys().map(String::as_str)
    }
}

impl ProfileStore for TomlProfileStore {
    fn get(&self, identifier: &str) -> Option<ControllerProfile> {
        self.file.controllers.get(identifier).cloned()
    }

    fn put(&mut self, identifier: &str, profile: ControllerProfile) {
        // saved_at always changes, so compare the content only
        let changed = match self.file.controllers.get(identifier) {
            Some(old) => {
                ControllerProfile {
                    saved_at: profile.saved_at,
                    ..old.clone()
                } != profile
            }
            None => true,
        };
        self.file.controllers.insert(identifier.to_string(), profile);
        if changed {
            self.dirty = true;
        }
    }

    fn remove(&mut self, identifier: &str) {
        self.dirty |= self.file.controllers.remove(identifier).is_some();
    }

    fn flush(&mut self) -> Result<(), JoyError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| JoyError::io(parent, e))?;
        }
        let content = toml::to_string_pretty(&self.file)?;
        fs::write(&self.path, content).map_err(|e| JoyError::io(&self.path, e))?;
        info!(
            "Wrote {} controller profiles to {}",
            self.file.controllers.len(),
            self.path.display()
        );
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::axis::JoyAxis;
    use crate::controller::config::ControllerConfig;
    use crate::controller::testing::VirtualController;
    use crate::persistence::{load_controller_config, save_controller_config};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("joycore-profiles-{}-{}", std::process::id(), name))
            .join(PROFILES_FILE)
    }

    #[test]
    fn profiles_survive_a_restart() {
        let path = temp_path("restart");
        let _ = fs::remove_file(&path);

        let (_clock, mut pad) = VirtualController::new("Pad: 0300abcd");
        pad.set_axis_dead_zone(1, 0.5);
        pad.set_axis_map(0, JoyAxis::Yaw);
        pad.set_sensitivity(0.75);

        let mut store = TomlProfileStore::open(&path).unwrap();
        save_controller_config(&mut store, &pad);
        store.flush().unwrap();

        let reopened = TomlProfileStore::open(&path).unwrap();
        assert_eq!(reopened.identifiers().collect::<Vec<_>>(), ["Pad: 0300abcd"]);

        let (_clock, mut fresh) = VirtualController::new("Pad: 0300abcd");
        assert!(load_controller_config(&reopened, &mut fresh));
        assert_eq!(fresh.axis_dead_zone(1), 0.5);
        assert_eq!(fresh.axis_map(0), JoyAxis::Yaw);
        assert_eq!(fresh.sensitivity(), 0.75);
        assert!(fresh.is_axis_scale_default(0));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[controllers.\"Pad\"\nsensitivity = ").unwrap();

        let store = TomlProfileStore::open(&path).unwrap();
        assert!(store.get("Pad").is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[controllers.\"Pad\"\nsensitivity = ");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn hand_edited_values_are_sanitised() {
        let path = temp_path("edited");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"
[controllers.Pad]
sensitivity = nan

[[controllers.Pad.axes]]
index = 0
dead_zone = -3.0
map = 12
"#,
        )
        .unwrap();

        let store = TomlProfileStore::open(&path).unwrap();
        let (_clock, mut pad) = VirtualController::new("Pad");
        assert!(load_controller_config(&store, &mut pad));
        assert!(pad.is_sensitivity_default());
        assert_eq!(pad.axis_dead_zone(0), 0.0);
        assert_eq!(pad.axis_map(0), JoyAxis::Up);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn flush_skips_unchanged_store() {
        let path = temp_path("clean");
        let _ = fs::remove_dir_all(path.parent().unwrap());

        let (_clock, pad) = VirtualController::new("Pad");
        let mut store = TomlProfileStore::open(&path).unwrap();
        save_controller_config(&mut store, &pad);
        store.flush().unwrap();
        assert!(!path.exists());
    }
}
