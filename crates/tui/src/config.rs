use std::{collections::BTreeMap, fs::File};

use anyhow::{anyhow, Context, Result};
use camino::Utf8PathBuf;
use coursebook_catalog::{storage::FileStorage, Profile, Profiles};
use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

const PREFIX: &str = "coursebook";

/// User configuration, read from `config.json` in the XDG config directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Where to keep catalog data, instead of the XDG data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Profile to open straight away, skipping the selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Extra profiles, or overrides for the built-in ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Profile>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = BaseDirectories::with_prefix(PREFIX)?
            .find_config_file("config.json")
            .ok_or_else(|| anyhow!("config does not exist"))?;

        let file = File::open(&path).context("error opening config file")?;
        let config = serde_json::from_reader(&file).context("error deserialising config file")?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = BaseDirectories::with_prefix(PREFIX)?.place_config_file("config.json")?;

        let mut file = File::create(&path).context("error opening config file")?;
        serde_json::to_writer_pretty(&mut file, &self).context("error serialising config file")?;

        Ok(())
    }

    /// Built-in profiles, plus any from the config file
    pub fn profiles(&self) -> Profiles {
        let mut profiles = Profiles::builtin();
        profiles.extend(self.profiles.clone());
        profiles
    }

    pub fn data_dir(&self) -> Result<Utf8PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        let dir = BaseDirectories::with_prefix(PREFIX)?.get_data_home();
        Utf8PathBuf::from_path_buf(dir).map_err(|p| anyhow!("data directory {:?} is not UTF-8", p))
    }

    pub fn storage(&self) -> Result<FileStorage> {
        let root = self.data_dir()?.join("storage");
        FileStorage::open(root).context("error opening storage")
    }

    /// Where exports are written, created if needed
    pub fn exports_dir(&self) -> Result<Utf8PathBuf> {
        let dir = self.data_dir()?.join("exports");
        std::fs::create_dir_all(&dir).context("error creating exports directory")?;

        Ok(dir)
    }
}
