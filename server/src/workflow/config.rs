use anyhow::Context;
use radcore::presentation::TimeLabeler;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "database.csv";

/// Runtime settings, read from YAML and overridable from the command line.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database: PathBuf,
    pub bind: SocketAddr,
    pub zoom: u8,
    pub report_zoom: u8,
    pub report_title: String,
    /// Fixed offset for capture timestamps; host local time when unset.
    pub utc_offset_hours: Option<i32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            zoom: 13,
            report_zoom: 12,
            report_title: "Radiation dose report".into(),
            utc_offset_hours: None,
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading config {}", path_ref.display()))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_overrides(
        mut self,
        database: Option<PathBuf>,
        bind: Option<SocketAddr>,
        utc_offset_hours: Option<i32>,
    ) -> Self {
        if let Some(database) = database {
            self.database = database;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if utc_offset_hours.is_some() {
            self.utc_offset_hours = utc_offset_hours;
        }
        self
    }

    pub fn labeler(&self) -> anyhow::Result<TimeLabeler> {
        match self.utc_offset_hours {
            None => Ok(TimeLabeler::local()),
            Some(hours) => TimeLabeler::with_utc_offset_hours(hours)
                .with_context(|| format!("utc offset {hours}h is out of range")),
        }
    }
}
