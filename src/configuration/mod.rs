use config::{Config, ConfigError, File, FileFormat};
use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::common::error::SelectorError;
use crate::common::types::MemberId;
use crate::common::view::ClusterView;
use crate::dispatcher::{Dispatcher, DEFAULT_ATTEMPT_TIMEOUT};
use crate::selection_method::SelectionPolicy;
use crate::selector::MemberSelector;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid topology: {0}")]
    Topology(#[from] SelectorError),
    #[error("failed to watch settings file: {0}")]
    Watch(#[from] notify::Error),
}

#[derive(Debug, Deserialize)]
pub struct RawSettings {
    pub leader: Option<MemberId>,
    pub members: Option<Vec<MemberId>>,
    #[serde(default)]
    pub policy: SelectionPolicy,
    pub attempt_timeout_ms: Option<u64>,
    #[serde(default)]
    pub fresh_pass_per_request: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub view: ClusterView,
    pub policy: SelectionPolicy,
    pub attempt_timeout: Duration,
    pub fresh_pass_per_request: bool,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let builder = Config::builder()
            .add_source(File::with_name(&run_mode).required(false))
            .add_source(File::with_name("config").required(run_mode == "production"))
            .build()?;

        Self::from_config(builder)
    }

    /// Loads settings from a single file, picking the format from its
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let builder = Config::builder().add_source(File::from(path)).build()?;

        Self::from_config(builder)
    }

    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let builder = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        Self::from_config(builder)
    }

    fn from_config(builder: Config) -> Result<Self, SettingsError> {
        let raw: RawSettings = builder.try_deserialize()?;

        let view = ClusterView::from_parts(raw.leader, raw.members)?;
        let attempt_timeout = raw
            .attempt_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ATTEMPT_TIMEOUT);

        Ok(Self {
            view,
            policy: raw.policy,
            attempt_timeout,
            fresh_pass_per_request: raw.fresh_pass_per_request,
        })
    }

    pub fn selector(&self) -> MemberSelector {
        MemberSelector::with_view(self.view.clone(), self.policy)
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.attempt_timeout).fresh_pass_per_request(self.fresh_pass_per_request)
    }

    /// Reloads settings from `path` whenever it changes.
    ///
    /// The returned watcher must be kept alive for updates to keep flowing.
    /// Reloads that fail to parse or validate are logged and skipped.
    pub fn watch_config(
        path: impl AsRef<Path>,
    ) -> Result<(RecommendedWatcher, Receiver<Settings>), SettingsError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let reload_path = path.clone();
        let (tx, rx) = channel();

        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                match Settings::from_path(&reload_path) {
                    Ok(new_settings) => {
                        if let Err(e) = tx.send(new_settings) {
                            error!("Error sending new settings: {:?}", e);
                        }
                    }
                    Err(e) => error!("Error reloading {}: {}", reload_path.display(), e),
                }
            }
            Ok(_) => {}
            Err(e) => error!("Watch error: {:?}", e),
        })?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        info!("Watching {} for topology changes", path.display());

        Ok((watcher, rx))
    }
}
