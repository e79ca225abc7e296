use async_channel::Sender;
use directories::ProjectDirs;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ratekit::animator::{DEFAULT_DURATION_MS, DEFAULT_FRAME_RATE};
use ratekit::band::BandSpec;
use ratekit::control::Command;
use ratekit::data::{DEFAULT_GOAL, Username};
use ratekit::{AnimationSpec, BandTable, ContestType, Rating, Stat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATA_FILE_NAME: &str = "atcoder-rating.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CardConfig {
    pub contest: ContestType,
    #[serde(default)]
    pub stat: Stat,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub username: Username,
    #[serde(default = "default_goal")]
    pub goal: Rating,
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Ring diameter in pixels.
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default)]
    pub bands: Vec<BandSpec>,
    #[serde(default = "default_cards")]
    pub cards: Vec<CardConfig>,
}

fn default_goal() -> Rating {
    DEFAULT_GOAL
}

fn default_duration_ms() -> f64 {
    DEFAULT_DURATION_MS
}

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

fn default_size() -> f64 {
    160.0
}

fn default_cards() -> Vec<CardConfig> {
    vec![
        CardConfig {
            contest: ContestType::Algorithm,
            stat: Stat::Current,
        },
        CardConfig {
            contest: ContestType::Heuristic,
            stat: Stat::Current,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: Username::default(),
            goal: default_goal(),
            data_path: None,
            duration_ms: default_duration_ms(),
            frame_rate: default_frame_rate(),
            size: default_size(),
            bands: Vec::new(),
            cards: default_cards(),
        }
    }
}

impl Config {
    pub fn band_table(&self) -> BandTable {
        if self.bands.is_empty() {
            return BandTable::atcoder();
        }
        BandTable::from_specs(&self.bands).unwrap_or_else(|e| {
            log::warn!("Ignoring configured bands: {}", e);
            BandTable::atcoder()
        })
    }

    pub fn animation_spec(&self) -> AnimationSpec {
        AnimationSpec::new(self.duration_ms, self.frame_rate).unwrap_or_else(|e| {
            log::warn!("Ignoring configured animation timing: {}", e);
            AnimationSpec::default()
        })
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_path
            .clone()
            .or_else(|| project_dirs().map(|d| d.data_dir().join(DATA_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(DATA_FILE_NAME))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "troia", "ratering")
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = project_dirs().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("RATERING").try_parsing(true))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default config: {}", e);
            Config::default()
        }
    }
}

/// First start writes the commented default config, then loads as usual.
pub fn load_or_setup() -> Config {
    if let Err(e) = write_default_config() {
        log::warn!("Failed to write default config: {}", e);
    }
    load_or_default()
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The two files whose changes trigger a reload, and the directories to watch
/// for them. Paths are absolute so they compare equal to what notify reports.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedPaths {
    pub config: PathBuf,
    pub data: PathBuf,
}

impl WatchedPaths {
    pub fn new(config: &Path, data: &Path) -> Self {
        Self {
            config: absolute(config),
            data: absolute(data),
        }
    }

    pub fn dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = [&self.config, &self.data]
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect();
        dirs.dedup();
        dirs
    }

    pub fn matches(&self, event: &Event) -> bool {
        matches!(
            event.kind,
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
        ) && event
            .paths
            .iter()
            .any(|p| p == &self.config || p == &self.data)
    }

    pub fn touches_config(&self, event: &Event) -> bool {
        event.paths.iter().any(|p| p == &self.config)
    }
}

fn watch_dirs(watcher: &mut RecommendedWatcher, dirs: &[PathBuf]) {
    for dir in dirs {
        if let Err(e) = fs_err::create_dir_all(dir) {
            log::error!("Failed to create directory for watching: {}", e);
            continue;
        }
        if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
            log::error!("Failed to watch {}: {}", dir.display(), e);
        }
    }
}

/// Requests a reload whenever the config file or the rating data file changes.
/// A config edit that moves `data_path` moves the watch along with it.
pub async fn run_async_watcher(commands: Sender<Command>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let mut paths = WatchedPaths::new(&config_path, &load_or_default().data_path());

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };
    watch_dirs(&mut watcher, &paths.dirs());

    while let Ok(res) = bridge_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::error!("Watch error: {}", e);
                continue;
            }
        };
        if !paths.matches(&event) {
            continue;
        }

        if paths.touches_config(&event) {
            let moved = WatchedPaths::new(&config_path, &load_or_default().data_path());
            if moved != paths {
                let (old_dirs, new_dirs) = (paths.dirs(), moved.dirs());
                for dir in old_dirs.iter().filter(|d| !new_dirs.contains(d)) {
                    let _ = watcher.unwatch(dir);
                }
                let added: Vec<PathBuf> = new_dirs
                    .into_iter()
                    .filter(|d| !old_dirs.contains(d))
                    .collect();
                watch_dirs(&mut watcher, &added);
                log::info!("Now watching rating data at {}", moved.data.display());
                paths = moved;
            }
        }

        if commands.send(Command::Reload).await.is_err() {
            break;
        }
    }
}
