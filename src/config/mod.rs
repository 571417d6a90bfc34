mod types;

pub use types::{Config, PanelConfig};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

pub type SharedConfig = Arc<RwLock<Config>>;

pub fn load_config() -> Config {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Config {
    let config = if config_path.exists() {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {:?}", config_path);
                    config
                }
                Err(e) => {
                    log::error!("Failed to parse config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                log::error!("Failed to read config file: {}", e);
                Config::default()
            }
        }
    } else {
        log::info!("No config file found at {:?}, using defaults", config_path);
        Config::default()
    };

    let issues = config.validate();
    let errors: Vec<_> = issues.iter().filter(|i| i.is_error).collect();

    for issue in &issues {
        if issue.is_error {
            log::error!("Config: {}", issue);
        } else {
            log::warn!("Config: {}", issue);
        }
    }

    if !errors.is_empty() {
        log::error!("Config has errors; falling back to defaults.");
        return Config::default();
    }

    config
}

pub fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("topnotch")
        .join("config.toml")
}

/// Minimum spacing between two reloads.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Coalesces bursts of file events into at most one reload per window. A
/// change seen too soon after the last reload stays pending, it is not lost.
#[derive(Debug)]
struct ReloadDebounce {
    pending: bool,
    last_reload: Instant,
}

impl ReloadDebounce {
    fn new(now: Instant) -> Self {
        Self {
            pending: false,
            last_reload: now,
        }
    }

    fn mark_changed(&mut self) {
        self.pending = true;
    }

    /// Whether a pending change should be applied at `now`. Consumes it.
    fn take_due(&mut self, now: Instant) -> bool {
        if !self.pending || now.duration_since(self.last_reload) <= RELOAD_DEBOUNCE {
            return false;
        }
        self.pending = false;
        self.last_reload = now;
        true
    }
}

pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    config: SharedConfig,
    debounce: Mutex<ReloadDebounce>,
}

impl ConfigWatcher {
    pub fn new(config: SharedConfig) -> Result<Self, notify::Error> {
        let (tx, rx) = channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;

        let config_path = get_config_path();

        // Watch the directory so editors that replace the file are seen
        let config_dir = config_path.parent().unwrap_or(&config_path);
        if !config_dir.exists() {
            let _ = std::fs::create_dir_all(config_dir);
        }

        watcher.watch(config_dir, RecursiveMode::NonRecursive)?;
        log::info!("Watching config directory: {:?}", config_dir);

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            config,
            debounce: Mutex::new(ReloadDebounce::new(Instant::now())),
        })
    }

    /// Check for config changes and reload if needed. Returns true if config was reloaded.
    pub fn check_and_reload(&self) -> bool {
        let Ok(mut debounce) = self.debounce.lock() else {
            log::error!("Config debounce lock poisoned");
            return false;
        };

        while let Ok(event) = self.receiver.try_recv() {
            match event {
                Ok(event) => {
                    if is_config_event(&event) {
                        debounce.mark_changed();
                    }
                }
                Err(e) => {
                    log::error!("Config watch error: {}", e);
                }
            }
        }

        if !debounce.take_due(Instant::now()) {
            return false;
        }

        log::info!("Config file changed, reloading...");
        let new_config = load_config();
        match self.config.write() {
            Ok(mut cfg) => {
                *cfg = new_config;
                true
            }
            Err(e) => {
                log::error!("Config lock poisoned: {}", e);
                false
            }
        }
    }
}

fn is_config_event(event: &Event) -> bool {
    let touches_config = event
        .paths
        .iter()
        .any(|p| p.file_name().map(|n| n == "config.toml").unwrap_or(false));
    touches_config && (event.kind.is_modify() || event.kind.is_create())
}
