use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// What the REPL hears about a watched config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// The file was written or recreated and should be re-read
    Changed(PathBuf),
    Error(String),
}

/// Hot reload for config files.
///
/// notify runs its own thread; only writes and creations are forwarded,
/// as `ConfigEvent`s on the REPL's channel.
pub struct ConfigWatcher {
    watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl ConfigWatcher {
    pub fn new(tx: Sender<ConfigEvent>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            for event in config_events(res) {
                // The REPL has exited if the receiver is gone
                if tx.send(event).is_err() {
                    return;
                }
            }
        })?;

        Ok(Self {
            watcher,
            watched: Vec::new(),
        })
    }

    /// Reload `path` whenever it changes. Returns false if it was already
    /// being watched.
    pub fn watch_config(&mut self, path: &Path) -> notify::Result<bool> {
        if self.watched.iter().any(|p| p == path) {
            return Ok(false);
        }
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        log::info!("Watching {} for config changes", path.display());
        self.watched.push(path.to_path_buf());
        Ok(true)
    }
}

/// Reduce a raw notify result to the events worth a reload
fn config_events(res: notify::Result<Event>) -> Vec<ConfigEvent> {
    match res {
        Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
            event.paths.into_iter().map(ConfigEvent::Changed).collect()
        }
        Ok(event) => {
            log::debug!("Ignoring watch event {:?}", event.kind);
            Vec::new()
        }
        Err(e) => vec![ConfigEvent::Error(e.to_string())],
    }
}
