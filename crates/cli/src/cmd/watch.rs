//! Watch the project and regenerate on layout changes

use anyhow::{Context, Result};
use crossbeam_channel as channel;
use layoutd_core::LogRefresh;
use layoutd_engine::ProjectSession;
use layoutd_watcher::{
    rescan_roots, DebounceConfig, FsWatcher, IgnoreConfig, IgnoreRules, LayoutFiles, WatchEvent,
    WatchMessage,
};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::locks::DaemonLock;
use crate::util;
use crate::workspace::Workspace;

pub async fn run(no_dispatch: bool) -> Result<()> {
    let root = util::find_project_root()?;
    let lock = DaemonLock::acquire(&util::state_dir(&root))?;
    let workspace = Arc::new(Workspace::load(&root)?);
    let config = workspace.config();

    let ignore_config = IgnoreConfig::from(&config.watch);
    let ignore = IgnoreRules::load(&root, ignore_config.clone()).context("Failed to load ignore rules")?;
    let rescan_ignore = IgnoreRules::load(&root, ignore_config).context("Failed to load ignore rules")?;
    let active_sources = ignore.active_sources();
    let tracked = LayoutFiles::from_config(workspace.project().clone(), ignore, &config.watch);

    let mut debounce = DebounceConfig::from(&config.watch);
    if no_dispatch {
        debounce.dispatch_enabled = false;
    }

    let session = Arc::new(ProjectSession::attach(
        workspace.project().clone(),
        Arc::new(tracked),
        workspace.registry().clone(),
        Arc::new(LogRefresh),
        debounce.clone(),
    ));

    let mut watcher = FsWatcher::new().context("Failed to create file watcher")?;
    watcher
        .watch_root(&root)
        .with_context(|| format!("Failed to watch {}", root.display()))?;

    println!("{} {}", "Watching".green().bold(), root.display());
    println!(
        "  {} units, {} generator models, debounce {}ms, {} ignore sources",
        workspace.project().unit_ids().len(),
        workspace.registry().len(),
        debounce.delay.as_millis(),
        active_sources
    );
    if !debounce.dispatch_enabled {
        println!("  {}", "Generation disabled (--no-dispatch)".yellow());
    }
    println!("  {}", "Press Ctrl-C to stop".dimmed());

    let (stop_tx, stop_rx) = channel::bounded::<()>(1);
    let pump = EventPump {
        session: session.clone(),
        workspace: workspace.clone(),
        rescan_ignore,
        rescan_on_overflow: config.watch.rescan_on_overflow,
    };
    let events_rx = watcher.receiver().clone();
    let pump_thread = std::thread::Builder::new()
        .name("layoutd-events".to_string())
        .spawn(move || pump.run(events_rx, stop_rx))
        .context("Failed to spawn event thread")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down");
    let _ = stop_tx.send(());
    if pump_thread.join().is_err() {
        warn!("Event thread panicked");
    }
    drop(watcher);
    session.dispose();
    lock.release()?;

    println!("{}", "Stopped".dimmed());
    Ok(())
}

/// Moves watcher messages into the session on a dedicated thread
struct EventPump {
    session: Arc<ProjectSession>,
    workspace: Arc<Workspace>,
    rescan_ignore: IgnoreRules,
    rescan_on_overflow: bool,
}

impl EventPump {
    fn run(self, events: channel::Receiver<WatchMessage>, stop: channel::Receiver<()>) {
        loop {
            channel::select! {
                recv(stop) -> _ => break,
                recv(events) -> message => {
                    let Ok(message) = message else { break };
                    self.handle(message);
                }
            }
        }
    }

    fn handle(&self, message: WatchMessage) {
        match message {
            Ok(WatchEvent::Events(events)) => {
                let config_path = self.workspace.config_path();
                if events.iter().any(|e| e.path.as_deref() == Some(config_path.as_path())) {
                    if let Err(e) = self.workspace.reload() {
                        warn!("Keeping previous configuration: {:#}", e);
                    }
                }
                self.session.on_events(&events);
            }
            Ok(WatchEvent::Overflow) if self.rescan_on_overflow => {
                warn!("File watcher overflowed, rescanning unit roots");
                let events = rescan_roots(&self.unit_roots(), &self.rescan_ignore);
                self.session.on_events(&events);
            }
            Ok(WatchEvent::Overflow) => {
                warn!("File watcher overflowed, some layout changes may be missed");
            }
            Err(e) => warn!("File watcher error: {}", e),
        }
    }

    fn unit_roots(&self) -> Vec<PathBuf> {
        let project = self.workspace.project();
        project
            .unit_ids()
            .iter()
            .filter_map(|id| project.unit(id))
            .map(|unit| unit.root)
            .collect()
    }
}
