//! Player session driven from the command line
//!
//! Owns the orchestrator, the controller and a simulated embed, and plays the
//! role of the page: every intent is followed by a render, and `wait`
//! advances the simulated clock tick by tick.

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::script::Command;
use preludio_playback::binder::{self, RequestDraft};
use preludio_playback::presentation::{self, immersive, ImmersiveView, MiniBarView, Scrubber};
use preludio_playback::{
    format_time, snapshot, PersistedSnapshot, PlayRequest, PlaybackOrchestrator, PlayerController,
    PlayerEvent, PlayerMode, SimulatedEmbedFactory,
};
use preludio_storage::FileStore;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct Session {
    player: PlaybackOrchestrator,
    controller: PlayerController,
    factory: SimulatedEmbedFactory,
    tick: Duration,
    defaults: RequestDraft,
    log: Vec<String>,
}

impl Session {
    /// Restore the session persisted under the configured state directory
    pub fn open(config: &CliConfig) -> Self {
        let store = FileStore::new(&config.state_dir);
        let player = PlaybackOrchestrator::restore(config.player.clone(), store);

        let simulation = &config.simulation;
        let factory = simulation.media.iter().fold(
            SimulatedEmbedFactory::new()
                .with_bootstrap(simulation.bootstrap())
                .with_fallback_duration(simulation.default_duration_secs),
            |factory, media| factory.with_media(media.id.clone(), media.duration_secs),
        );
        let controller = PlayerController::new(Rc::new(factory.clone()), &config.player);

        let mut session = Self {
            player,
            controller,
            factory,
            tick: simulation.tick(),
            defaults: RequestDraft::default(),
            log: Vec::new(),
        };
        session.render();
        session
    }

    /// Page-level defaults for `play-content`
    #[must_use]
    pub fn with_defaults(mut self, defaults: RequestDraft) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn player(&self) -> &PlaybackOrchestrator {
        &self.player
    }

    pub fn embeds_created(&self) -> usize {
        self.factory.created()
    }

    /// Lines printed so far (`status`, `open`, notices)
    pub fn output(&self) -> &[String] {
        &self.log
    }

    pub fn run(&mut self, commands: &[Command]) -> Result<()> {
        for command in commands {
            self.execute(command)?;
        }
        Ok(())
    }

    pub fn execute(&mut self, command: &Command) -> Result<()> {
        debug!(?command, "Executing");
        match command {
            Command::Play(request) => self.play(request.clone()),
            Command::PlayContent(path) => {
                let content = std::fs::read_to_string(path)?;
                let request = binder::resolve_request(Some(&content), &self.defaults)
                    .ok_or_else(|| {
                        CliError::command(format!("{} names no audio source", path.display()))
                    })?;
                self.play(request);
            }
            Command::Pause => self.act(PlaybackOrchestrator::pause),
            Command::Toggle => self.act(presentation::toggle),
            Command::Seek(seconds) => self.act(|p| p.seek_to(*seconds)),
            Command::Skip(None) => self.act(presentation::skip_forward),
            Command::Skip(Some(delta)) => self.act(|p| presentation::skip_by(p, *delta)),
            Command::Volume(level) => self.act(|p| p.set_volume(*level)),
            Command::Mode(mode) => self.act(|p| p.set_mode(*mode)),
            Command::Scrub(display_time) => {
                if self.player.state().mode != PlayerMode::Immersive {
                    return Err(CliError::command("scrub needs the immersive view"));
                }
                let mut scrubber = Scrubber::new();
                scrubber.begin(&self.player);
                scrubber.update(*display_time);
                self.act(|p| scrubber.end(p));
            }
            Command::Open => {
                let mut url = None;
                self.act(|p| url = immersive::open_attribution(p));
                match url {
                    Some(url) => self.print(format!("open {url}")),
                    None => self.print("no source page".to_string()),
                }
            }
            Command::Wait(duration) => self.wait(*duration),
            Command::Dismiss => self.act(PlaybackOrchestrator::dismiss),
            Command::Status => {
                let line = self.status_line();
                self.print(line);
            }
        }
        Ok(())
    }

    /// Advance the simulated clock
    pub fn wait(&mut self, duration: Duration) {
        let mut remaining = duration;
        while !remaining.is_zero() {
            let step = remaining.min(self.tick);
            self.controller.tick(&mut self.player, step);
            remaining -= step;
        }
        self.flush_events();
    }

    /// One-line summary of whichever surface is showing
    pub fn status_line(&self) -> String {
        let state = self.player.state();
        match state.mode {
            PlayerMode::Hidden if state.has_source() => {
                format!("[hidden] {} (paused: {})", state.src, !state.is_playing)
            }
            PlayerMode::Hidden => "[hidden] nothing loaded".to_string(),
            PlayerMode::Mini => match MiniBarView::from_state(state) {
                Some(view) => format!(
                    "[mini] {} - {} | {} {} / {} ({:.0}%)",
                    view.title,
                    view.subtitle,
                    view.play_label,
                    format_time(view.timeline.display_time),
                    format_time(view.timeline.display_duration),
                    view.progress_percent,
                ),
                None => String::new(),
            },
            PlayerMode::Immersive => match ImmersiveView::from_state(state, &Scrubber::new()) {
                Some(view) => format!(
                    "[immersive] {} by {} | {} {} / {}{}",
                    view.title,
                    view.composer,
                    view.play_label,
                    view.elapsed_label,
                    view.total_label,
                    view.attribution
                        .map(|a| format!(" | {}", a.label))
                        .unwrap_or_default(),
                ),
                None => String::new(),
            },
        }
    }

    fn play(&mut self, request: PlayRequest) {
        // Rejections surface as notices
        if self.player.play(request).is_ok() {
            self.render();
        } else {
            self.flush_events();
        }
    }

    fn act(&mut self, f: impl FnOnce(&mut PlaybackOrchestrator)) {
        f(&mut self.player);
        self.render();
    }

    fn render(&mut self) {
        self.controller.render(&mut self.player);
        self.flush_events();
    }

    fn flush_events(&mut self) {
        for event in self.player.drain_events() {
            match event {
                PlayerEvent::Notice { message } => {
                    warn!(%message, "Notice");
                    self.print(format!("notice: {message}"));
                }
                PlayerEvent::PositionChanged { .. } => {}
                other => info!(event = ?other, "Player event"),
            }
        }
    }

    fn print(&mut self, line: String) {
        println!("{line}");
        self.log.push(line);
    }
}

/// Stored snapshot, if any is usable
pub fn inspect(config: &CliConfig) -> Result<Option<PersistedSnapshot>> {
    let store = FileStore::new(&config.state_dir);
    snapshot::load(&store, &config.player.storage_key, &config.player).map_err(CliError::from)
}

/// Remove the stored snapshot
pub fn clear(config: &CliConfig) -> Result<()> {
    let store = FileStore::new(&config.state_dir);
    snapshot::clear(&store, &config.player.storage_key)?;
    Ok(())
}
