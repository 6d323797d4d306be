//! Player controller - binds the orchestrator to a mounted adapter
//!
//! At most one adapter is mounted at a time. A change of source or provider
//! tears the old mount down (clearing its proxy) before the new one is
//! created and registered.

use crate::{
    adapter::{
        AdapterEvent, AdapterProps, AdapterView, AudioAdapter, EmbedFactory, ResumePoint,
        SeekTrigger,
    },
    orchestrator::PlaybackOrchestrator,
    proxy::InstanceProxy,
    types::{PlayerConfig, Provider},
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on event/prop round trips per render
const MAX_RENDER_PASSES: usize = 8;

/// Proxy registered for a mount; seeks become adapter props
struct ControllerProxy {
    seek: Rc<Cell<Option<SeekTrigger>>>,
}

impl InstanceProxy for ControllerProxy {
    fn seek_to(&self, seconds: f64) {
        let sequence = self.seek.get().map_or(1, |t| t.sequence + 1);
        debug!(seconds, sequence, "Seek requested");
        self.seek.set(Some(SeekTrigger { seconds, sequence }));
    }

    fn set_volume(&self, level: u8) {
        // Volume reaches the adapter through props
        debug!(level, "Volume requested");
    }
}

struct Mount {
    src: String,
    provider: Provider,
    adapter: AudioAdapter,
    seek: Rc<Cell<Option<SeekTrigger>>>,
}

/// Owns the mounted adapter and routes its callbacks into the orchestrator
pub struct PlayerController {
    factory: Rc<dyn EmbedFactory>,
    poll_interval: Duration,
    mount: Option<Mount>,
}

impl PlayerController {
    pub fn new(factory: Rc<dyn EmbedFactory>, config: &PlayerConfig) -> Self {
        Self {
            factory,
            poll_interval: config.progress_interval(),
            mount: None,
        }
    }

    /// Reconcile the mount with the current state
    ///
    /// Call after every intent handled by the orchestrator.
    pub fn render(&mut self, player: &mut PlaybackOrchestrator) {
        for _ in 0..MAX_RENDER_PASSES {
            self.reconcile_mount(player);

            let Some(mount) = self.mount.as_mut() else {
                return;
            };
            let props = AdapterProps::from_state(player.state(), mount.seek.get());
            mount.adapter.update(&props);

            if self.route_events(player) == 0 {
                return;
            }
        }
        warn!("Adapter kept emitting events during render");
    }

    /// Advance the adapter clock and settle the resulting events
    pub fn tick(&mut self, player: &mut PlaybackOrchestrator, elapsed: Duration) {
        if let Some(mount) = self.mount.as_mut() {
            mount.adapter.tick(elapsed);
        }
        self.route_events(player);
        self.render(player);
    }

    pub fn view(&self) -> AdapterView {
        self.mount
            .as_ref()
            .map_or(AdapterView::Empty, |m| m.adapter.view())
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    fn reconcile_mount(&mut self, player: &mut PlaybackOrchestrator) {
        let state = player.state();
        let stale = match &self.mount {
            Some(mount) => {
                state.src.is_empty() || mount.src != state.src || mount.provider != state.platform
            }
            None => false,
        };
        if stale {
            if let Some(mount) = self.mount.take() {
                Self::unmount(mount, player);
            }
        }

        if self.mount.is_none() && player.state().has_source() {
            self.mount = Some(self.mount_for(player));
        }
    }

    fn mount_for(&self, player: &mut PlaybackOrchestrator) -> Mount {
        let state = player.state();
        let src = state.src.clone();
        let provider = state.platform;
        let timeline = state.timeline();
        let resume_at = (state.current_time > timeline.start_offset).then_some(ResumePoint {
            playback_id: state.playback_id,
            seconds: state.current_time,
        });

        let seek = Rc::new(Cell::new(None));
        let proxy: Rc<dyn InstanceProxy> = Rc::new(ControllerProxy {
            seek: Rc::clone(&seek),
        });
        player.set_player_instance(Some(proxy));

        info!(src = %src, provider = %provider, resume_at = ?resume_at, "Adapter mounted");
        let adapter = AudioAdapter::new(provider, Rc::clone(&self.factory), self.poll_interval)
            .with_resume_at(resume_at);

        Mount {
            src,
            provider,
            adapter,
            seek,
        }
    }

    fn unmount(mount: Mount, player: &mut PlaybackOrchestrator) {
        player.set_player_instance(None);
        info!(src = %mount.src, provider = %mount.provider, "Adapter unmounted");
        // Dropping the adapter destroys its embed and any queued events
        drop(mount);
    }

    /// Forward adapter events; returns how many were routed
    fn route_events(&mut self, player: &mut PlaybackOrchestrator) -> usize {
        let Some(mount) = self.mount.as_mut() else {
            return 0;
        };
        let events = mount.adapter.drain_events();
        let count = events.len();

        for event in events {
            match event {
                AdapterEvent::Ready { duration } => {
                    info!(src = %mount.src, duration, "Player ready");
                    player.on_ready(duration);
                }
                AdapterEvent::Progress { current_time } => player.on_progress(current_time),
                AdapterEvent::Duration { duration } => player.on_duration(duration),
                AdapterEvent::StateChange { is_playing } => player.on_state_change(is_playing),
                AdapterEvent::Ended => {
                    info!(src = %mount.src, "Playback ended");
                    player.on_state_change(false);
                }
                AdapterEvent::Error(e) => player.on_error(&e),
            }
        }

        count
    }
}
