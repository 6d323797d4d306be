//! YouTube embed driver
//!
//! Reconciles adapter props against the embed after every update:
//! - a new playback id, or a different loaded video, loads from the window start
//! - otherwise play/pause only touch the embed when its state differs
//! - seeks apply once per trigger sequence
//! - progress is polled while playing and the trimmed end is enforced here,
//!   since the embed does not reliably stop at `endSeconds` by itself

use super::embed::{EmbedEvent, EmbedPlayer, EmbedState, LoadOptions};
use super::{AdapterEvent, AdapterProps, ResumePoint};
use crate::error::AdapterError;
use std::time::Duration;
use tracing::{debug, warn};

pub(crate) struct YouTubeAdapter {
    embed: Box<dyn EmbedPlayer>,
    props: Option<AdapterProps>,
    ready: bool,

    last_playback_id: Option<u64>,
    last_seek: Option<u64>,
    applied_volume: Option<u8>,
    resume_at: Option<ResumePoint>,

    poll_interval: Duration,
    since_poll: Duration,

    // Ended is reported once per playthrough
    ended_reported: bool,

    events: Vec<AdapterEvent>,
}

impl YouTubeAdapter {
    pub(crate) fn new(
        embed: Box<dyn EmbedPlayer>,
        poll_interval: Duration,
        resume_at: Option<ResumePoint>,
    ) -> Self {
        Self {
            embed,
            props: None,
            ready: false,
            last_playback_id: None,
            last_seek: None,
            applied_volume: None,
            resume_at,
            poll_interval,
            since_poll: Duration::ZERO,
            ended_reported: false,
            events: Vec::new(),
        }
    }

    pub(crate) fn update(&mut self, props: &AdapterProps) {
        self.props = Some(props.clone());
        if !self.ready {
            return;
        }
        self.sync_playback();
        self.sync_volume();
        self.sync_seek();
    }

    pub(crate) fn tick(&mut self, elapsed: Duration) {
        self.embed.advance(elapsed);
        while let Some(event) = self.embed.poll_event() {
            self.handle_embed_event(event);
        }
        self.poll_progress(elapsed);
    }

    pub(crate) fn drain_events(&mut self) -> Vec<AdapterEvent> {
        std::mem::take(&mut self.events)
    }

    fn handle_embed_event(&mut self, event: EmbedEvent) {
        match event {
            EmbedEvent::Ready => self.on_embed_ready(),
            EmbedEvent::StateChange(state) => self.on_embed_state(state),
            EmbedEvent::Error(code) => {
                warn!(code, "Embed reported an error");
                self.events
                    .push(AdapterEvent::Error(AdapterError::Embed { code }));
            }
        }
    }

    fn on_embed_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        self.events.push(AdapterEvent::Ready {
            duration: self.embed.duration(),
        });

        let Some(props) = self.props.clone() else {
            return;
        };
        let options = self.load_options(&props);
        if props.is_playing {
            self.last_playback_id = Some(props.playback_id);
            self.load(&options);
        } else {
            debug!(video_id = %options.video_id, "Cueing video");
            if let Err(e) = self.embed.cue_video(&options) {
                self.events.push(AdapterEvent::Error(e));
            }
        }
        self.sync_volume();
        self.sync_seek();
    }

    fn on_embed_state(&mut self, state: EmbedState) {
        let duration = self.embed.duration();
        if duration > 0.0 {
            self.events.push(AdapterEvent::Duration { duration });
        }

        match state {
            EmbedState::Playing => {
                self.ended_reported = false;
                self.events
                    .push(AdapterEvent::StateChange { is_playing: true });
            }
            EmbedState::Paused => {
                self.events
                    .push(AdapterEvent::StateChange { is_playing: false });
            }
            EmbedState::Ended => {
                self.events
                    .push(AdapterEvent::StateChange { is_playing: false });
                self.report_ended();
            }
            EmbedState::Unstarted | EmbedState::Buffering | EmbedState::Cued => {}
        }
    }

    fn sync_playback(&mut self) {
        let Some(props) = self.props.clone() else {
            return;
        };

        if props.is_playing {
            let is_new_request = self.last_playback_id != Some(props.playback_id);
            let loaded = self.embed.video_id();
            if is_new_request || loaded.as_deref() != Some(props.src.as_str()) {
                self.last_playback_id = Some(props.playback_id);
                let options = self.load_options(&props);
                self.load(&options);
            } else if self.embed.player_state() != EmbedState::Playing {
                self.embed.play_video();
            }
        } else if self.embed.player_state() == EmbedState::Playing {
            self.embed.pause_video();
        }
    }

    fn sync_volume(&mut self) {
        let Some(volume) = self.props.as_ref().map(|p| p.volume) else {
            return;
        };
        if self.applied_volume != Some(volume) {
            self.embed.set_volume(volume);
            self.applied_volume = Some(volume);
        }
    }

    fn sync_seek(&mut self) {
        let Some(trigger) = self.props.as_ref().and_then(|p| p.seek) else {
            return;
        };
        if self.last_seek != Some(trigger.sequence) {
            debug!(seconds = trigger.seconds, sequence = trigger.sequence, "Seeking embed");
            self.last_seek = Some(trigger.sequence);
            self.ended_reported = false;
            self.embed.seek_to(trigger.seconds, true);
        }
    }

    fn load_options(&mut self, props: &AdapterProps) -> LoadOptions {
        let start_seconds = match self.resume_at.take() {
            Some(resume) if resume.playback_id == props.playback_id => resume.seconds,
            _ => props.start_time.unwrap_or(0.0),
        };
        LoadOptions {
            video_id: props.src.clone(),
            start_seconds,
            end_seconds: props.end_time,
        }
    }

    fn load(&mut self, options: &LoadOptions) {
        debug!(
            video_id = %options.video_id,
            start = options.start_seconds,
            end = ?options.end_seconds,
            "Loading video"
        );
        self.ended_reported = false;
        self.since_poll = Duration::ZERO;
        if let Err(e) = self.embed.load_video(options) {
            self.events.push(AdapterEvent::Error(e));
        }
    }

    fn poll_progress(&mut self, elapsed: Duration) {
        let Some(props) = self.props.as_ref() else {
            return;
        };
        if !(self.ready && props.is_playing) {
            self.since_poll = Duration::ZERO;
            return;
        }

        self.since_poll += elapsed;
        if self.since_poll < self.poll_interval {
            return;
        }
        self.since_poll = Duration::ZERO;

        let current_time = self.embed.current_time();
        let end_time = props.end_time;
        self.events.push(AdapterEvent::Progress { current_time });

        if let Some(end) = end_time {
            if current_time >= end && !self.ended_reported {
                debug!(current_time, end, "Reached end of window");
                self.embed.pause_video();
                self.events
                    .push(AdapterEvent::StateChange { is_playing: false });
                self.report_ended();
            }
        }
    }

    fn report_ended(&mut self) {
        if !self.ended_reported {
            self.ended_reported = true;
            self.events.push(AdapterEvent::Ended);
        }
    }
}

impl Drop for YouTubeAdapter {
    fn drop(&mut self) {
        self.embed.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{SeekTrigger, SimulatedEmbedFactory, SimulatedEmbedHandle};
    use crate::adapter::{EmbedFactory, EmbedKind};
    use crate::types::Provider;

    const TICK: Duration = Duration::from_millis(100);

    fn props() -> AdapterProps {
        AdapterProps {
            src: "abc".to_string(),
            platform: Provider::YouTube,
            is_playing: true,
            volume: 80,
            seek: None,
            start_time: None,
            end_time: None,
            playback_id: 1,
        }
    }

    fn driver(factory: &SimulatedEmbedFactory) -> (YouTubeAdapter, SimulatedEmbedHandle) {
        let embed = factory.create(EmbedKind::YouTube).unwrap();
        let handle = factory.latest().unwrap();
        (
            YouTubeAdapter::new(embed, Duration::from_millis(500), None),
            handle,
        )
    }

    fn run(driver: &mut YouTubeAdapter, ticks: usize) -> Vec<AdapterEvent> {
        for _ in 0..ticks {
            driver.tick(TICK);
        }
        driver.drain_events()
    }

    #[test]
    fn loads_once_ready() {
        let factory = SimulatedEmbedFactory::new()
            .with_media("abc", 120.0)
            .with_bootstrap(Duration::from_millis(200));
        let (mut driver, embed) = driver(&factory);

        driver.update(&props());
        assert!(embed.loads().is_empty());

        let events = run(&mut driver, 2);
        assert!(events.contains(&AdapterEvent::Ready { duration: 0.0 }));
        assert_eq!(embed.loads().len(), 1);
        assert_eq!(embed.loads()[0].start_seconds, 0.0);
        assert_eq!(embed.volumes(), vec![80]);
    }

    #[test]
    fn pause_and_resume_do_not_reload() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let (mut driver, embed) = driver(&factory);
        driver.update(&props());
        run(&mut driver, 1);

        driver.update(&AdapterProps {
            is_playing: false,
            ..props()
        });
        assert_eq!(embed.state(), EmbedState::Paused);

        driver.update(&props());
        assert_eq!(embed.state(), EmbedState::Playing);
        assert_eq!(embed.loads().len(), 1);
    }

    #[test]
    fn new_playback_id_reloads_same_video() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let (mut driver, embed) = driver(&factory);
        driver.update(&props());
        run(&mut driver, 1);

        driver.update(&AdapterProps {
            playback_id: 2,
            start_time: Some(30.0),
            ..props()
        });

        let loads = embed.loads();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[1].start_seconds, 30.0);
    }

    #[test]
    fn seek_applies_once_per_sequence() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let (mut driver, embed) = driver(&factory);
        driver.update(&props());
        run(&mut driver, 1);

        let seek = Some(SeekTrigger {
            seconds: 40.0,
            sequence: 1,
        });
        driver.update(&AdapterProps { seek, ..props() });
        driver.update(&AdapterProps { seek, ..props() });
        driver.update(&AdapterProps {
            seek: Some(SeekTrigger {
                seconds: 40.0,
                sequence: 2,
            }),
            ..props()
        });

        assert_eq!(embed.seeks(), vec![40.0, 40.0]);
    }

    #[test]
    fn seek_before_ready_is_applied_after_load() {
        let factory = SimulatedEmbedFactory::new()
            .with_media("abc", 120.0)
            .with_bootstrap(Duration::from_millis(300));
        let (mut driver, embed) = driver(&factory);

        driver.update(&AdapterProps {
            seek: Some(SeekTrigger {
                seconds: 12.0,
                sequence: 1,
            }),
            ..props()
        });
        assert!(embed.seeks().is_empty());

        run(&mut driver, 3);
        assert_eq!(embed.seeks(), vec![12.0]);
        assert_eq!(embed.loads().len(), 1);
    }

    #[test]
    fn progress_polled_every_interval() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let (mut driver, _embed) = driver(&factory);
        driver.update(&props());

        let events = run(&mut driver, 10);
        let progress = events
            .iter()
            .filter(|e| matches!(e, AdapterEvent::Progress { .. }))
            .count();
        assert_eq!(progress, 2);
    }

    #[test]
    fn trimmed_end_pauses_and_reports_once() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let (mut driver, embed) = driver(&factory);
        let trimmed = AdapterProps {
            start_time: Some(10.0),
            end_time: Some(11.0),
            ..props()
        };
        driver.update(&trimmed);

        let events = run(&mut driver, 20);
        let ended = events
            .iter()
            .filter(|e| matches!(e, AdapterEvent::Ended))
            .count();
        assert_eq!(ended, 1);
        assert!(events.contains(&AdapterEvent::StateChange { is_playing: false }));
        assert_eq!(embed.state(), EmbedState::Paused);
    }

    #[test]
    fn natural_end_reports_ended() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 1.0);
        let (mut driver, _embed) = driver(&factory);
        driver.update(&props());

        let events = run(&mut driver, 15);
        assert!(events.contains(&AdapterEvent::Ended));
        assert!(events.contains(&AdapterEvent::Duration { duration: 1.0 }));
    }

    #[test]
    fn embed_errors_are_forwarded() {
        let factory = SimulatedEmbedFactory::new();
        let (mut driver, _embed) = driver(&factory);
        driver.update(&props());

        let events = run(&mut driver, 1);
        assert!(events.contains(&AdapterEvent::Error(AdapterError::Embed { code: 100 })));
    }

    #[test]
    fn resume_point_only_for_same_playback() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let embed = factory.create(EmbedKind::YouTube).unwrap();
        let handle = factory.latest().unwrap();
        let resume = ResumePoint {
            playback_id: 1,
            seconds: 42.0,
        };
        let mut driver = YouTubeAdapter::new(embed, Duration::from_millis(500), Some(resume));
        driver.update(&props());
        run(&mut driver, 1);
        assert_eq!(handle.loads()[0].start_seconds, 42.0);

        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let embed = factory.create(EmbedKind::YouTube).unwrap();
        let handle = factory.latest().unwrap();
        let mut driver = YouTubeAdapter::new(embed, Duration::from_millis(500), Some(resume));
        driver.update(&AdapterProps {
            playback_id: 2,
            start_time: Some(5.0),
            ..props()
        });
        run(&mut driver, 1);
        assert_eq!(handle.loads()[0].start_seconds, 5.0);
    }

    #[test]
    fn drop_destroys_embed() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let (driver, embed) = driver(&factory);
        drop(driver);
        assert!(embed.is_destroyed());
    }
}
