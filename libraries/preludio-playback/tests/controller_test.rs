//! End-to-end tests: orchestrator, controller and adapter over simulated embeds
//!
//! Every scenario drives the real render/tick loop the way a host would.

use preludio_playback::adapter::{AdapterView, EmbedKind, EmbedState};
use preludio_playback::{
    AdapterEvent, AdapterProps, AudioAdapter, PlayRequest, PlaybackOrchestrator, PlayerConfig,
    PlayerController, PlayerEvent, Provider, SimulatedEmbedFactory,
};
use preludio_storage::MemoryStore;
use std::rc::Rc;
use std::time::Duration;

// ===== Helpers =====

const TICK: Duration = Duration::from_millis(100);

struct Harness {
    player: PlaybackOrchestrator,
    controller: PlayerController,
    factory: SimulatedEmbedFactory,
}

impl Harness {
    fn new(factory: SimulatedEmbedFactory) -> Self {
        Self::with_store(factory, MemoryStore::new())
    }

    fn with_store(factory: SimulatedEmbedFactory, store: MemoryStore) -> Self {
        let config = PlayerConfig::default();
        let mut player = PlaybackOrchestrator::restore(config.clone(), store);
        let mut controller = PlayerController::new(Rc::new(factory.clone()), &config);
        controller.render(&mut player);
        Self {
            player,
            controller,
            factory,
        }
    }

    fn play(&mut self, request: PlayRequest) {
        self.player.play(request).unwrap();
        self.controller.render(&mut self.player);
    }

    fn act(&mut self, f: impl FnOnce(&mut PlaybackOrchestrator)) {
        f(&mut self.player);
        self.controller.render(&mut self.player);
    }

    fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.controller.tick(&mut self.player, TICK);
        }
    }
}

fn catalog() -> SimulatedEmbedFactory {
    SimulatedEmbedFactory::new()
        .with_media("abc", 120.0)
        .with_media("def", 240.0)
}

// ===== Lazy Mount =====

#[test]
fn test_restored_session_mounts_placeholder_only() {
    let store = MemoryStore::new();
    {
        let mut harness = Harness::with_store(catalog(), store.clone());
        harness.play(PlayRequest::new("abc", Provider::YouTube));
        harness.run(10);
    }

    let mut harness = Harness::with_store(catalog(), store);

    assert!(harness.controller.is_mounted());
    assert_eq!(harness.controller.view(), AdapterView::Placeholder);
    assert_eq!(harness.factory.created(), 0);

    harness.act(|p| p.toggle_play());

    assert_eq!(
        harness.controller.view(),
        AdapterView::Embed(EmbedKind::YouTube)
    );
    assert_eq!(harness.factory.created(), 1);
}

#[test]
fn test_pause_before_ready_cues_without_playing() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube).with_bounds(Some(30.0), None));
    harness.act(|p| p.pause());
    harness.run(3);

    let embed = harness.factory.latest().unwrap();
    assert!(embed.loads().is_empty());
    assert_eq!(embed.cues().len(), 1);
    assert_eq!(embed.cues()[0].start_seconds, 30.0);
    assert_eq!(embed.state(), EmbedState::Cued);
    assert!(harness.player.state().is_ready);
    assert!(!harness.player.state().is_playing);
}

#[test]
fn test_embed_survives_pause() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube));
    harness.run(5);

    harness.act(|p| p.pause());
    harness.run(5);
    let embed = harness.factory.latest().unwrap();
    assert_eq!(embed.state(), EmbedState::Paused);

    harness.act(|p| p.toggle_play());
    harness.run(1);

    assert_eq!(harness.factory.created(), 1);
    assert_eq!(embed.loads().len(), 1);
    assert_eq!(embed.state(), EmbedState::Playing);
    assert!(harness.player.state().is_playing);
}

#[test]
fn test_ready_reported_after_bootstrap() {
    let factory = catalog().with_bootstrap(Duration::from_millis(300));
    let mut harness = Harness::new(factory);
    harness.play(PlayRequest::new("abc", Provider::YouTube));

    harness.run(2);
    assert!(!harness.player.state().is_ready);

    harness.run(1);
    assert!(harness.player.state().is_ready);
    assert_eq!(harness.player.state().duration, 120.0);
}

#[test]
fn test_unsupported_provider_renders_placeholder() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("4uLU6hMCjMI75M1A2tKUQC", Provider::Spotify));
    harness.run(10);

    assert_eq!(
        harness.controller.view(),
        AdapterView::Unsupported(Provider::Spotify)
    );
    assert_eq!(harness.factory.created(), 0);
    assert!(!harness.player.state().is_ready);
}

// ===== Trimmed Window =====

#[test]
fn test_first_load_starts_at_window_start() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube).with_bounds(Some(30.0), Some(90.0)));
    harness.run(1);

    let loads = harness.factory.latest().unwrap().loads();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].start_seconds, 30.0);
    assert_eq!(loads[0].end_seconds, Some(90.0));
}

#[test]
fn test_window_end_pauses_once() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube).with_bounds(Some(10.0), Some(12.0)));
    harness.player.drain_events();

    harness.run(60);

    let embed = harness.factory.latest().unwrap();
    assert!(!harness.player.state().is_playing);
    assert_eq!(embed.state(), EmbedState::Paused);
    assert!(embed.position() < 13.0);

    let pauses = harness
        .player
        .drain_events()
        .into_iter()
        .filter(|e| *e == PlayerEvent::PlayStateChanged { is_playing: false })
        .count();
    assert_eq!(pauses, 1);
}

#[test]
fn test_adapter_reports_ended_once() {
    let factory = catalog();
    let mut adapter = AudioAdapter::new(
        Provider::YouTube,
        Rc::new(factory.clone()),
        Duration::from_millis(500),
    );
    adapter.update(&AdapterProps {
        src: "abc".to_string(),
        platform: Provider::YouTube,
        is_playing: true,
        volume: 100,
        seek: None,
        start_time: Some(10.0),
        end_time: Some(12.0),
        playback_id: 1,
    });

    let mut ended = 0;
    for _ in 0..60 {
        adapter.tick(TICK);
        ended += adapter
            .drain_events()
            .iter()
            .filter(|e| **e == AdapterEvent::Ended)
            .count();
    }

    assert_eq!(ended, 1);
}

#[test]
fn test_natural_end_stops_playback() {
    let factory = SimulatedEmbedFactory::new().with_media("short", 1.0);
    let mut harness = Harness::new(factory);
    harness.play(PlayRequest::new("short", Provider::YouTube));

    harness.run(20);

    assert!(!harness.player.state().is_playing);
    assert_eq!(
        harness.factory.latest().unwrap().state(),
        EmbedState::Ended
    );
}

// ===== Errors =====

#[test]
fn test_unknown_video_forces_pause() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("missing", Provider::YouTube));

    harness.run(2);

    assert!(!harness.player.state().is_playing);
    assert_eq!(harness.player.state().src, "missing");
}

#[test]
fn test_embed_error_forces_pause() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube));
    harness.run(3);
    assert!(harness.player.state().is_playing);

    harness.factory.latest().unwrap().inject_error(150);
    harness.run(1);

    assert!(!harness.player.state().is_playing);
}

#[test]
fn test_factory_failure_forces_pause() {
    let factory = catalog();
    factory.set_unavailable(true);
    let mut harness = Harness::new(factory);

    harness.play(PlayRequest::new("abc", Provider::YouTube));

    assert!(!harness.player.state().is_playing);
    assert_eq!(harness.controller.view(), AdapterView::Placeholder);
}

// ===== Remount =====

#[test]
fn test_source_change_remounts() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube));
    harness.run(3);
    let old = harness.factory.latest().unwrap();

    harness.play(PlayRequest::new("def", Provider::YouTube));

    assert!(old.is_destroyed());
    assert_eq!(harness.factory.created(), 2);
    assert!(harness.player.has_player_instance());
}

#[test]
fn test_stale_proxy_never_invoked() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube));
    harness.run(3);
    let old = harness.factory.embed(0).unwrap();

    harness.play(PlayRequest::new("def", Provider::YouTube));
    harness.run(1);
    harness.act(|p| p.seek_to(30.0));

    let new = harness.factory.embed(1).unwrap();
    assert!(old.seeks().is_empty());
    assert_eq!(new.seeks(), vec![30.0]);
}

#[test]
fn test_repeated_seek_to_same_second_applies_twice() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube));
    harness.run(1);

    harness.act(|p| p.seek_to(60.0));
    harness.run(10);
    harness.act(|p| p.seek_to(60.0));

    let embed = harness.factory.latest().unwrap();
    assert_eq!(embed.seeks(), vec![60.0, 60.0]);
}

#[test]
fn test_volume_reaches_embed() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube));
    harness.run(1);

    harness.act(|p| p.set_volume(40));

    assert_eq!(harness.player.state().volume, 40);
    assert_eq!(harness.factory.latest().unwrap().volumes(), vec![100, 40]);
}

#[test]
fn test_dismiss_unmounts() {
    let mut harness = Harness::new(catalog());
    harness.play(PlayRequest::new("abc", Provider::YouTube));
    harness.run(3);

    harness.act(|p| p.dismiss());

    assert!(!harness.controller.is_mounted());
    assert_eq!(harness.controller.view(), AdapterView::Empty);
    assert!(!harness.player.has_player_instance());
    assert!(harness.factory.latest().unwrap().is_destroyed());
}

// ===== Restore =====

#[test]
fn test_resume_after_restore() {
    let store = MemoryStore::new();
    let position = {
        let mut harness = Harness::with_store(catalog(), store.clone());
        harness.play(PlayRequest::new("abc", Provider::YouTube));
        harness.run(30);
        harness.player.state().current_time
    };
    assert!(position > 0.0);

    let mut harness = Harness::with_store(catalog(), store);
    let restored = harness.player.state().current_time;
    assert!((restored - position).abs() < 1e-9);

    harness.act(|p| p.toggle_play());
    harness.run(1);

    let loads = harness.factory.latest().unwrap().loads();
    assert_eq!(loads[0].start_seconds, restored);
}

#[test]
fn test_new_request_after_restore_starts_at_window() {
    let store = MemoryStore::new();
    {
        let mut harness = Harness::with_store(catalog(), store.clone());
        harness.play(PlayRequest::new("abc", Provider::YouTube));
        harness.run(30);
    }

    let mut harness = Harness::with_store(catalog(), store);
    harness.play(PlayRequest::new("abc", Provider::YouTube).with_bounds(Some(5.0), None));
    harness.run(1);

    let loads = harness.factory.latest().unwrap().loads();
    assert_eq!(loads[0].start_seconds, 5.0);
}
