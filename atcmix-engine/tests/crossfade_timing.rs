//! Crossfade timing integration tests
//!
//! Runs the engine under tokio's paused virtual clock so gain ramps and the
//! mid-fade stream swap can be sampled at exact audio-clock instants.

use std::sync::Arc;
use std::time::Duration;

use atcmix_engine::mixer::{AudioHost, ChannelId, MediaElement, MixerEngine, SimHost};
use atcmix_engine::Error;

const EPSILON: f32 = 1e-4;

fn engine_with_host() -> (Arc<SimHost>, MixerEngine) {
    let host = Arc::new(SimHost::new());
    let engine = MixerEngine::new(host.clone() as Arc<dyn AudioHost>);
    (host, engine)
}

/// Let already-woken tasks run without advancing the clock
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn switch_ramps_down_swaps_and_ramps_back() {
    let (host, engine) = engine_with_host();
    engine.play_atc("https://x/url1").await.unwrap();

    let target = engine.get_atc_volume().await;
    let handle = engine.switch_atc_station("https://x/url2", Some(1.0)).await;
    assert!(!handle.is_noop());
    settle().await;

    // Fade-out is scheduled immediately, anchored at call time
    let start_level = engine.channel_level(ChannelId::Atc).await.unwrap();
    assert!((start_level - target).abs() < EPSILON);

    // t = d/2: gain has reached zero, swap fires
    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;

    let mid_level = engine.channel_level(ChannelId::Atc).await.unwrap();
    assert!(mid_level.abs() < EPSILON);

    let atc = host.element(ChannelId::Atc).unwrap();
    assert_eq!(atc.source().as_deref(), Some("https://x/url2"));
    assert!(!atc.is_paused());

    // t = d: gain is back at the captured setpoint
    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;

    let end_level = engine.channel_level(ChannelId::Atc).await.unwrap();
    assert!((end_level - target).abs() < EPSILON);

    handle.finished().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn switch_restores_setpoint_not_instantaneous_value() {
    let (_host, engine) = engine_with_host();
    engine.play_music("https://x/a").await.unwrap();
    engine.set_music_volume(0.8).await;

    // First switch starts fading; a quarter in, issue a second switch
    let first = engine.switch_music_source("https://x/b", Some(1.0)).await;
    tokio::time::advance(Duration::from_millis(250)).await;
    settle().await;

    let second = engine.switch_music_source("https://x/c", Some(1.0)).await;

    // The second fade-out anchors at the audible mid-fade level, but the
    // restore target is still the 0.8 setpoint.
    second.finished().await.unwrap();
    assert!((engine.get_music_volume().await - 0.8).abs() < EPSILON);
    let level = engine.channel_level(ChannelId::Music).await.unwrap();
    assert!((level - 0.8).abs() < EPSILON);

    first.abort();
}

#[tokio::test(start_paused = true)]
async fn switch_uses_default_fade_duration() {
    let (host, engine) = engine_with_host();
    engine.play_atc("https://x/url1").await.unwrap();

    let handle = engine.switch_atc_station("https://x/url2", None).await;
    settle().await;

    // Default fade is 0.5 s, so the swap lands at 0.25 s
    tokio::time::advance(Duration::from_millis(250)).await;
    settle().await;

    let atc = host.element(ChannelId::Atc).unwrap();
    assert_eq!(atc.source().as_deref(), Some("https://x/url2"));

    handle.finished().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn mid_fade_play_failure_surfaces_through_handle() {
    let (host, engine) = engine_with_host();
    engine.play_atc("https://x/url1").await.unwrap();
    let target = engine.get_atc_volume().await;

    host.reject_url("https://x/url2");
    let handle = engine.switch_atc_station("https://x/url2", Some(1.0)).await;

    let err = handle.finished().await.unwrap_err();
    assert!(matches!(err, Error::Playback(_)));

    // The fade-in was still scheduled: the timeline converged back to the
    // setpoint even though the channel stayed unplayed.
    let level = engine.channel_level(ChannelId::Atc).await.unwrap();
    assert!((level - target).abs() < EPSILON);

    let atc = host.element(ChannelId::Atc).unwrap();
    assert!(atc.is_paused());
    assert_eq!(atc.source().as_deref(), Some("https://x/url2"));
}

#[tokio::test(start_paused = true)]
async fn aborted_switch_never_swaps_the_stream() {
    let (host, engine) = engine_with_host();
    engine.play_music("https://x/a").await.unwrap();

    let handle = engine.switch_music_source("https://x/b", Some(1.0)).await;

    tokio::time::advance(Duration::from_millis(250)).await;
    settle().await;
    handle.abort();

    let err = handle.finished().await.unwrap_err();
    assert!(matches!(err, Error::Playback(_)));

    let music = host.element(ChannelId::Music).unwrap();
    assert_eq!(music.source().as_deref(), Some("https://x/a"));
}

#[tokio::test(start_paused = true)]
async fn switch_before_init_is_noop() {
    let (_host, engine) = engine_with_host();

    let handle = engine.switch_atc_station("https://x/url2", Some(1.0)).await;
    assert!(handle.is_noop());
    handle.finished().await.unwrap();
    assert!(!engine.is_initialized().await);
}
