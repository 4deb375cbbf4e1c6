//! Playback sessions driven through the public event loop

use std::sync::{Arc, Mutex};
use std::time::Duration;

use iptv_catalog::config::{DemuxerConfig, PlaybackConfig};
use iptv_catalog::errors::RecoveryAction;
use iptv_catalog::playback::{
    DeliveryStrategy, DemuxerError, DemuxerErrorKind, DemuxerFactory, EventSender,
    PlaybackEngine, PlaybackState, PlayerEvent, PlayerOptions, RenderSurface, SoftwareDemuxer,
    SurfaceError,
};

type Journal = Arc<Mutex<Vec<String>>>;

fn record(journal: &Journal, entry: impl Into<String>) {
    journal.lock().unwrap().push(entry.into());
}

struct VideoElement {
    journal: Journal,
    native_hls: bool,
}

impl RenderSurface for VideoElement {
    fn set_source(&mut self, url: &str) {
        record(&self.journal, format!("src={url}"));
    }
    fn clear_source(&mut self) {
        record(&self.journal, "src cleared");
    }
    fn set_cross_origin_anonymous(&mut self, _enabled: bool) {}
    fn set_poster(&mut self, _poster: Option<&str>) {}
    fn set_autoplay(&mut self, _autoplay: bool) {}
    fn can_play_type(&self, mime: &str) -> bool {
        self.native_hls && mime == "application/vnd.apple.mpegurl"
    }
    fn load(&mut self) {
        record(&self.journal, "load");
    }
    fn play(&mut self) -> Result<(), String> {
        record(&self.journal, "play");
        Ok(())
    }
    fn pause(&mut self) {
        record(&self.journal, "pause");
    }
    fn seek(&mut self, _position: f64) {}
    fn set_volume(&mut self, _volume: f64) {}
    fn set_muted(&mut self, _muted: bool) {}
    fn set_fullscreen(&mut self, _fullscreen: bool) -> Result<(), String> {
        Ok(())
    }
    fn release(&mut self) {
        record(&self.journal, "surface released");
    }
}

/// Demuxer that announces the manifest as soon as it is attached
struct EagerDemuxer {
    journal: Journal,
    events: EventSender,
}

impl SoftwareDemuxer for EagerDemuxer {
    fn load_source(&mut self, url: &str) {
        record(&self.journal, format!("demuxer load {url}"));
    }
    fn attach(&mut self, _surface: &mut dyn RenderSurface) {
        record(&self.journal, "demuxer attached");
        self.events.emit(PlayerEvent::ManifestParsed);
    }
    fn start_load(&mut self) {
        record(&self.journal, "demuxer start_load");
    }
    fn recover_media_error(&mut self) {
        record(&self.journal, "demuxer recover");
    }
    fn destroy(&mut self) {
        record(&self.journal, "demuxer destroyed");
    }
}

struct EagerFactory {
    journal: Journal,
}

impl DemuxerFactory for EagerFactory {
    fn is_supported(&self) -> bool {
        true
    }

    fn create(&self, config: &DemuxerConfig, events: EventSender) -> Box<dyn SoftwareDemuxer> {
        assert!(!config.enable_worker);
        assert!(config.low_latency_mode);
        Box::new(EagerDemuxer {
            journal: self.journal.clone(),
            events,
        })
    }
}

const HLS_URL: &str = "https://live.example.net/ch/playlist.m3u8";

#[tokio::test]
async fn software_demux_session_autoplays_after_manifest() {
    let journal = Journal::default();
    let engine = PlaybackEngine::new(
        PlaybackConfig::default(),
        Arc::new(EagerFactory {
            journal: journal.clone(),
        }),
    );
    let surface = VideoElement {
        journal: journal.clone(),
        native_hls: true,
    };

    let (mut session, mut events) =
        engine.open(surface, PlayerOptions::new(HLS_URL).auto_play(true));
    assert_eq!(session.strategy(), Some(DeliveryStrategy::SoftwareDemux));

    let event = events.next().await.unwrap();
    assert_eq!(event, PlayerEvent::ManifestParsed);
    session.handle_event(event);
    session.handle_event(PlayerEvent::CanPlay);
    session.handle_event(PlayerEvent::Playing);
    assert_eq!(session.state(), PlaybackState::Playing);

    session.handle_event(PlayerEvent::DemuxerError(DemuxerError::fatal(
        DemuxerErrorKind::Network,
        "fragLoadError",
    )));
    assert_eq!(session.state(), PlaybackState::Playing);

    drop(session);
    let entries = journal.lock().unwrap().clone();
    assert_eq!(
        entries,
        vec![
            format!("demuxer load {HLS_URL}"),
            "demuxer attached".to_string(),
            "play".to_string(),
            "demuxer start_load".to_string(),
            "demuxer destroyed".to_string(),
            "surface released".to_string(),
        ]
    );
}

#[tokio::test]
async fn native_surface_plays_manifest_directly() {
    let journal = Journal::default();
    let engine = PlaybackEngine::without_software_demuxer(PlaybackConfig::default());
    let surface = VideoElement {
        journal: journal.clone(),
        native_hls: true,
    };

    let (session, _events) = engine.open(surface, PlayerOptions::new(HLS_URL));
    assert_eq!(session.strategy(), Some(DeliveryStrategy::Native));
    assert_eq!(
        journal.lock().unwrap().first().map(String::as_str),
        Some(format!("src={HLS_URL}").as_str())
    );
}

#[tokio::test(start_paused = true)]
async fn incompatible_stream_retries_once_then_fails() {
    let journal = Journal::default();
    let engine = PlaybackEngine::without_software_demuxer(PlaybackConfig::default());
    let surface = VideoElement {
        journal: journal.clone(),
        native_hls: true,
    };
    let (mut session, mut events) = engine.open(surface, PlayerOptions::new(HLS_URL));

    let incompatible = PlayerEvent::SurfaceError(SurfaceError::new(
        Some(4),
        Some("DEMUXER_ERROR_DETECTED_HLS"),
    ));
    session.handle_event(incompatible.clone());
    assert!(session.user_facing_error().is_none());

    let started = tokio::time::Instant::now();
    let reload = events.next().await.unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(2));
    session.handle_event(reload);
    assert_eq!(
        journal
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == "load")
            .count(),
        2
    );

    session.handle_event(incompatible);
    let error = session.user_facing_error().unwrap();
    assert_eq!(error.recovery, RecoveryAction::RetryPlayback);
    assert_eq!(session.state(), PlaybackState::Errored);

    session.reload().unwrap();
    assert_eq!(session.state(), PlaybackState::Loading);
}
