//! Recording fakes for the media boundary

use std::sync::{Arc, Mutex};

use super::surface::{DemuxerFactory, EventSender, RenderSurface, SoftwareDemuxer};
use crate::config::DemuxerConfig;

/// Ordered record of every call made on the fakes
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push<S: Into<String>>(&self, entry: S) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| e.as_str() == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

pub struct FakeSurface {
    log: CallLog,
    native_hls: bool,
    fail_play: bool,
}

impl FakeSurface {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            native_hls: false,
            fail_play: false,
        }
    }

    pub fn with_native_hls(mut self) -> Self {
        self.native_hls = true;
        self
    }

    pub fn refusing_play(mut self) -> Self {
        self.fail_play = true;
        self
    }
}

impl RenderSurface for FakeSurface {
    fn set_source(&mut self, url: &str) {
        self.log.push(format!("surface.set_source {url}"));
    }

    fn clear_source(&mut self) {
        self.log.push("surface.clear_source");
    }

    fn set_cross_origin_anonymous(&mut self, enabled: bool) {
        self.log.push(format!("surface.cross_origin {enabled}"));
    }

    fn set_poster(&mut self, poster: Option<&str>) {
        if let Some(poster) = poster {
            self.log.push(format!("surface.poster {poster}"));
        }
    }

    fn set_autoplay(&mut self, autoplay: bool) {
        self.log.push(format!("surface.autoplay {autoplay}"));
    }

    fn can_play_type(&self, _mime: &str) -> bool {
        self.native_hls
    }

    fn load(&mut self) {
        self.log.push("surface.load");
    }

    fn play(&mut self) -> Result<(), String> {
        self.log.push("surface.play");
        if self.fail_play {
            Err("NotAllowedError".to_string())
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.log.push("surface.pause");
    }

    fn seek(&mut self, position: f64) {
        self.log.push(format!("surface.seek {position}"));
    }

    fn set_volume(&mut self, volume: f64) {
        self.log.push(format!("surface.volume {volume}"));
    }

    fn set_muted(&mut self, muted: bool) {
        self.log.push(format!("surface.muted {muted}"));
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), String> {
        self.log.push(format!("surface.fullscreen {fullscreen}"));
        Ok(())
    }

    fn release(&mut self) {
        self.log.push("surface.release");
    }
}

/// Demuxer whose instances are numbered in creation order
pub struct FakeDemuxer {
    log: CallLog,
    id: usize,
}

impl SoftwareDemuxer for FakeDemuxer {
    fn load_source(&mut self, url: &str) {
        self.log.push(format!("demuxer{}.load_source {url}", self.id));
    }

    fn attach(&mut self, _surface: &mut dyn RenderSurface) {
        self.log.push(format!("demuxer{}.attach", self.id));
    }

    fn start_load(&mut self) {
        self.log.push(format!("demuxer{}.start_load", self.id));
    }

    fn recover_media_error(&mut self) {
        self.log.push(format!("demuxer{}.recover_media_error", self.id));
    }

    fn destroy(&mut self) {
        self.log.push(format!("demuxer{}.destroy", self.id));
    }
}

pub struct FakeDemuxerFactory {
    log: CallLog,
    supported: bool,
    created: Mutex<usize>,
    last_config: Mutex<Option<DemuxerConfig>>,
}

impl FakeDemuxerFactory {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            supported: true,
            created: Mutex::new(0),
            last_config: Mutex::new(None),
        }
    }

    pub fn unsupported(log: &CallLog) -> Self {
        Self {
            supported: false,
            ..Self::new(log)
        }
    }

    pub fn created(&self) -> usize {
        *self.created.lock().unwrap()
    }

    pub fn last_config(&self) -> Option<DemuxerConfig> {
        self.last_config.lock().unwrap().clone()
    }
}

impl DemuxerFactory for FakeDemuxerFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &DemuxerConfig, _events: EventSender) -> Box<dyn SoftwareDemuxer> {
        let mut created = self.created.lock().unwrap();
        *created += 1;
        *self.last_config.lock().unwrap() = Some(config.clone());
        self.log.push(format!("demuxer{}.create", *created));
        Box::new(FakeDemuxer {
            log: self.log.clone(),
            id: *created,
        })
    }
}
