use std::sync::{Arc, Mutex};

/// Audio backend playing the boarding announcement. Decoding and output
/// live outside this crate.
pub trait AnnouncementPlayer {
    fn play(&mut self);
    fn stop(&mut self);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Playback {
    #[default]
    Stopped,
    Playing,
}

/// Player that only tracks and logs the requested playback state.
///
/// Clones share their state, so a caller can keep one to observe what the
/// UI asked for.
#[derive(Clone, Debug, Default)]
pub struct LoggedAnnouncement {
    source: String,
    playback: Arc<Mutex<Playback>>,
}

impl LoggedAnnouncement {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            ..Default::default()
        }
    }

    pub fn playback(&self) -> Playback {
        self.playback
            .lock()
            .map(|playback| *playback)
            .unwrap_or_default()
    }

    fn set(&self, playback: Playback) {
        match self.playback.lock() {
            Ok(mut current) => *current = playback,
            Err(err) => log::error!("Announcement state poisoned: {err}"),
        }
    }
}

impl AnnouncementPlayer for LoggedAnnouncement {
    fn play(&mut self) {
        log::info!("Playing announcement {}", self.source);
        self.set(Playback::Playing);
    }

    fn stop(&mut self) {
        log::info!("Stopping announcement {}", self.source);
        self.set(Playback::Stopped);
    }
}

/// The two UI entry points into audio. Fire and forget.
pub struct AnnouncementControl {
    player: Box<dyn AnnouncementPlayer>,
}

impl AnnouncementControl {
    pub fn new(player: Box<dyn AnnouncementPlayer>) -> Self {
        Self { player }
    }

    pub fn play_announcement(&mut self) {
        self.player.play();
    }

    pub fn stop_announcement(&mut self) {
        self.player.stop();
    }
}
