//! Audio sink used while no native playback backend is wired in.
//!
//! Macroquad ships without its audio feature here (the ALSA development
//! libraries are absent in CI), so cues are logged instead of played. The
//! sink still tracks looping clips so `is_playing` answers honestly.

use std::collections::HashSet;

use tracing::debug;

use carnival_core::{AudioAction, AudioClip, AudioCue};
use carnival_presentation::AudioSink;

/// Sink that logs every cue and tracks which loops would be audible.
#[derive(Debug, Default)]
pub(crate) struct LoggingAudioSink {
    looping: HashSet<AudioClip>,
}

impl AudioSink for LoggingAudioSink {
    fn handle(&mut self, cue: AudioCue) {
        debug!(?cue.clip, ?cue.action, "audio");
        match cue.action {
            AudioAction::Loop => {
                let _ = self.looping.insert(cue.clip);
            }
            AudioAction::Stop => {
                let _ = self.looping.remove(&cue.clip);
            }
            AudioAction::Play => {}
        }
    }

    fn is_playing(&self, clip: AudioClip) -> bool {
        self.looping.contains(&clip)
    }
}
