//! Audio cue on finish transitions, gated by user activation

use std::io::Write;

use tracing::{debug, info};

use crate::error::AudioError;

/// Something that can play a short attention cue
pub trait AudioOutput: Send {
    fn play_cue(&mut self) -> Result<(), AudioError>;
}

/// Builds the audio output once a user gesture has been seen
pub trait AudioFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn AudioOutput>, AudioError>;
}

/// Rings the terminal bell on stderr
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AudioOutput for TerminalBell {
    fn play_cue(&mut self) -> Result<(), AudioError> {
        let mut stderr = std::io::stderr();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TerminalBellFactory;

impl AudioFactory for TerminalBellFactory {
    fn create(&self) -> Result<Box<dyn AudioOutput>, AudioError> {
        Ok(Box::new(TerminalBell))
    }
}

/// Enable/disable toggle plus a cue trigger.
///
/// Nothing is played until the output has been activated, and every
/// failure from the output is swallowed.
pub struct NotificationSink {
    enabled: bool,
    factory: Box<dyn AudioFactory>,
    output: Option<Box<dyn AudioOutput>>,
}

impl NotificationSink {
    pub fn new(factory: Box<dyn AudioFactory>, enabled: bool) -> Self {
        Self {
            enabled,
            factory,
            output: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_activated(&self) -> bool {
        self.output.is_some()
    }

    /// Record a user gesture, constructing the output on the first one
    pub fn activate(&mut self) {
        if self.output.is_some() {
            return;
        }
        match self.factory.create() {
            Ok(output) => {
                info!("Audio output activated");
                self.output = Some(output);
            }
            Err(e) => debug!("Audio output could not be created: {}", e),
        }
    }

    /// Flip the enabled state, playing a confirmation cue when turned back on
    pub fn toggle(&mut self) -> bool {
        self.activate();
        self.enabled = !self.enabled;
        info!("Audio {}", if self.enabled { "enabled" } else { "disabled" });
        if self.enabled {
            self.notify();
        }
        self.enabled
    }

    /// Play the cue if activated and enabled
    pub fn notify(&mut self) {
        if !self.enabled {
            return;
        }
        if let Some(output) = self.output.as_mut() {
            if let Err(e) = output.play_cue() {
                debug!("Audio cue failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for NotificationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSink")
            .field("enabled", &self.enabled)
            .field("activated", &self.is_activated())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    /// Counts cues; can be told to fail construction or playback
    #[derive(Debug, Clone, Default)]
    pub struct CountingAudio {
        pub cues: Arc<AtomicUsize>,
        pub created: Arc<AtomicUsize>,
        pub fail_create: Arc<AtomicBool>,
        pub fail_play: Arc<AtomicBool>,
    }

    impl CountingAudio {
        pub fn cues(&self) -> usize {
            self.cues.load(Ordering::SeqCst)
        }

        pub fn sink(&self, enabled: bool) -> NotificationSink {
            NotificationSink::new(Box::new(self.clone()), enabled)
        }
    }

    struct CountingOutput(CountingAudio);

    impl AudioOutput for CountingOutput {
        fn play_cue(&mut self) -> Result<(), AudioError> {
            if self.0.fail_play.load(Ordering::SeqCst) {
                return Err(AudioError::Unavailable("device gone".to_string()));
            }
            self.0.cues.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl AudioFactory for CountingAudio {
        fn create(&self) -> Result<Box<dyn AudioOutput>, AudioError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(AudioError::Unavailable("no device".to_string()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingOutput(self.clone())))
        }
    }
}
