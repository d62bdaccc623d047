//! Bookkeeping for one utterance's playback.
//!
//! A [`PlaybackTicket`] is issued when playback starts and travels with the
//! playback thread. Finishing it reports completion only while it is still
//! the newest ticket, and at most once. Dropping it removes the synthesized
//! audio file.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use super::{CompletionSender, UtteranceId};

#[derive(Debug, Default, Clone)]
pub struct PlaybackGenerations {
    current: Arc<AtomicU64>,
}

impl PlaybackGenerations {
    /// Issue a ticket for `id`; every earlier ticket becomes stale.
    pub fn begin(
        &self,
        id: UtteranceId,
        audio_path: PathBuf,
        completions: CompletionSender,
    ) -> PlaybackTicket {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        PlaybackTicket {
            id,
            generation,
            current: Arc::clone(&self.current),
            audio_path,
            completions,
        }
    }

    /// Make every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct PlaybackTicket {
    id: UtteranceId,
    generation: u64,
    current: Arc<AtomicU64>,
    audio_path: PathBuf,
    completions: CompletionSender,
}

impl PlaybackTicket {
    pub fn id(&self) -> UtteranceId {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Playback drained. Returns whether a completion was sent.
    pub fn finish(self) -> bool {
        if !self.is_current() {
            debug!("{} ended after being superseded", self.id);
            return false;
        }
        debug!("{} finished", self.id);
        self.completions.send(self.id).is_ok()
    }
}

impl Drop for PlaybackTicket {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.audio_path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {err}", self.audio_path.display());
            }
        }
    }
}
