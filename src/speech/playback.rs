//! Speech engine that synthesizes with Piper and plays through `rodio`.
//!
//! Every utterance gets its own playback thread which owns the output stream
//! until the sink drains. The thread carries a [`PlaybackTicket`], so it
//! reports completion only if no cancel (or newer utterance) came in
//! between, and the synthesized WAV is deleted once the thread exits.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;

use log::{debug, info, warn};
use rodio::{Decoder, OutputStream, Sink};

use super::ticket::{PlaybackGenerations, PlaybackTicket};
use super::{
    CompletionSender, Lexicon, SpeechEngine, SpeechError, SynthesisRequest, Synthesizer,
    Utterance, VoiceInfo,
};

pub struct PiperSpeech<S: Synthesizer> {
    synthesizer: S,
    voice: VoiceInfo,
    lexicon: Lexicon,
    output_dir: PathBuf,
    completions: CompletionSender,
    generations: PlaybackGenerations,
    sink: Option<Arc<Sink>>,
}

impl<S: Synthesizer> PiperSpeech<S> {
    pub fn new(
        synthesizer: S,
        voice: VoiceInfo,
        lexicon: Lexicon,
        output_dir: PathBuf,
        completions: CompletionSender,
    ) -> Self {
        info!("Speech engine using voice {}", voice.label);
        Self {
            synthesizer,
            voice,
            lexicon,
            output_dir,
            completions,
            generations: PlaybackGenerations::default(),
            sink: None,
        }
    }

    fn start_playback(&mut self, path: PathBuf, utterance: &Utterance) -> Result<(), SpeechError> {
        let ticket = self
            .generations
            .begin(utterance.id, path.clone(), self.completions.clone());
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::Builder::new()
            .name(format!("speech-{}", utterance.id))
            .spawn(move || play_to_end(&path, ticket, ready_tx))
            .map_err(|err| SpeechError::Playback(err.to_string()))?;

        let sink = ready_rx
            .recv()
            .map_err(|err| SpeechError::Playback(err.to_string()))??;
        self.sink = Some(sink);
        Ok(())
    }
}

type Ready = mpsc::Sender<Result<Arc<Sink>, SpeechError>>;

fn play_to_end(path: &Path, ticket: PlaybackTicket, ready: Ready) {
    let (stream, sink) = match open_sink(path) {
        Ok(opened) => opened,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };
    let sink = Arc::new(sink);
    if ready.send(Ok(Arc::clone(&sink))).is_err() {
        return;
    }
    sink.sleep_until_end();
    drop(stream);
    ticket.finish();
}

fn open_sink(path: &Path) -> Result<(OutputStream, Sink), SpeechError> {
    let file = File::open(path).map_err(|err| SpeechError::Playback(err.to_string()))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|err| SpeechError::Playback(format!("{}: {err}", path.display())))?;
    let (stream, handle) = OutputStream::try_default()
        .map_err(|err| SpeechError::Playback(format!("no output device: {err}")))?;
    let sink = Sink::try_new(&handle).map_err(|err| SpeechError::Playback(err.to_string()))?;
    sink.append(decoder);
    Ok((stream, sink))
}

impl<S: Synthesizer> SpeechEngine for PiperSpeech<S> {
    fn speak(&mut self, utterance: Utterance) -> Result<(), SpeechError> {
        self.cancel();
        let request = SynthesisRequest {
            text: self.lexicon.apply(&utterance.text),
            model_path: self.voice.model_path.clone(),
            output_path: self.output_dir.join(format!("{}.wav", utterance.id)),
        };
        let output = self.synthesizer.synthesize(&request)?;
        debug!(
            "Synthesized {} ({}) in {} ms",
            utterance.id, utterance.locale, output.duration_ms
        );
        if let Some(stderr) = &output.stderr {
            debug!("Piper said: {stderr}");
        }
        self.start_playback(output.output_path, &utterance)
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn cancel(&mut self) {
        self.generations.invalidate();
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_paused(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| sink.is_paused() && !sink.empty())
    }
}

impl<S: Synthesizer> Drop for PiperSpeech<S> {
    fn drop(&mut self) {
        if self.sink.as_ref().is_some_and(|sink| !sink.empty()) {
            warn!("Speech engine dropped with audio still queued");
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{completion_channel, SynthesisFailure, SynthesisOutput, UtteranceId};
    use rodio::buffer::SamplesBuffer;

    struct NoSynthesis;

    impl Synthesizer for NoSynthesis {
        fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutput, SynthesisFailure> {
            Err(SynthesisFailure::VoiceNotFound(request.model_path.clone()))
        }
    }

    fn engine() -> (PiperSpeech<NoSynthesis>, crate::speech::CompletionReceiver) {
        let (tx, rx) = completion_channel();
        let voice = VoiceInfo {
            id: "amy".into(),
            label: "amy".into(),
            language: Some("en_US".into()),
            model_path: PathBuf::from("missing/amy.onnx"),
        };
        let engine = PiperSpeech::new(NoSynthesis, voice, Lexicon::builtin(), PathBuf::from("out"), tx);
        (engine, rx)
    }

    // an idle sink needs no output device
    fn queued_sink() -> (Arc<Sink>, rodio::queue::SourcesQueueOutput<f32>) {
        let (sink, output) = Sink::new_idle();
        sink.append(SamplesBuffer::new(1, 16_000, vec![0.0f32; 1_600]));
        (Arc::new(sink), output)
    }

    #[test]
    fn paused_only_while_audio_is_queued() {
        let (mut engine, _rx) = engine();
        assert!(!engine.is_paused());

        let (sink, _output) = queued_sink();
        engine.sink = Some(Arc::clone(&sink));
        assert!(!engine.is_paused());
        engine.pause();
        assert!(engine.is_paused());
        engine.resume();
        assert!(!engine.is_paused());

        let (empty, _idle) = Sink::new_idle();
        empty.pause();
        engine.sink = Some(Arc::new(empty));
        assert!(!engine.is_paused());
    }

    #[test]
    fn cancel_stops_the_sink_and_clears_pause() {
        let (mut engine, _rx) = engine();
        let (sink, _output) = queued_sink();
        engine.sink = Some(Arc::clone(&sink));
        engine.pause();
        engine.cancel();
        assert!(!engine.is_paused());
        assert!(engine.sink.is_none());
    }

    #[test]
    fn cancel_makes_the_running_ticket_stale() {
        let (mut engine, rx) = engine();
        let ticket = engine.generations.begin(
            UtteranceId(1),
            PathBuf::from("missing.wav"),
            engine.completions.clone(),
        );
        engine.cancel();
        assert!(!ticket.finish());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn synthesis_failure_is_reported_without_playback() {
        let (mut engine, rx) = engine();
        let result = engine.speak(Utterance {
            id: UtteranceId(1),
            text: "Boil water".into(),
            locale: "en-US".into(),
        });
        assert!(matches!(
            result,
            Err(SpeechError::Synthesis(SynthesisFailure::VoiceNotFound(_)))
        ));
        assert!(engine.sink.is_none());
        assert!(rx.try_recv().is_err());
    }
}
