//! Effect executor around the pure [`StateMachine`].
//!
//! The controller owns every side-effecting resource of the experience:
//! the audio handle, the confetti sink, the typing task and the rain
//! layout. It is driven from a single loop, one message at a time; the
//! typing task only reports progress through a channel.

use std::sync::Arc;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::audio::{AudioCue, AudioHandle};
use crate::confetti::{BurstKind, ConfettiBurst, ConfettiSink, LazyConfetti};
use crate::config::ExperienceConfig;
use crate::layout::{RainItem, RainLayoutBuilder};
use crate::observability::{Event, EventEmitter, StopReason};
use crate::typewriter::{RunId, TypewriterHandle, TypewriterMessage, TypewriterRunner};

use super::machine::{Effect, GateSource, Input, Phase, StateMachine};
use super::view::{ExperienceView, PhaseView};

/// Drives one experience from boot to acceptance.
pub struct ExperienceController {
    machine: StateMachine,
    content: Content,

    audio: AudioHandle,
    confetti: LazyConfetti,
    confetti_enabled: bool,
    events: Arc<EventEmitter>,
    rng: StdRng,

    typewriter: TypewriterRunner,
    typing: Option<TypewriterHandle>,
    run: RunId,
    typing_tx: mpsc::UnboundedSender<TypewriterMessage>,
    typed: String,

    layout: RainLayoutBuilder,
    photos: Vec<String>,
    rain: Vec<RainItem>,

    rejection: Option<String>,
    tone_played: bool,
    confetti_sent: bool,
    stopped: bool,
}

/// Text content copied out of the configuration.
#[derive(Debug, Clone)]
struct Content {
    title: String,
    recipient: String,
    prompt_lines: Vec<String>,
    proposal_lines: Vec<String>,
    rejection_lines: Vec<String>,
    colors: Vec<String>,
    photo_dir: String,
}

impl ExperienceController {
    /// Creates a controller in Boot with the gate closed.
    ///
    /// Returns the receiving end of the typing channel; the driver loop
    /// feeds its messages back through
    /// [`handle_typewriter`](Self::handle_typewriter).
    #[must_use]
    pub fn new(
        config: &ExperienceConfig,
        audio: AudioHandle,
        events: Arc<EventEmitter>,
    ) -> (Self, mpsc::UnboundedReceiver<TypewriterMessage>) {
        let (typing_tx, typing_rx) = mpsc::unbounded_channel();
        let controller = Self {
            machine: StateMachine::new(),
            content: Content {
                title: config.title.clone(),
                recipient: config.recipient.clone(),
                prompt_lines: config.prompt_lines.clone(),
                proposal_lines: config.proposal_lines.clone(),
                rejection_lines: config.rejection_lines.clone(),
                colors: config.confetti.colors.clone(),
                photo_dir: config.photos.dir.display().to_string(),
            },
            audio,
            confetti: LazyConfetti::unloaded(),
            confetti_enabled: config.confetti.enabled,
            events,
            rng: StdRng::from_os_rng(),
            typewriter: TypewriterRunner::new(config.boot_script.as_str(), config.typing.into()),
            typing: None,
            run: 0,
            typing_tx,
            typed: String::new(),
            layout: config.layout.builder(),
            photos: Vec::new(),
            rain: Vec::new(),
            rejection: None,
            tone_played: false,
            confetti_sent: false,
            stopped: false,
        };
        (controller, typing_rx)
    }

    /// Replaces the RNG used to pick rejection messages.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Installs the confetti sink. Bursts before this are dropped.
    pub fn load_confetti(&mut self, sink: Box<dyn ConfettiSink>) {
        self.confetti.load(sink);
    }

    /// Announces the session and opens the boot gate right away if audio
    /// is already running.
    pub fn start(&mut self) {
        self.events.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            photos: self.photos.len(),
            items: self.rain.len(),
        });
        info!(photos = self.photos.len(), items = self.rain.len(), "experience started");
        if self.audio.is_running() {
            self.handle(Input::BootGate(GateSource::AudioRunning));
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Id of the current (or most recent) typing run.
    #[must_use]
    pub const fn current_run(&self) -> RunId {
        self.run
    }

    /// Text typed so far.
    #[must_use]
    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Rain sprites for the current photo list.
    #[must_use]
    pub fn rain(&self) -> &[RainItem] {
        &self.rain
    }

    /// Current rejection message.
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// Sets the photo list, regenerating the layout only if it changed.
    /// Returns whether it changed.
    pub fn set_photos(&mut self, photos: Vec<String>) -> bool {
        if photos == self.photos {
            return false;
        }
        self.rain = self.layout.build(&photos);
        debug!(photos = photos.len(), items = self.rain.len(), "rain layout regenerated");
        self.photos = photos;
        true
    }

    /// Feeds one input through the machine and executes the resulting
    /// effects in order.
    pub fn handle(&mut self, input: Input) {
        if self.stopped {
            return;
        }
        if input == Input::BootGate(GateSource::Interaction) {
            self.audio.resume();
        }
        for effect in self.machine.apply(input) {
            self.execute(effect);
        }
    }

    /// Applies progress from a typing task. Messages from any run other
    /// than the active one are discarded.
    pub fn handle_typewriter(&mut self, message: TypewriterMessage) {
        let active = self.typing.as_ref().map(TypewriterHandle::run);
        if active != Some(message.run()) || self.phase() != Phase::Boot {
            trace!(run = message.run(), ?active, "stale typewriter message dropped");
            return;
        }
        match message {
            TypewriterMessage::Tick { tick, .. } => {
                self.typed = tick.text;
                if tick.click {
                    self.play(AudioCue::Click);
                }
            }
            TypewriterMessage::Settled { .. } => self.handle(Input::TypingSettled),
        }
    }

    /// Cancels any typing run, clears the buffer and starts a fresh run.
    /// Only meaningful in Boot once the gate is open.
    pub fn restart_typing(&mut self) {
        if self.phase() != Phase::Boot || !self.machine.boot_ready() || self.stopped {
            return;
        }
        self.stop_typing();
        self.run += 1;
        self.typed.clear();
        debug!(run_id = self.run, "typing started");
        self.typing = Some(self.typewriter.spawn(self.run, self.typing_tx.clone()));
    }

    /// Snapshot for the renderer.
    #[must_use]
    pub fn view(&self) -> ExperienceView<'_> {
        let body = match self.phase() {
            Phase::Boot => PhaseView::Boot {
                typed: &self.typed,
                waiting: !self.machine.boot_ready(),
            },
            Phase::Prompt => PhaseView::Prompt {
                lines: &self.content.prompt_lines,
            },
            Phase::Memories => PhaseView::Memories {
                items: &self.rain,
                photo_dir: &self.content.photo_dir,
            },
            Phase::Ask => PhaseView::Ask {
                lines: &self.content.proposal_lines,
                rejection: self.rejection.as_deref(),
            },
            Phase::Accepted => PhaseView::Accepted {
                recipient: &self.content.recipient,
                tone_played: self.tone_played,
                confetti_sent: self.confetti_sent,
            },
        };
        ExperienceView {
            title: &self.content.title,
            audio_running: self.audio.is_running(),
            body,
        }
    }

    /// Ends the session: stops typing, releases audio, records why.
    /// Later calls do nothing.
    pub fn shutdown(&mut self, reason: StopReason) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.stop_typing();
        self.audio.release();
        self.events.emit(Event::SessionStopped {
            timestamp: Utc::now(),
            reason,
            phase: self.phase(),
        });
        info!(%reason, phase = %self.phase(), "experience stopped");
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartTyping => self.restart_typing(),
            Effect::StopTyping => self.stop_typing(),
            Effect::PlayCue(cue) => {
                let sounded = self.play(cue);
                if cue == AudioCue::Success {
                    self.tone_played = sounded;
                }
            }
            Effect::FireConfetti(kind) => self.fire_confetti(kind),
            Effect::ShowRejection => {
                self.rejection = self.content.rejection_lines.choose(&mut self.rng).cloned();
                if let Some(message) = &self.rejection {
                    self.events.emit(Event::RejectionShown {
                        timestamp: Utc::now(),
                        message: message.clone(),
                    });
                }
            }
            Effect::ClearRejection => self.rejection = None,
            Effect::PhaseEntered(phase) => {
                let from = phase.previous();
                info!(%from, to = %phase, "phase entered");
                self.events.emit(Event::PhaseEntered {
                    timestamp: Utc::now(),
                    from,
                    phase,
                });
            }
        }
    }

    /// Emits a cue; returns whether an audio context was running for it.
    fn play(&mut self, cue: AudioCue) -> bool {
        if !self.audio.is_running() {
            return false;
        }
        self.audio.emit(cue);
        self.events.emit(Event::CueEmitted {
            timestamp: Utc::now(),
            cue,
        });
        true
    }

    fn fire_confetti(&mut self, kind: BurstKind) {
        if !self.confetti_enabled {
            return;
        }
        let burst = ConfettiBurst::for_kind(kind, &self.content.colors);
        self.confetti.fire(&burst);
        self.confetti_sent = self.confetti.is_loaded();
        self.events.emit(Event::ConfettiFired {
            timestamp: Utc::now(),
            burst: kind,
            particle_count: burst.particle_count,
        });
    }

    fn stop_typing(&mut self) {
        if let Some(handle) = self.typing.take() {
            handle.cancel();
        }
    }
}

impl Drop for ExperienceController {
    fn drop(&mut self) {
        self.stop_typing();
        self.audio.release();
    }
}

impl std::fmt::Debug for ExperienceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperienceController")
            .field("phase", &self.phase())
            .field("run", &self.run)
            .field("photos", &self.photos.len())
            .field("audio", &self.audio)
            .field("confetti", &self.confetti)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::audio::{AudioBackend, AudioContext, ToneSequence};
    use crate::confetti::ChannelConfetti;
    use crate::observability::events::tests::TestWriter;
    use crate::phase::AcceptChoice;

    #[derive(Default)]
    struct Log {
        cues: Vec<AudioCue>,
        closes: usize,
    }

    struct Recording(Arc<Mutex<Log>>);

    impl AudioBackend for Recording {
        fn play(&mut self, cue: AudioCue, _tones: &ToneSequence) -> std::io::Result<()> {
            self.0.lock().unwrap().cues.push(cue);
            Ok(())
        }

        fn close(&mut self) -> std::io::Result<()> {
            self.0.lock().unwrap().closes += 1;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn config(script: &str) -> ExperienceConfig {
        ExperienceConfig {
            boot_script: script.to_string(),
            ..ExperienceConfig::default()
        }
    }

    struct Harness {
        controller: ExperienceController,
        typing_rx: mpsc::UnboundedReceiver<TypewriterMessage>,
        audio: Arc<Mutex<Log>>,
        events: TestWriter,
    }

    fn harness(script: &str, autoplay: bool) -> Harness {
        let audio = Arc::new(Mutex::new(Log::default()));
        let backend = Recording(Arc::clone(&audio));
        let handle = AudioHandle::mount(|| Some(AudioContext::new(Box::new(backend), autoplay)));
        let events = TestWriter::default();
        let emitter = Arc::new(EventEmitter::new(Box::new(events.clone())));
        let (controller, typing_rx) = ExperienceController::new(&config(script), handle, emitter);
        Harness {
            controller: controller.with_rng(StdRng::seed_from_u64(7)),
            typing_rx,
            audio,
            events,
        }
    }

    impl Harness {
        /// Feeds typing messages until the phase leaves Boot.
        async fn finish_typing(&mut self) {
            while self.controller.phase() == Phase::Boot {
                let message = self.typing_rx.recv().await.unwrap();
                self.controller.handle_typewriter(message);
            }
        }

        fn cues(&self) -> Vec<AudioCue> {
            self.audio.lock().unwrap().cues.clone()
        }

        fn walk_to_ask(&mut self) {
            self.controller.handle(Input::ViewMemories);
            self.controller.handle(Input::Continue);
            assert_eq!(self.controller.phase(), Phase::Ask);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_boot_waits_for_gate() {
        let mut h = harness("hi", false);
        h.controller.start();
        assert!(matches!(h.controller.view().body, PhaseView::Boot { waiting: true, .. }));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(h.typing_rx.try_recv().is_err());
        assert_eq!(h.controller.phase(), Phase::Boot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interaction_resumes_audio_and_types() {
        let mut h = harness("AB\nC", false);
        h.controller.start();
        h.controller.handle(Input::BootGate(GateSource::Interaction));
        assert!(h.controller.view().audio_running);

        h.finish_typing().await;
        assert_eq!(h.controller.phase(), Phase::Prompt);
        assert_eq!(h.controller.typed(), "AB\nC");
        assert_eq!(h.cues(), [AudioCue::Click; 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_audio_opens_gate_on_start() {
        let mut h = harness("x", true);
        h.controller.start();
        assert_eq!(h.controller.current_run(), 1);
        h.finish_typing().await;
        assert_eq!(h.controller.phase(), Phase::Prompt);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_discards_stale_run() {
        let mut h = harness("abcdef", true);
        h.controller.start();

        // Let the first run get a couple of ticks in.
        let first = h.typing_rx.recv().await.unwrap();
        h.controller.handle_typewriter(first);
        let second = h.typing_rx.recv().await.unwrap();
        assert_eq!(second.run(), 1);

        h.controller.restart_typing();
        assert_eq!(h.controller.current_run(), 2);
        assert_eq!(h.controller.typed(), "");

        // A message from run 1 arriving late must not touch the buffer.
        let clicks_before = h.cues().len();
        h.controller.handle_typewriter(second);
        assert_eq!(h.controller.typed(), "");
        assert_eq!(h.cues().len(), clicks_before);

        h.finish_typing().await;
        assert_eq!(h.controller.typed(), "abcdef");
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_message_after_boot_is_ignored() {
        let mut h = harness("a", true);
        h.controller.start();
        h.finish_typing().await;
        h.controller.handle_typewriter(TypewriterMessage::Settled { run: 1 });
        assert_eq!(h.controller.phase(), Phase::Prompt);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_photos_still_reach_ask() {
        let mut h = harness("a", true);
        assert!(!h.controller.set_photos(Vec::new()));
        h.controller.start();
        h.finish_typing().await;

        h.controller.handle(Input::ViewMemories);
        assert!(h.controller.view().body.shows_fallback());
        h.controller.handle(Input::Continue);
        assert_eq!(h.controller.phase(), Phase::Ask);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_then_single_accept() {
        let mut h = harness("a", true);
        let (sink, mut bursts) = ChannelConfetti::new();
        h.controller.load_confetti(Box::new(sink));
        h.controller.start();
        h.finish_typing().await;
        h.walk_to_ask();

        for _ in 0..5 {
            h.controller.handle(Input::Reject);
            assert_eq!(h.controller.phase(), Phase::Ask);
            let message = h.controller.rejection().unwrap();
            assert!(ExperienceConfig::default().rejection_lines.iter().any(|l| l == message));
        }

        h.controller.handle(Input::Accept(AcceptChoice::Yes));
        h.controller.handle(Input::Accept(AcceptChoice::Absolutely));
        assert_eq!(h.controller.phase(), Phase::Accepted);
        assert_eq!(h.controller.rejection(), None);

        let successes = h.cues().iter().filter(|c| **c == AudioCue::Success).count();
        assert_eq!(successes, 1);
        assert_eq!(bursts.try_recv().unwrap().particle_count, 320);
        assert_eq!(bursts.try_recv().unwrap().particle_count, 200);
        assert!(bursts.try_recv().is_err());

        assert!(matches!(
            h.controller.view().body,
            PhaseView::Accepted {
                tone_played: true,
                confetti_sent: true,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_without_confetti_or_audio() {
        let mut h = harness("a", false);
        h.controller.start();
        // Gate opened by interaction, then audio released before accepting.
        h.controller.handle(Input::BootGate(GateSource::Interaction));
        h.finish_typing().await;
        h.walk_to_ask();
        h.controller.audio.release();
        h.controller.handle(Input::Accept(AcceptChoice::Yes));

        assert!(matches!(
            h.controller.view().body,
            PhaseView::Accepted {
                tone_played: false,
                confetti_sent: false,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_photos_regenerates_only_on_change() {
        let (mut controller, _rx) = ExperienceController::new(
            &ExperienceConfig::default(),
            AudioHandle::unavailable(),
            Arc::new(EventEmitter::noop()),
        );
        let photos = vec!["/photos/a.jpg".to_string()];
        assert!(controller.set_photos(photos.clone()));
        assert_eq!(controller.rain().len(), 12);
        assert!(!controller.set_photos(photos));
        assert!(controller.set_photos(vec!["/photos/b.jpg".to_string()]));
        assert!(controller.rain().iter().all(|i| i.src == "/photos/b.jpg"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_audio_once_and_stops_typing() {
        let mut h = harness("abcdef", true);
        h.controller.start();
        h.controller.shutdown(StopReason::Quit);
        h.controller.shutdown(StopReason::Quit);
        drop(h.controller);

        assert_eq!(h.audio.lock().unwrap().closes, 1);
        tokio::time::sleep(Duration::from_secs(10)).await;
        // Cancelled run sends nothing further and its sender is gone.
        while let Ok(message) = h.typing_rx.try_recv() {
            assert!(matches!(message, TypewriterMessage::Tick { .. }));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_stream() {
        let mut h = harness("a", true);
        h.controller.set_photos(vec!["/photos/a.jpg".to_string()]);
        h.controller.start();
        h.finish_typing().await;
        h.walk_to_ask();
        h.controller.handle(Input::Reject);
        h.controller.handle(Input::Accept(AcceptChoice::Yes));
        h.controller.shutdown(StopReason::Quit);

        let events = h.events.events();
        let types: Vec<&str> = events
            .iter()
            .map(|e| e["type"].as_str().unwrap())
            .filter(|t| *t != "CueEmitted")
            .collect();
        assert_eq!(
            types,
            [
                "SessionStarted",
                "PhaseEntered",
                "PhaseEntered",
                "PhaseEntered",
                "RejectionShown",
                "ConfettiFired",
                "ConfettiFired",
                "PhaseEntered",
                "SessionStopped",
            ]
        );
        assert_eq!(events[0]["items"], 12);
        let last = events.last().unwrap();
        assert_eq!(last["phase"], "accepted");
    }
}
