//! Whole-experience scenarios driven through the library, with frames
//! painted off-screen instead of to a terminal.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedReceiver;

use valentine::audio::{AudioContext, AudioHandle, SilentBackend};
use valentine::confetti::{ChannelConfetti, ConfettiBurst};
use valentine::config::ExperienceConfig;
use valentine::observability::{EventEmitter, StopReason};
use valentine::phase::{AcceptChoice, ExperienceController, GateSource, Input, Phase, PhaseView};
use valentine::render::{FrameBuffer, ParticleField, paint};
use valentine::session::{Action, actions};
use valentine::typewriter::TypewriterMessage;

struct Scenario {
    controller: ExperienceController,
    typing_rx: UnboundedReceiver<TypewriterMessage>,
    confetti_rx: UnboundedReceiver<ConfettiBurst>,
    events_file: tempfile::NamedTempFile,
}

fn scenario(photos: &[&str], autoplay: bool) -> Scenario {
    let config = ExperienceConfig {
        boot_script: "Online\nHello".to_string(),
        ..ExperienceConfig::default()
    };
    let audio = AudioHandle::mount(|| Some(AudioContext::new(Box::new(SilentBackend), autoplay)));
    let events_file = tempfile::NamedTempFile::new().unwrap();
    let emitter = EventEmitter::from_file(events_file.path()).unwrap();

    let (controller, typing_rx) = ExperienceController::new(&config, audio, Arc::new(emitter));
    let mut controller = controller.with_rng(StdRng::seed_from_u64(11));
    let (sink, confetti_rx) = ChannelConfetti::new();
    controller.load_confetti(Box::new(sink));
    controller.set_photos(photos.iter().map(ToString::to_string).collect());

    Scenario {
        controller,
        typing_rx,
        confetti_rx,
        events_file,
    }
}

impl Scenario {
    async fn finish_boot(&mut self) {
        while self.controller.phase() == Phase::Boot {
            let message = self.typing_rx.recv().await.unwrap();
            self.controller.handle_typewriter(message);
        }
    }

    fn screen(&self) -> String {
        let mut frame = FrameBuffer::new(100, 40);
        paint(&self.controller.view(), 0.0, &mut frame);
        frame.to_text()
    }

    fn event_types(&self) -> Vec<String> {
        std::fs::read_to_string(self.events_file.path())
            .unwrap()
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["type"].as_str().unwrap().to_string()
            })
            .collect()
    }

    /// Routes a key press through the keymap the session uses.
    fn press(&mut self, ch: char) {
        use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
        let event = Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        for action in actions(self.controller.phase(), &event) {
            match action {
                Action::Input(input) => self.controller.handle(input),
                Action::Replay => self.controller.restart_typing(),
                Action::Quit => self.controller.shutdown(StopReason::Quit),
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn first_key_starts_typing_and_boot_settles_into_prompt() {
    let mut s = scenario(&["/photos/us.jpg"], false);
    s.controller.start();
    assert!(s.screen().contains("press any key"));

    s.press('x');
    s.finish_boot().await;
    assert_eq!(s.controller.phase(), Phase::Prompt);
    assert!(s.screen().contains("Would you like to view memories?"));
}

#[tokio::test(start_paused = true)]
async fn autoplay_skips_the_gate() {
    let mut s = scenario(&[], true);
    s.controller.start();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(s.typing_rx.try_recv().is_ok(), "typing should run without a key press");
    s.finish_boot().await;
    assert_eq!(s.controller.phase(), Phase::Prompt);
}

#[tokio::test(start_paused = true)]
async fn no_photos_shows_fallback_and_still_reaches_ask() {
    let mut s = scenario(&[], true);
    s.controller.start();
    s.finish_boot().await;

    s.press('m');
    assert_eq!(s.controller.phase(), Phase::Memories);
    assert!(s.controller.rain().is_empty());
    assert!(s.controller.view().body.shows_fallback());
    assert!(s.screen().contains("Drop photos into public/photos"));

    s.press('c');
    assert_eq!(s.controller.phase(), Phase::Ask);
}

#[tokio::test(start_paused = true)]
async fn one_photo_rains_twelve_times() {
    let mut s = scenario(&["/photos/us.jpg"], true);
    s.controller.start();
    s.finish_boot().await;
    s.press('m');

    let rain = s.controller.rain();
    assert_eq!(rain.len(), 12);
    assert!(rain.iter().all(|item| item.src == "/photos/us.jpg"));
    assert!(matches!(s.controller.view().body, PhaseView::Memories { .. }));
}

#[tokio::test(start_paused = true)]
async fn rejections_then_one_acceptance() {
    let mut s = scenario(&["/photos/a.png", "/photos/b.png"], true);
    s.controller.start();
    s.finish_boot().await;
    s.press('m');
    s.press('c');

    s.press('n');
    let first = s.controller.rejection().map(ToString::to_string);
    assert!(first.is_some());
    assert!(s.screen().contains(first.as_deref().unwrap()));
    s.press('n');
    assert_eq!(s.controller.phase(), Phase::Ask);

    s.press('a');
    assert_eq!(s.controller.phase(), Phase::Accepted);
    assert!(s.controller.rejection().is_none());
    s.controller.handle(Input::Accept(AcceptChoice::Yes));
    s.controller.handle(Input::BootGate(GateSource::Interaction));

    let mut field = ParticleField::new(StdRng::seed_from_u64(3));
    let mut counts = Vec::new();
    while let Ok(burst) = s.confetti_rx.try_recv() {
        counts.push(burst.particle_count);
        field.spawn(&burst, 100, 40);
    }
    assert_eq!(counts, [320, 200]);
    assert_eq!(field.len(), 520);

    let screen = s.screen();
    assert!(screen.contains("VALENTINE ACCEPTED"));
    assert!(screen.contains("Forever"));

    s.press('q');
    let types = s.event_types();
    assert_eq!(types.first().map(String::as_str), Some("session_started"));
    assert_eq!(types.last().map(String::as_str), Some("session_stopped"));
    assert_eq!(types.iter().filter(|t| *t == "confetti_fired").count(), 2);
    assert_eq!(types.iter().filter(|t| *t == "rejection_shown").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn replay_restarts_the_boot_script() {
    let mut s = scenario(&[], true);
    s.controller.start();
    tokio::time::sleep(Duration::from_millis(400)).await;
    let first_run = s.controller.current_run();

    s.press('r');
    assert_eq!(s.controller.current_run(), first_run + 1);
    assert!(s.controller.typed().is_empty());
    s.finish_boot().await;
    assert_eq!(s.controller.phase(), Phase::Prompt);
}
