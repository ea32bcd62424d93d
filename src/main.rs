use anyhow::Context;
use floatplay::config;
use floatplay::events::AppEvent;
use floatplay::playback::{PlaybackEvent, PlaybackStatus};
use floatplay::sys::engine::{EngineStatus, SimulatedEngine};
use floatplay::sys::runtime;
use floatplay::touch::{TouchAction, TouchEvent};
use floatplay::widget::controls::{ControlsListener, WidgetStateListener};
use floatplay::{FloatingPlayer, PlaybackState, WidgetState};
use floatwm::{DisplayMetrics, InMemoryWindowManager, Point};
use std::thread;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);
const TRACK_LENGTH_MS: u32 = 215_000;

/// Scripted user input, keyed by the frame clock.
#[derive(Debug, Clone, Copy)]
enum Step {
    Show(f64, f64),
    Tap,
    Drag(f64, f64),
    Expand,
    Collapse,
    Hide,
}

const SCRIPT: &[(u64, Step)] = &[
    (0, Step::Show(900.0, 400.0)),
    (600, Step::Tap),
    (1_500, Step::Drag(-700.0, 600.0)),
    (2_500, Step::Expand),
    (6_000, Step::Collapse),
    (8_000, Step::Tap),
    (9_000, Step::Hide),
];

const DEMO_LENGTH: Duration = Duration::from_millis(9_500);

struct HostListener;

impl WidgetStateListener for HostListener {
    fn on_widget_state_changed(&mut self, state: WidgetState) {
        log::info!("Widget state: {}", state);
    }

    fn on_widget_position_changed(&mut self, cx: i32, cy: i32) {
        log::info!("Widget settled at ({}, {})", cx, cy);
    }
}

impl ControlsListener for HostListener {
    fn on_previous_clicked(&mut self) {
        log::info!("Previous track");
    }

    fn on_next_clicked(&mut self) {
        log::info!("Next track");
    }

    fn on_album_clicked(&mut self) {
        log::info!("Album clicked");
    }
}

fn tap(player: &mut FloatingPlayer<InMemoryWindowManager>, now: Duration) {
    let origin = player.button_position();
    let size = player.button_touch().size();
    let at = Point::new(origin.x + size.width / 2.0, origin.y + size.height / 2.0);
    player.on_button_touch(&TouchEvent::on_surface(TouchAction::Down, at, origin, now));
    player.on_button_touch(&TouchEvent::on_surface(
        TouchAction::Up,
        at,
        origin,
        now + Duration::from_millis(60),
    ));
}

fn drag(player: &mut FloatingPlayer<InMemoryWindowManager>, now: Duration, dx: f64, dy: f64) {
    let size = player.button_touch().size();
    let origin = player.button_position();
    let start = Point::new(origin.x + size.width / 2.0, origin.y + size.height / 2.0);
    player.on_button_touch(&TouchEvent::on_surface(TouchAction::Down, start, origin, now));

    const STEPS: u32 = 10;
    let mut raw = start;
    for i in 1..=STEPS {
        raw = start.offset(dx * i as f64 / STEPS as f64, dy * i as f64 / STEPS as f64);
        let time = now + FRAME * i;
        player.on_button_touch(&TouchEvent::on_surface(
            TouchAction::Move,
            raw,
            player.button_position(),
            time,
        ));
    }
    player.on_button_touch(&TouchEvent::on_surface(
        TouchAction::Up,
        raw,
        player.button_position(),
        now + FRAME * (STEPS + 1),
    ));
}

fn run_step(player: &mut FloatingPlayer<InMemoryWindowManager>, step: Step, now: Duration) {
    log::debug!("Demo step: {:?}", step);
    match step {
        Step::Show(cx, cy) => player.show(cx, cy),
        Step::Tap => tap(player, now),
        Step::Drag(dx, dy) => drag(player, now, dx, dy),
        Step::Expand => {
            player.expand();
        }
        Step::Collapse => {
            player.collapse();
        }
        Step::Hide => player.hide(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_or_default()
        .build()
        .context("Invalid widget configuration")?;
    let poll_interval = config.poll_interval;

    let metrics = DisplayMetrics::new(1080.0, 1920.0).with_bars(63.0, 126.0);
    let playback = PlaybackState::new();
    let engine = SimulatedEngine::new(TRACK_LENGTH_MS);

    {
        let engine = engine.clone();
        playback.subscribe(move |event| {
            if let PlaybackEvent::StateChanged { new, .. } = event {
                match new {
                    PlaybackStatus::Playing => engine.play(),
                    PlaybackStatus::Paused => engine.pause(),
                    PlaybackStatus::Stopped => engine.stop(),
                }
            }
        });
    }

    let mut player = FloatingPlayer::new(InMemoryWindowManager::new(), config, metrics, playback);
    {
        let mut controller = player.controller();
        controller.set_state_listener(Some(Box::new(HostListener)));
        controller.set_controls_listener(Some(Box::new(HostListener)));
        controller.set_duration(TRACK_LENGTH_MS);
    }

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, engine, poll_interval)
        .context("Failed to start background services")?;

    let mut now = Duration::ZERO;
    let mut script = SCRIPT.iter().peekable();
    while now < DEMO_LENGTH {
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Progress { position, duration } => {
                    let mut controller = player.controller();
                    controller.set_duration(duration);
                    controller.set_position(position);
                }
                AppEvent::EngineStatus(EngineStatus::Completed) => player.controller().stop(),
                AppEvent::EngineStatus(EngineStatus::Failed(reason)) => {
                    log::error!("Playback failed: {}", reason);
                    player.controller().stop();
                }
                AppEvent::EngineStatus(status) => log::debug!("Engine: {:?}", status),
                AppEvent::ConfigReload => match config::load_or_default().build() {
                    Ok(config) => player.reconfigure(config),
                    Err(e) => log::warn!("Ignoring invalid configuration: {}", e),
                },
            }
        }

        while let Some((_, step)) = script.next_if(|(at, _)| Duration::from_millis(*at) <= now) {
            run_step(&mut player, *step, now);
        }

        player.advance(FRAME);
        now += FRAME;
        thread::sleep(FRAME);
    }

    let updates = player.window_manager().update_count();
    let status = player.controller().status();
    log::info!("Demo finished: {} surface updates, playback {}", updates, status);
    Ok(())
}
