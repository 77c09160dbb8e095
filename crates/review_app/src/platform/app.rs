use std::io::{self, Write};
use std::mem;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use review_core::{update, AppState, Msg};
use review_engine::EngineHandle;
use review_logging::{review_debug, review_info};

use super::config::AppConfig;
use super::effects::{spawn_event_loop, EffectRunner};
use super::ui::input::{parse_command, spawn_stdin_reader, Command, HELP};
use super::ui::render::render;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// Everything the app loop reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Msg(Msg),
    /// A line typed by the reviewer.
    Line(String),
    /// One-off status text that does not touch state.
    Status(String),
    Quit,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    review_info!("starting workbench against {}", config.engine.backend.base_url);
    let (engine, events) =
        EngineHandle::spawn(config.engine.clone()).context("failed to start the engine")?;

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    spawn_event_loop(events, input_tx.clone());
    spawn_stdin_reader(input_tx.clone());

    // Background tick to throttle rendering.
    thread::spawn(move || {
        while input_tx.send(Input::Msg(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let runner = EffectRunner::new(engine, config.text_dir.clone());
    runner.load_decisions();

    let mut session = Session::new(
        AppState::with_thresholds(config.thresholds),
        runner,
        io::stdout(),
    );
    writeln!(session.out, "{HELP}")?;
    session.dispatch(Msg::RefreshFiles);
    if let Some(document) = config.document {
        session.dispatch(Msg::DocumentSelected(document));
    }

    while let Ok(input) = input_rx.recv() {
        if !session.handle(input)? {
            break;
        }
    }
    review_info!("workbench closed");
    Ok(())
}

/// Owns the state and applies inputs to it, rendering at most once per tick.
struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
    render_pending: bool,
    last_frame: Option<String>,
}

impl<W: Write> Session<W> {
    fn new(state: AppState, runner: EffectRunner, out: W) -> Self {
        Self {
            state,
            runner,
            out,
            render_pending: true,
            last_frame: None,
        }
    }

    /// Returns `false` once the app should stop.
    fn handle(&mut self, input: Input) -> io::Result<bool> {
        match input {
            Input::Msg(Msg::Tick) => self.flush_render()?,
            Input::Msg(msg) => self.dispatch(msg),
            Input::Line(line) => match parse_command(&line, self.state.files()) {
                Ok(Some(Command::Dispatch(msg))) => self.dispatch(msg),
                Ok(Some(Command::Help)) => writeln!(self.out, "{HELP}")?,
                Ok(Some(Command::Quit)) => return Ok(false),
                Ok(None) => {}
                Err(message) => writeln!(self.out, "{message}")?,
            },
            Input::Status(line) => writeln!(self.out, "{line}")?,
            Input::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn dispatch(&mut self, msg: Msg) {
        review_debug!("msg {:?}", msg);
        let (state, effects) = update(mem::take(&mut self.state), msg);
        self.state = state;
        if self.state.consume_dirty() {
            self.render_pending = true;
        }
        self.runner.run(effects);
    }

    fn flush_render(&mut self) -> io::Result<()> {
        if !mem::take(&mut self.render_pending) {
            return Ok(());
        }
        let frame = render(&self.state.view());
        if self.last_frame.as_ref() != Some(&frame) {
            writeln!(self.out, "{frame}")?;
            self.out.flush()?;
            self.last_frame = Some(frame);
        }
        Ok(())
    }
}
