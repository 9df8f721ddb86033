//! `ri` entrypoint: raw terminal, decode keys, edit, repaint.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::{Config, load_from};
use core_events::KeyAction;
use core_input::{InputDecoder, classify_polled};
use core_render::{Viewport, ViewportRenderer, present};
use core_state::{EditorState, Outcome};
use core_terminal::{CrosstermBackend, Terminal, TerminalIo, viewport_size};
use core_text::GlyphWidthOracle;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "ri.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "ri", version, about = "Raw terminal input decoder and viewport renderer")]
struct Args {
    /// Optional configuration file path (overrides discovery of `ri.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global subscriber already installed; drop guard so the writer shuts down.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }

    /// Enter raw mode and run until the user quits. The terminal guard is
    /// dropped (terminal restored) before this returns, error or not.
    fn run(&mut self, config: &Config) -> Result<RunStats> {
        let viewport = Viewport::from(viewport_size().context("reading terminal size")?);
        info!(
            target: "runtime",
            columns = viewport.columns,
            rows = viewport.rows,
            strategy = ?config.width_strategy(),
            key_labels = config.key_labels(),
            file_logging = self.log_guard.is_some(),
            "startup"
        );
        let _guard = self.backend.enter_guard().context("entering raw mode")?;
        let mut term = Terminal::open(config.escape_timeout());
        let mut runtime = Runtime::new(config, viewport);
        runtime.drive(&mut term)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunStats {
    events: u64,
    frames: u64,
    probes: u64,
}

/// Everything the main loop owns besides the terminal itself.
struct Runtime {
    decoder: InputDecoder,
    state: EditorState,
    oracle: GlyphWidthOracle,
    renderer: ViewportRenderer,
    events: u64,
}

impl Runtime {
    fn new(config: &Config, viewport: Viewport) -> Self {
        Self {
            decoder: InputDecoder::new(),
            state: EditorState::new(config.key_labels()),
            oracle: GlyphWidthOracle::new(config.width_strategy()),
            renderer: ViewportRenderer::new(viewport),
            events: 0,
        }
    }

    /// Read, classify, apply, repaint; until an Escape action. A poll that
    /// times out with nothing changed skips the repaint.
    fn drive<T: TerminalIo>(&mut self, term: &mut T) -> Result<RunStats> {
        self.redraw(term)?;
        loop {
            let event = self
                .decoder
                .decode_next(term)
                .context("reading keyboard input")?;
            if event.is_some() {
                self.events += 1;
            }
            let action = classify_polled(event.as_ref());
            let outcome = self.state.apply(&action);
            if self.state.should_quit() {
                break;
            }
            if outcome == Outcome::Ignored {
                if action != KeyAction::None {
                    debug!(target: "runtime", "action_ignored");
                }
                continue;
            }
            self.redraw(term)?;
        }
        let stats = self.stats();
        info!(
            target: "runtime",
            events = stats.events,
            frames = stats.frames,
            probes = stats.probes,
            cached_widths = self.oracle.cache().len(),
            "shutdown"
        );
        Ok(stats)
    }

    fn redraw<T: TerminalIo>(&mut self, term: &mut T) -> Result<()> {
        let frame = self
            .renderer
            .render(
                self.state.buffer(),
                self.state.offset(),
                &mut self.oracle.bind(term),
            )
            .context("rendering frame")?;
        present(term, &frame).context("writing frame")
    }

    fn stats(&self) -> RunStats {
        RunStats {
            events: self.events,
            frames: self.renderer.frames(),
            probes: self.oracle.probes(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();

    let config = load_from(args.config).context("loading configuration")?;
    let result = startup.run(&config);
    if let Err(e) = &result {
        error!(target: "runtime", error = %format!("{e:#}"), "fatal");
    }
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::ansi::{CLEAR_SCREEN, CURSOR_HIDE, CURSOR_HOME, CURSOR_SHOW};
    use core_terminal::script::ScriptedTerminal;
    use core_terminal::{ByteSource, TermError};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn runtime(columns: u16, rows: u16) -> Runtime {
        Runtime::new(&Config::default(), Viewport::new(columns, rows))
    }

    fn last_frame(written: &[u8]) -> &[u8] {
        let start = written
            .windows(CURSOR_HIDE.len())
            .rposition(|w| w == CURSOR_HIDE)
            .unwrap();
        &written[start..]
    }

    #[test]
    fn parses_config_flag() {
        let args = Args::try_parse_from(["ri", "--config", "alt.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
        let args = Args::try_parse_from(["ri"]).unwrap();
        assert!(args.config.is_none());
    }

    #[test]
    fn escape_quits_after_initial_frame() {
        let mut term = ScriptedTerminal::with_input(b"\x1b");
        let mut rt = runtime(10, 2);
        let stats = rt.drive(&mut term).unwrap();
        assert_eq!(stats.events, 1);
        assert_eq!(stats.frames, 1);
        let expected = [
            CURSOR_HIDE,
            CLEAR_SCREEN,
            CURSOR_HOME,
            b"\r\n".as_slice(),
            CURSOR_SHOW,
        ]
        .concat();
        assert_eq!(term.written(), expected.as_slice());
    }

    #[test]
    fn typed_lines_reach_the_screen() {
        let mut term = ScriptedTerminal::with_input(b"hi\rhey\x1b");
        let mut rt = runtime(10, 3);
        let stats = rt.drive(&mut term).unwrap();
        assert_eq!(stats.events, 7);
        assert_eq!(stats.frames, 7);
        let frame = last_frame(term.written());
        let expected = [CURSOR_HIDE, b"\x1b[2J\x1b[Hhi\r\nhey\r\n".as_slice(), CURSOR_SHOW].concat();
        assert_eq!(frame, expected.as_slice());
    }

    /// Times out before every byte, like a user pausing between keys.
    struct Stutter {
        term: ScriptedTerminal,
        idle: bool,
    }

    impl ByteSource for Stutter {
        fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
            self.idle = !self.idle;
            if self.idle {
                return Ok(None);
            }
            self.term.read_byte()
        }
    }

    impl Write for Stutter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.term.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.term.flush()
        }
    }

    #[test]
    fn idle_polls_do_not_repaint() {
        let mut term = Stutter {
            term: ScriptedTerminal::with_input(b"ab\x1b"),
            idle: false,
        };
        let mut rt = runtime(4, 1);
        let stats = rt.drive(&mut term).unwrap();
        assert_eq!(stats.events, 3);
        // initial, "a", "b"
        assert_eq!(stats.frames, 3);
        assert_eq!(rt.state.buffer().line(0), Some(&b"ab"[..]));
    }

    #[test]
    fn wide_glyph_probed_once_across_repaints() {
        let mut term = ScriptedTerminal::with_input("漢a漢\x1b".as_bytes()).with_width('漢', 2);
        let mut rt = runtime(8, 1);
        let stats = rt.drive(&mut term).unwrap();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.probes, 1);
        let frame = last_frame(term.written());
        let expected = [CURSOR_HIDE, "\x1b[2J\x1b[H漢a漢".as_bytes(), CURSOR_SHOW].concat();
        assert_eq!(frame, expected.as_slice());
    }
}
