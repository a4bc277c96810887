// ais-viewer
//
// Live table of the AIS vessels reported by gpsd, one row per MMSI,
// sorted by MMSI.
//
// Run:  cargo run --release --bin ais-viewer -- [--host h] [--port p] [--scaled]
// Quit: q / Esc / Ctrl-C

use aisview::gpsd::{Command, Message, Port, RecvError};
use aisview::vessel::DispatchStats;
use aisview::view::{RefreshScheduler, Viewport};
use aisview_tools::listview::ListState;
use aisview_tools::tui::{restore_screen, Tui};
use aisview_tools::vesselview::VesselView;
use aisview_tools::{gpsd_opts, gpsd_parseopts, logging, ViewerConfig, ViewerError};
use chrono::{DateTime, Local};
use crossbeam::channel;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io;
use std::process::ExitCode;
use std::thread;
use tracing::{error, info};

/// Messages handled before giving the screen a chance to redraw.
const MAX_BATCH: usize = 256;

fn print_usage(opts: &getopts::Options, program: &str, code: u8) -> ExitCode {
    let brief = format!(
        "Usage: {program} [options]\n\n\
         Displays AIS data from gpsd."
    );
    eprintln!("{}", opts.usage(&brief));
    ExitCode::from(code)
}

fn parse_cli() -> Result<ViewerConfig, ExitCode> {
    let mut opts = gpsd_opts();
    opts.optflag("h", "help", "Show help");

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "ais-viewer".into());
    match gpsd_parseopts(&opts, args.get(1..).unwrap_or(&[])) {
        Ok((matches, _)) if matches.opt_present("help") => {
            Err(print_usage(&opts, &program, 0))
        }
        Ok((_, config)) => Ok(config),
        Err(e) => {
            eprintln!("{program}: {e}");
            Err(print_usage(&opts, &program, 1))
        }
    }
}

fn footer(stats: DispatchStats, vessels: usize, last_report: Option<DateTime<Local>>) -> String {
    let last = match last_report {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => "-".to_string(),
    };
    format!(
        "AIS viewer    Ctrl+C quit    vessels: {}  reports: {}  skipped: {}  last: {}",
        vessels, stats.reports, stats.skipped, last
    )
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Moves the focus; returns whether anything on screen changed.
fn navigate(list: &mut ListState, code: KeyCode) -> bool {
    let before = (list.focus(), list.visible_rows());
    match code {
        KeyCode::Up => list.up(1),
        KeyCode::Down => list.down(1),
        KeyCode::PageUp => list.page_up(),
        KeyCode::PageDown => list.page_down(),
        KeyCode::Home => list.home(),
        KeyCode::End => list.end(),
        _ => return false,
    }
    before != (list.focus(), list.visible_rows())
}

fn event_loop(
    tui: &mut Tui,
    rx: &channel::Receiver<Result<Message, RecvError>>,
    config: &ViewerConfig,
) -> Result<(), ViewerError> {
    // Keyboard handler
    let (key_tx, key_rx) = channel::unbounded();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if key_tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let refresh = RefreshScheduler::new(config.refresh_interval());
    let mut view = VesselView::new(Tui::body_height(terminal::size()?.1));
    let mut dirty = true;

    loop {
        if dirty {
            let status = footer(
                view.dispatcher().stats(),
                view.dispatcher().table().row_count(),
                view.last_report(),
            );
            tui.draw(view.projector(), view.list(), &status)?;
            dirty = false;
        }

        crossbeam::select! {
            recv(key_rx) -> ev => match ev {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    if is_quit(&key) {
                        return Ok(());
                    }
                    dirty |= navigate(view.list_mut(), key.code);
                }
                Ok(Event::Resize(_, rows)) => {
                    view.list_mut().set_height(Tui::body_height(rows));
                    dirty = true;
                }
                Ok(_) => {}
                Err(_) => return Err(ViewerError::Terminal(io::Error::other("keyboard input closed"))),
            },

            recv(rx) -> rxdata => {
                let first = rxdata
                    .map_err(|_| ViewerError::Disconnected("port thread exited".into()))?;
                for rxdata in std::iter::once(first).chain(rx.try_iter().take(MAX_BATCH)) {
                    dirty |= view.handle_message(rxdata)?;
                }
            }

            recv(refresh.receiver()) -> _ => {
                dirty = true;
            }
        }
    }
}

fn run(config: &ViewerConfig) -> Result<(), ViewerError> {
    let url = config.daemon_url();
    let (rx_send, rx) = Port::rx_channel();
    let port = Port::new(&url, Port::rx_to_channel(rx_send))
        .map_err(|source| ViewerError::Connect { url, source })?;
    port.send(Command::watch(config.scaled))
        .map_err(|e| ViewerError::Command(format!("{:?}", e)))?;
    info!(peer = %port.peer(), scaled = config.scaled, "watching AIS reports");

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_screen(&mut io::stdout());
        original_hook(panic_info);
    }));
    let mut tui = Tui::setup()?;

    let result = event_loop(&mut tui, &rx, config);
    tui.teardown();
    result
}

fn main() -> ExitCode {
    let config = match parse_cli() {
        Ok(config) => config,
        Err(code) => return code,
    };
    if let Err(e) = logging::init(&config) {
        eprintln!("ais-viewer: {e}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => {
            info!("quit");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "ais-viewer failed");
            eprintln!("ais-viewer: {e}");
            ExitCode::FAILURE
        }
    }
}
