mod cli;
mod signal;
mod ui;

use std::fs::File;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use clap::Parser;
use sniffle::capture::default_interface;
use sniffle::{list_interfaces, CaptureEngine, DisplayBuffer};
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;
use crate::signal::setup_ctrlc_handler;
use crate::ui::console::ConsoleOptions;
use crate::ui::tui::{App, UiMode};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Failed to open log file {}: {}", args.log_file.display(), e);
        return ExitCode::FAILURE;
    }

    if args.list_interfaces {
        return match list_interfaces() {
            Ok(devices) => {
                ui::device::print_device_list(&devices);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to list interfaces: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let interface = args.interface.clone().or_else(|| match default_interface() {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "no default capture interface");
            None
        }
    });

    if args.no_tui {
        run_headless(&args, interface)
    } else {
        run_tui(&args, interface)
    }
}

/// Logs go to stderr in headless mode and to `--log-file` under the TUI,
/// which owns the terminal.
fn init_logging(args: &CliArgs) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if args.no_tui || args.list_interfaces {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = File::create(&args.log_file)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

fn run_headless(args: &CliArgs, interface: Option<String>) -> ExitCode {
    let Some(interface) = interface else {
        eprintln!("No capture interface found; pass one with -i (see --list-interfaces)");
        return ExitCode::FAILURE;
    };

    let running = Arc::new(AtomicBool::new(true));
    if let Err(e) = setup_ctrlc_handler(Arc::clone(&running)) {
        eprintln!("Failed to set Ctrl+C handler: {}", e);
        return ExitCode::FAILURE;
    }

    let (mut engine, events) = CaptureEngine::new(args.capture_config());
    if let Err(e) = engine.start(&interface, &args.filter) {
        eprintln!("Error starting capture: {}", e);
        return ExitCode::FAILURE;
    }
    println!("Capturing on {} (Ctrl+C to stop)", interface);

    let options = ConsoleOptions {
        layers: args.layers,
        count: args.count,
    };
    match ui::console::run(&mut engine, &events, &running, &options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Output error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_tui(args: &CliArgs, interface: Option<String>) -> ExitCode {
    let (engine, events) = CaptureEngine::new(args.capture_config());
    let buffer = DisplayBuffer::with_capacity(args.buffer_size);
    let mut app = App::new(engine, buffer, interface, args.filter.trim().to_string());

    if app.interface.is_some() {
        app.start_capture();
    } else {
        match list_interfaces() {
            Ok(options) if !options.is_empty() => app.ui.mode = UiMode::DeviceMenu { options, selected: 0 },
            Ok(_) => app.ui.set_error("No capture interfaces found (missing permissions?)"),
            Err(e) => app.ui.set_error(format!("Failed to list interfaces: {}", e)),
        }
    }

    match ui::tui::run(app, events) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Terminal error: {}", e);
            ExitCode::FAILURE
        }
    }
}
