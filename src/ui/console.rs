use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use sniffle::{CaptureEngine, CaptureEvent, CapturedPacket};

use super::stats::{print_packet_summary, ProtocolStats};

/// How often the loop rechecks the Ctrl+C flag while no packets arrive.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ConsoleOptions {
    pub layers: bool,
    pub count: Option<u64>,
}

/// Prints packets until Ctrl+C, the packet limit, or the capture ends on
/// its own. Stops the engine before returning.
pub fn run(
    engine: &mut CaptureEngine,
    events: &Receiver<CaptureEvent>,
    running: &Arc<AtomicBool>,
    options: &ConsoleOptions,
) -> io::Result<ProtocolStats> {
    let mut stats = ProtocolStats::default();
    let mut printed: u64 = 0;
    let stdout = io::stdout();

    'capture: while running.load(Ordering::SeqCst) {
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(CaptureEvent::PacketsAvailable) => {
                let mut out = stdout.lock();
                while let Some(packet) = engine.try_pop() {
                    stats.record(packet.summary());
                    writeln!(out, "{}", format_packet_line(&packet))?;
                    if options.layers {
                        write_layers(&mut out, &packet)?;
                    }

                    printed += 1;
                    if options.count.is_some_and(|limit| printed >= limit) {
                        break 'capture;
                    }
                }
                out.flush()?;
            }
            Ok(CaptureEvent::Terminated(reason)) => {
                eprintln!("{}", reason);
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let outcome = engine.stop();
    tracing::debug!(?outcome, printed, "headless capture finished");
    print_packet_summary(&stats);
    Ok(stats)
}

/// `seq  elapsed  src -> dst  proto  len  info`, with ports folded into
/// the addresses.
pub fn format_packet_line(packet: &CapturedPacket) -> String {
    let summary = packet.summary();

    let endpoint = |addr: String, port: Option<u16>| match port {
        Some(port) => format!("{}:{}", addr, port),
        None => addr,
    };

    format!(
        "{:>6} {:>12} {} -> {} {} {} {}",
        summary.sequence,
        summary.elapsed_text(),
        endpoint(summary.source_text(), summary.src_port),
        endpoint(summary.destination_text(), summary.dst_port),
        summary.protocol,
        summary.length,
        summary.info
    )
}

fn write_layers(out: &mut impl Write, packet: &CapturedPacket) -> io::Result<()> {
    for layer in packet.layers() {
        writeln!(out, "    ### {} ###", layer.label())?;
        for field in layer.fields() {
            writeln!(out, "      {}", field)?;
        }
    }
    Ok(())
}
