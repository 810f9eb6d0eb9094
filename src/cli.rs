use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sniffle::core::MAXSIZE;
use sniffle::CaptureConfig;

/// Sniffle - live packet capture and layer dissection
#[derive(Parser, Debug)]
#[command(name = "sniffle", version, about = "Live packet capture with layer-by-layer dissection")]
pub struct CliArgs {
    /// Interface to capture on. Defaults to the one libpcap picks.
    #[arg(short, long, value_name = "NAME")]
    pub interface: Option<String>,

    /// BPF filter expression, e.g. "tcp port 80".
    #[arg(short, long, value_name = "EXPR", default_value = "")]
    pub filter: String,

    /// Print the available interfaces and exit.
    #[arg(long)]
    pub list_interfaces: bool,

    /// Print one line per packet instead of starting the terminal UI.
    #[arg(long)]
    pub no_tui: bool,

    /// With --no-tui, also print every packet's layers and fields.
    #[arg(long, requires = "no_tui")]
    pub layers: bool,

    /// With --no-tui, stop after this many packets.
    #[arg(short = 'c', long, value_name = "N")]
    pub count: Option<u64>,

    /// Maximum bytes kept per frame.
    #[arg(long, default_value_t = 65535)]
    pub snaplen: i32,

    /// Put the interface into promiscuous mode.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub promisc: bool,

    /// How long stopping waits for the capture thread.
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    pub stop_timeout_ms: u64,

    /// Rows kept in the packet table.
    #[arg(long, value_name = "ROWS", default_value_t = MAXSIZE)]
    pub buffer_size: usize,

    /// Where logs go in TUI mode. Headless mode logs to stderr.
    #[arg(long, value_name = "FILE", default_value = "sniffle.log")]
    pub log_file: PathBuf,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}

impl CliArgs {
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            snaplen: self.snaplen,
            promiscuous: self.promisc,
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
            ..CaptureConfig::default()
        }
    }
}
