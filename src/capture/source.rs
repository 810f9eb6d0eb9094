use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pcap::{Active, Capture};

use crate::config::CaptureConfig;
use crate::error::{FilterError, SourceError, StartError};
use crate::packet::LinkType;

/// One frame as handed over by a capture primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub data: Vec<u8>,
    pub timestamp: SystemTime,
    /// Length on the wire; may exceed `data.len()` when snaplen truncated it.
    pub wire_len: u32,
}

/// Anything that yields captured frames to the capture thread.
///
/// The source applies its own filtering; frames it returns are delivered
/// as-is.
pub trait PacketSource: Send {
    fn link_type(&self) -> LinkType;

    /// Next frame, or `Ok(None)` when the read timed out with nothing to
    /// deliver. Errors end the capture session.
    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError>;
}

/// Live capture on a network interface through libpcap.
pub struct PcapSource {
    capture: Capture<Active>,
    link_type: LinkType,
}

impl PcapSource {
    /// Opens `interface` and installs `filter` (skipped when empty).
    pub fn open(interface: &str, filter: &str, config: &CaptureConfig) -> Result<Self, StartError> {
        let unavailable = |e: pcap::Error| StartError::InterfaceUnavailable {
            interface: interface.to_string(),
            reason: e.to_string(),
        };

        let mut capture = Capture::from_device(interface)
            .map_err(unavailable)?
            .promisc(config.promiscuous)
            .snaplen(config.snaplen)
            .timeout(config.read_timeout_ms())
            .immediate_mode(config.immediate_mode)
            .open()
            .map_err(unavailable)?;

        if !filter.trim().is_empty() {
            // the interface's link type may reject an expression that
            // compiled against Ethernet
            capture.filter(filter, true).map_err(|e| FilterError {
                expression: filter.to_string(),
                reason: e.to_string(),
            })?;
        }

        let link_type = LinkType::from(capture.get_datalink());
        tracing::debug!(interface, %link_type, "opened capture handle");

        Ok(Self { capture, link_type })
    }
}

impl PacketSource for PcapSource {
    fn link_type(&self) -> LinkType {
        self.link_type
    }

    fn next_frame(&mut self) -> Result<Option<RawFrame>, SourceError> {
        match self.capture.next_packet() {
            Ok(packet) => {
                let ts = packet.header.ts;
                let secs = u64::try_from(ts.tv_sec).unwrap_or(0);
                let micros = u64::try_from(ts.tv_usec).unwrap_or(0);

                Ok(Some(RawFrame {
                    data: packet.data.to_vec(),
                    timestamp: UNIX_EPOCH + Duration::from_secs(secs) + Duration::from_micros(micros),
                    wire_len: packet.header.len,
                }))
            }
            Err(pcap::Error::TimeoutExpired) => Ok(None),
            Err(pcap::Error::NoMorePackets) => Err(SourceError::Closed),
            Err(e) => Err(SourceError::Pcap(e)),
        }
    }
}
