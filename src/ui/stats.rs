use std::collections::HashMap;

use sniffle::PacketSummary;

/// Running per-protocol packet counts.
#[derive(Debug, Default, Clone)]
pub struct ProtocolStats {
    counts: HashMap<String, usize>,
    total: usize,
    bytes: u64,
}

impl ProtocolStats {
    pub fn record(&mut self, summary: &PacketSummary) {
        *self.counts.entry(summary.protocol.clone()).or_insert(0) += 1;
        self.total += 1;
        self.bytes += u64::from(summary.wire_length);
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Protocols by descending count, ties by name.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut rows: Vec<(&str, usize)> = self.counts.iter().map(|(name, count)| (name.as_str(), *count)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Prints a summary of captured packets by protocol.
pub fn print_packet_summary(stats: &ProtocolStats) {
    println!("\nPacket summary:");

    if stats.is_empty() {
        println!("  No packets captured");
        return;
    }

    for (protocol, count) in stats.sorted() {
        println!("  {:<10} {}", protocol, count);
    }
    println!("  {} packets, {} bytes on the wire", stats.total(), stats.bytes());
}
