use sniffle::{validate, FilterError};

/// Suggested BPF filters for an interface, as `(label, expression)`.
///
/// Loopback interfaces carry no ARP or web traffic worth offering, so they
/// get a local-traffic filter instead.
pub fn bpf_filter_suggestions(loopback: bool) -> Vec<(&'static str, &'static str)> {
    let mut filters = vec![
        ("All traffic", ""),
        ("TCP only", "tcp"),
        ("UDP only", "udp"),
        ("ICMP only", "icmp or icmp6"),
        ("DNS", "udp port 53"),
    ];

    if loopback {
        filters.push(("Loopback-only traffic (e.g. local apps)", "ip and src net 127.0.0.1"));
    } else {
        filters.extend([
            ("ARP traffic", "arp"),
            ("Port 80 (HTTP)", "tcp port 80"),
            ("Port 443 (HTTPS)", "tcp port 443"),
        ]);
    }

    filters
}

/// Guesses loopback from the name when libpcap flags are not at hand.
pub fn looks_like_loopback(interface: &str) -> bool {
    interface.starts_with("lo") || interface.starts_with("utun") || interface.contains("loop")
}

/// Validation state of the filter being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterStatus {
    Valid,
    Invalid(String),
}

impl FilterStatus {
    pub fn check(expression: &str) -> Self {
        match validate(expression) {
            Ok(()) => FilterStatus::Valid,
            Err(FilterError { reason, .. }) => FilterStatus::Invalid(reason),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, FilterStatus::Valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_all_valid() {
        for loopback in [true, false] {
            for (label, expression) in bpf_filter_suggestions(loopback) {
                assert!(FilterStatus::check(expression).is_valid(), "{} ({})", label, expression);
            }
        }
    }

    #[test]
    fn test_loopback_suggestions() {
        let loopback = bpf_filter_suggestions(true);
        assert!(loopback.iter().all(|(_, expr)| *expr != "arp"));
        assert!(bpf_filter_suggestions(false).iter().any(|(_, expr)| *expr == "arp"));
    }

    #[test]
    fn test_status() {
        assert_eq!(FilterStatus::check(""), FilterStatus::Valid);
        assert!(matches!(FilterStatus::check("tcp port"), FilterStatus::Invalid(_)));
    }

    #[test]
    fn test_loopback_names() {
        assert!(looks_like_loopback("lo"));
        assert!(looks_like_loopback("lo0"));
        assert!(!looks_like_loopback("eth0"));
    }
}
