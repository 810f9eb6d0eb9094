use std::sync::{Mutex, PoisonError};

use pcap::{BpfProgram, Capture, Linktype};

use crate::error::FilterError;
use crate::packet::LinkType;

// libpcap before 1.8 keeps its filter parser state in globals
static COMPILE_LOCK: Mutex<()> = Mutex::new(());

/// A compiled BPF program.
pub struct CompiledFilter {
    expression: String,
    program: BpfProgram,
}

impl CompiledFilter {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Runs the program over a frame, as the kernel would on capture.
    pub fn matches(&self, frame: &[u8]) -> bool {
        self.program.filter(frame)
    }

    pub fn instruction_count(&self) -> usize {
        self.program.get_instructions().len()
    }
}

impl std::fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("expression", &self.expression)
            .field("instructions", &self.instruction_count())
            .finish()
    }
}

/// Checks a filter expression against Ethernet framing. Compiles against a
/// dead handle, so no interface is touched.
///
/// An empty (or all-whitespace) expression means "no filtering" and is
/// always valid.
pub fn validate(expression: &str) -> Result<(), FilterError> {
    validate_for(expression, LinkType::Ethernet)
}

pub fn validate_for(expression: &str, link_type: LinkType) -> Result<(), FilterError> {
    if expression.trim().is_empty() {
        return Ok(());
    }
    compile(expression, link_type).map(|_| ())
}

pub fn compile(expression: &str, link_type: LinkType) -> Result<CompiledFilter, FilterError> {
    let reject = |reason: String| FilterError {
        expression: expression.to_string(),
        reason,
    };

    let _guard = COMPILE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    let dead = Capture::dead(Linktype(link_type.dlt())).map_err(|e| reject(e.to_string()))?;
    let program = dead
        .compile(expression, true)
        .map_err(|e| reject(e.to_string()))?;

    Ok(CompiledFilter {
        expression: expression.to_string(),
        program,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::testutil::{tcp_frame, udp_dns_frame};

    #[test]
    fn test_empty_expression_is_valid() {
        assert!(validate("").is_ok());
        assert!(validate("   ").is_ok());
    }

    #[test]
    fn test_valid_expressions() {
        for expression in ["tcp", "tcp port 80", "udp and port 53", "host 10.0.0.1", "arp or icmp"] {
            assert!(validate(expression).is_ok(), "{} should compile", expression);
        }
    }

    #[test]
    fn test_malformed_expressions() {
        for expression in ["tcp port", "port 99999", "host", "((tcp)", "not-a-protocol 12"] {
            let err = validate(expression).unwrap_err();
            assert_eq!(err.expression, expression);
            assert!(!err.reason.is_empty());
        }
    }

    #[test]
    fn test_compiled_filter_matches_frames() {
        let filter = compile("tcp port 80", LinkType::Ethernet).unwrap();
        assert!(filter.matches(&tcp_frame(51000, 80)));
        assert!(!filter.matches(&udp_dns_frame()));
        assert!(!filter.matches(&[0xde, 0xad, 0xbe, 0xef]));
        assert!(filter.instruction_count() > 0);
    }
}
