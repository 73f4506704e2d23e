//! W3C Trace Context (`traceparent`) support.
//!
//! # Responsibilities
//! - Render the `traceparent` header for outgoing calls
//! - Parse incoming `traceparent` headers into a remote parent context
//! - Generate fresh sampled trace contexts for tooling
//!
//! # Design Decisions
//! - Only version `00` is produced; unknown versions are rejected on parse
//! - Invalid headers are ignored (the request starts a new trace)

use std::fmt;
use std::str::FromStr;

use opentelemetry::trace::{
    SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
};
use opentelemetry::Context;
use rand::RngCore;
use thiserror::Error;

pub const TRACEPARENT_HEADER: &str = "traceparent";

const VERSION: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceParentError {
    #[error("expected 4 dash-separated fields")]
    FieldCount,
    #[error("unsupported version '{0}'")]
    Version(String),
    #[error("invalid trace id")]
    TraceId,
    #[error("invalid span id")]
    SpanId,
    #[error("invalid trace flags")]
    Flags,
}

/// The fields of a `traceparent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceParent {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub sampled: bool,
}

impl TraceParent {
    pub fn from_span_context(context: &SpanContext) -> Self {
        Self {
            trace_id: context.trace_id(),
            span_id: context.span_id(),
            sampled: context.is_sampled(),
        }
    }

    /// A new root context with random ids, marked sampled.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();

        let mut trace_id = [0u8; 16];
        let mut span_id = [0u8; 8];
        // All-zero ids are invalid; retry is astronomically unlikely
        while trace_id == [0u8; 16] {
            rng.fill_bytes(&mut trace_id);
        }
        while span_id == [0u8; 8] {
            rng.fill_bytes(&mut span_id);
        }

        Self {
            trace_id: TraceId::from_bytes(trace_id),
            span_id: SpanId::from_bytes(span_id),
            sampled: true,
        }
    }

    pub fn trace_flags(&self) -> TraceFlags {
        if self.sampled {
            TraceFlags::SAMPLED
        } else {
            TraceFlags::default()
        }
    }

    /// A context whose active span is this remote parent.
    pub fn to_context(&self) -> Context {
        let span_context = SpanContext::new(
            self.trace_id,
            self.span_id,
            self.trace_flags(),
            true,
            TraceState::default(),
        );
        Context::new().with_remote_span_context(span_context)
    }

    /// Parse a header value, ignoring surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self, TraceParentError> {
        let parts: Vec<&str> = value.trim().split('-').collect();
        let [version, trace_id, span_id, flags] = parts.as_slice() else {
            return Err(TraceParentError::FieldCount);
        };

        if *version != "00" {
            return Err(TraceParentError::Version(version.to_string()));
        }

        let trace_id = parse_hex_id(trace_id, 32)
            .and_then(|s| TraceId::from_hex(s).ok())
            .filter(|id| *id != TraceId::INVALID)
            .ok_or(TraceParentError::TraceId)?;
        let span_id = parse_hex_id(span_id, 16)
            .and_then(|s| SpanId::from_hex(s).ok())
            .filter(|id| *id != SpanId::INVALID)
            .ok_or(TraceParentError::SpanId)?;
        let flags = parse_hex_id(flags, 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or(TraceParentError::Flags)?;

        Ok(Self {
            trace_id,
            span_id,
            sampled: flags & 0x01 == 0x01,
        })
    }
}

/// Accept only lowercase hex of the exact width.
fn parse_hex_id(s: &str, width: usize) -> Option<&str> {
    let valid = s.len() == width
        && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    valid.then_some(s)
}

impl fmt::Display for TraceParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}-{}-{}-{}",
            VERSION,
            self.trace_id,
            self.span_id,
            if self.sampled { "01" } else { "00" }
        )
    }
}

impl FromStr for TraceParent {
    type Err = TraceParentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn test_format() {
        let parent = TraceParent {
            trace_id: TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            span_id: SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            sampled: true,
        };
        assert_eq!(parent.to_string(), SAMPLE);

        let unsampled = TraceParent { sampled: false, ..parent };
        assert!(unsampled.to_string().ends_with("-00"));
    }

    #[test]
    fn test_parse_valid_header() {
        let parent: TraceParent = SAMPLE.parse().unwrap();
        assert!(parent.sampled);
        assert_eq!(parent.to_string(), SAMPLE);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(TraceParent::parse("garbage"), Err(TraceParentError::FieldCount));
        assert_eq!(
            TraceParent::parse("ff-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
            Err(TraceParentError::Version("ff".into()))
        );
        assert_eq!(
            TraceParent::parse("00-00000000000000000000000000000000-00f067aa0ba902b7-01"),
            Err(TraceParentError::TraceId)
        );
        assert_eq!(
            TraceParent::parse("00-4BF92F3577B34DA6A3CE929D0E0E4736-00f067aa0ba902b7-01"),
            Err(TraceParentError::TraceId)
        );
        assert_eq!(
            TraceParent::parse("00-4bf92f3577b34da6a3ce929d0e0e4736-0000000000000000-01"),
            Err(TraceParentError::SpanId)
        );
        assert_eq!(
            TraceParent::parse("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-1"),
            Err(TraceParentError::Flags)
        );
    }

    #[test]
    fn test_remote_context() {
        let parent: TraceParent = SAMPLE.parse().unwrap();
        let cx = parent.to_context();
        let span = cx.span();
        let span_context = span.span_context();

        assert!(span_context.is_remote());
        assert!(span_context.is_sampled());
        assert_eq!(TraceParent::from_span_context(span_context), parent);
    }

    #[test]
    fn test_generate_is_valid_and_unique() {
        let a = TraceParent::generate();
        let b = TraceParent::generate();
        assert_ne!(a.trace_id, b.trace_id);
        assert_eq!(TraceParent::parse(&a.to_string()), Ok(a));
    }
}
