//! Parse events and the sinks that receive them.
//!
//! A ``ChunkDecoder`` reports everything noteworthy that happens while walking a file (clamped
//! sizes, broken tails, chunks that failed to decode) to a ``ParseObserver`` handed to it at
//! construction. Nothing is global, so concurrent parses never share a sink by accident.
use std::fmt::{Display, Formatter};

use crate::log;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// A well-formed chunk header was read at ``offset``; ``size`` is the effective body size.
    ChunkFound {
        tag: String,
        offset: usize,
        size: usize,
    },
    /// An odd declared size was rounded up by one pad byte.
    OddSizeRounded { tag: String, declared: u32 },
    /// A declared size larger than the remaining input was cut down to what is left.
    SizeClamped {
        tag: String,
        declared: usize,
        available: usize,
    },
    /// The rest of the input was swallowed into a single broken record.
    Broken { offset: usize, remaining: usize },
    /// A chunk was framed correctly but its body could not be decoded.
    ChunkFailed { tag: String, reason: String },
    /// A ``data`` chunk appeared before any ``fmt `` chunk with a usable byte rate.
    MissingFormat { offset: usize },
}

impl ParseEvent {
    /// Events that point at damaged or unusual input rather than normal progress.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ParseEvent::Broken { .. } | ParseEvent::ChunkFailed { .. } | ParseEvent::MissingFormat { .. }
        )
    }
}

impl Display for ParseEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseEvent::ChunkFound { tag, offset, size } => {
                write!(f, "chunk '{}' at offset {} with {} bytes", tag, offset, size)
            }
            ParseEvent::OddSizeRounded { tag, declared } => {
                write!(f, "chunk '{}' has odd size {}, rounding up", tag, declared)
            }
            ParseEvent::SizeClamped {
                tag,
                declared,
                available,
            } => write!(
                f,
                "chunk '{}' size {} too large, using remaining bytes {}",
                tag, declared, available
            ),
            ParseEvent::Broken { offset, remaining } => write!(
                f,
                "broken chunk at offset {}, consuming the remaining {} bytes",
                offset, remaining
            ),
            ParseEvent::ChunkFailed { tag, reason } => {
                write!(f, "failed to decode chunk '{}': {}", tag, reason)
            }
            ParseEvent::MissingFormat { offset } => write!(
                f,
                "data chunk at offset {} has no preceding format chunk, duration unknown",
                offset
            ),
        }
    }
}

/// Receives ``ParseEvent``s from a decoder. Implemented for any ``FnMut(&ParseEvent)``.
pub trait ParseObserver {
    fn on_event(&mut self, event: &ParseEvent);
}

impl<F> ParseObserver for F
where
    F: FnMut(&ParseEvent),
{
    fn on_event(&mut self, event: &ParseEvent) {
        self(event)
    }
}

/// Discards every event. The decoder default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ParseObserver for NoopObserver {
    fn on_event(&mut self, _event: &ParseEvent) {}
}

/// Forwards events to the ``log`` crate when the ``logging`` feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ParseObserver for LogObserver {
    #[allow(unused_variables)]
    fn on_event(&mut self, event: &ParseEvent) {
        if event.is_warning() {
            log!(log::Level::Warn, "{}", event);
        } else {
            log!(log::Level::Debug, "{}", event);
        }
    }
}

#[cfg(test)]
mod observer_tests {
    use super::*;

    #[test]
    fn closures_observe_events() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &ParseEvent| seen.push(event.clone());
            observer.on_event(&ParseEvent::MissingFormat { offset: 12 });
            observer.on_event(&ParseEvent::Broken {
                offset: 20,
                remaining: 3,
            });
        }
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(ParseEvent::is_warning));
    }

    #[test]
    fn events_describe_themselves() {
        let event = ParseEvent::SizeClamped {
            tag: "data".into(),
            declared: 100,
            available: 10,
        };
        assert!(!event.is_warning());
        assert_eq!(
            event.to_string(),
            "chunk 'data' size 100 too large, using remaining bytes 10"
        );
        LogObserver.on_event(&event);
        NoopObserver.on_event(&event);
    }
}
