use super::CauseParser;
use crate::exporter::model::attributes::{non_empty, string};
use crate::exporter::model::document::{Cause, Exception, StackFrame};
use once_cell::sync::Lazy;
use opentelemetry::trace::SpanKind;
use opentelemetry_sdk::trace::{IdGenerator, RandomIdGenerator, SpanData};
use opentelemetry_semantic_conventions::attribute::{
    EXCEPTION_MESSAGE, EXCEPTION_STACKTRACE, EXCEPTION_TYPE,
};
use regex::Regex;

/// Name of the span event recorded by `Span::record_error` and friends.
const EXCEPTION_EVENT_NAME: &str = "exception";

/// Matches `at label (path:line:column)` and `at path:line:column` frames.
static STACK_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*at\s+(?:(?P<label>[^()]+)\s+\((?P<path>[^:]+):(?P<line>\d+):\d+\)|(?P<bare_path>[^:]+):(?P<bare_line>\d+):\d+)$",
    )
    .expect("stack frame pattern is a valid regex")
});

/// Default [`CauseParser`].
///
/// Every `exception` event becomes one exception record with a freshly
/// generated 16 hex character id.
#[derive(Debug)]
pub struct DefaultCauseParser {
    id_generator: Box<dyn IdGenerator>,
}

impl Default for DefaultCauseParser {
    fn default() -> Self {
        DefaultCauseParser {
            id_generator: Box::new(RandomIdGenerator::default()),
        }
    }
}

impl DefaultCauseParser {
    /// Use `id_generator`'s span ids as exception ids.
    pub fn with_id_generator<T: IdGenerator + 'static>(id_generator: T) -> Self {
        DefaultCauseParser {
            id_generator: Box::new(id_generator),
        }
    }
}

impl CauseParser for DefaultCauseParser {
    fn cause(&self, span: &SpanData) -> Option<Cause> {
        let remote = matches!(span.span_kind, SpanKind::Client | SpanKind::Producer);
        let exceptions = span
            .events
            .events
            .iter()
            .filter(|event| event.name == EXCEPTION_EVENT_NAME)
            .map(|event| Exception {
                id: self.id_generator.new_span_id().to_string(),
                message: string(&event.attributes, EXCEPTION_MESSAGE),
                exception_type: string(&event.attributes, EXCEPTION_TYPE),
                remote,
                cause: None,
                stack: string(&event.attributes, EXCEPTION_STACKTRACE)
                    .map(|stacktrace| parse_stack(&stacktrace)),
            })
            .collect::<Vec<_>>();

        if exceptions.is_empty() {
            None
        } else {
            Some(Cause {
                exceptions: non_empty(exceptions),
            })
        }
    }
}

/// Parses each line of a stack trace, dropping lines that are not frames.
fn parse_stack(stacktrace: &str) -> Vec<StackFrame> {
    stacktrace
        .split('\n')
        .filter_map(|line| STACK_FRAME.captures(line.trim_end_matches('\r')))
        .map(|frame| {
            let text = |name: &str| frame.name(name).map(|m| m.as_str().to_string());
            StackFrame {
                label: text("label"),
                path: text("path").or_else(|| text("bare_path")),
                line: frame
                    .name("line")
                    .or_else(|| frame.name("bare_line"))
                    .and_then(|line| line.as_str().parse().ok()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::parser::tests::span;
    use opentelemetry::trace::{Event, SpanId, TraceId};
    use opentelemetry::KeyValue;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::SystemTime;

    #[derive(Debug, Default)]
    struct SequentialIdGenerator(AtomicU64);

    impl IdGenerator for SequentialIdGenerator {
        fn new_trace_id(&self) -> TraceId {
            TraceId::from(u128::from(self.0.fetch_add(1, Ordering::SeqCst) + 1))
        }

        fn new_span_id(&self) -> SpanId {
            SpanId::from(self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    const STACK: &str = "TypeError: boom\n    at Object.handler (/var/task/index.js:12:34)\n    at /var/task/node_modules/lib.js:5:6\n    at processTicksAndRejections (node:internal/process/task_queues:95:5)\n    garbage line";

    fn exception_event(message: &'static str, stack: Option<&'static str>) -> Event {
        let mut attributes = vec![
            KeyValue::new(EXCEPTION_TYPE, "TypeError"),
            KeyValue::new(EXCEPTION_MESSAGE, message),
        ];
        if let Some(stack) = stack {
            attributes.push(KeyValue::new(EXCEPTION_STACKTRACE, stack));
        }
        Event::new("exception", SystemTime::now(), attributes, 0)
    }

    #[test]
    fn test_no_exception_events() {
        let mut span = span("work", SpanKind::Internal, vec![]);
        span.events
            .events
            .push(Event::new("retry", SystemTime::now(), vec![], 0));
        assert_eq!(DefaultCauseParser::default().cause(&span), None);
    }

    #[test]
    fn test_one_record_per_exception_event() {
        let mut span = span("call", SpanKind::Client, vec![]);
        span.events.events.push(exception_event("first", Some(STACK)));
        span.events
            .events
            .push(Event::new("log", SystemTime::now(), vec![], 0));
        span.events.events.push(exception_event("second", None));

        let cause = DefaultCauseParser::with_id_generator(SequentialIdGenerator::default())
            .cause(&span)
            .unwrap();
        let exceptions = cause.exceptions.unwrap();

        assert_eq!(exceptions.len(), 2);
        assert_eq!(exceptions[0].id, "0000000000000001");
        assert_eq!(exceptions[1].id, "0000000000000002");
        assert_eq!(exceptions[0].message.as_deref(), Some("first"));
        assert_eq!(exceptions[0].exception_type.as_deref(), Some("TypeError"));
        assert!(exceptions.iter().all(|e| e.remote));
        assert!(exceptions.iter().all(|e| e.cause.is_none()));
        assert_eq!(exceptions[1].stack, None);

        assert_eq!(
            exceptions[0].stack.as_deref(),
            Some(
                &[
                    StackFrame {
                        label: Some("Object.handler".into()),
                        path: Some("/var/task/index.js".into()),
                        line: Some(12),
                    },
                    StackFrame {
                        label: None,
                        path: Some("/var/task/node_modules/lib.js".into()),
                        line: Some(5),
                    },
                ][..]
            )
        );
    }

    #[test]
    fn test_random_ids_are_hex() {
        let mut span = span("work", SpanKind::Server, vec![]);
        for _ in 0..3 {
            span.events.events.push(exception_event("boom", None));
        }
        let exceptions = DefaultCauseParser::default()
            .cause(&span)
            .and_then(|cause| cause.exceptions)
            .unwrap();

        let hex = Regex::new("^[0-9a-f]{16}$").unwrap();
        assert_eq!(exceptions.len(), 3);
        assert!(exceptions.iter().all(|e| hex.is_match(&e.id)));
        assert!(exceptions.iter().all(|e| !e.remote));
        assert_ne!(exceptions[0].id, exceptions[1].id);
    }

    #[test]
    fn test_frame_with_colon_in_path_is_dropped() {
        let frames = parse_stack(STACK);
        assert_eq!(frames.len(), 2);
        assert!(parse_stack("no frames here").is_empty());
    }
}
