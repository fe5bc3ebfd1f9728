//! Derivation of individual document fields.
//!
//! Each concern is a small trait with one default implementation, so that a
//! deployment with different attribute conventions can replace a single step
//! through [`XrayExporterBuilder`](crate::XrayExporterBuilder).
use crate::exporter::model::document::{Cause, Http};
use crate::exporter::Error;
use opentelemetry_sdk::trace::SpanData;
use opentelemetry_sdk::Resource;
use std::fmt::Debug;

mod cause;
mod http;
mod id;
mod name;
mod origin;

pub use cause::DefaultCauseParser;
pub use http::DefaultHttpParser;
pub use id::DefaultIdParser;
pub use name::DefaultNameParser;
pub(crate) use origin::{detect_platform, Platform};
pub use origin::DefaultOriginParser;

/// Converts OpenTelemetry trace ids into X-Ray trace ids.
pub trait IdParser: Debug + Send + Sync {
    /// Converts a 32 hex character trace id into `1-<8 hex>-<24 hex>` form.
    fn parse_id(&self, trace_id: &str) -> Result<String, Error>;
}

/// Extracts recorded exceptions.
pub trait CauseParser: Debug + Send + Sync {
    /// Builds the `cause` block, or `None` if the span recorded no exception.
    fn cause(&self, span: &SpanData) -> Option<Cause>;
}

/// Derives the HTTP request/response block.
pub trait HttpParser: Debug + Send + Sync {
    /// Builds the `http` block, or `None` if the span carries no HTTP or
    /// network attributes.
    fn http(&self, span: &SpanData) -> Option<Http>;
}

/// Derives the document name.
pub trait NameParser: Debug + Send + Sync {
    /// Always returns a non-empty name.
    fn name(&self, span: &SpanData, resource: &Resource) -> String;
}

/// Classifies the compute platform the span was recorded on.
pub trait OriginParser: Debug + Send + Sync {
    /// Returns the X-Ray origin, e.g. `AWS::EC2::Instance`.
    fn origin(&self, resource: &Resource) -> Option<String>;
}

#[cfg(test)]
pub(crate) mod tests {
    use opentelemetry::trace::{
        SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState,
    };
    use opentelemetry::{InstrumentationScope, KeyValue};
    use opentelemetry_sdk::trace::{SpanData, SpanEvents, SpanLinks};
    use std::borrow::Cow;
    use std::time::{Duration, SystemTime};

    /// A finished span with the given kind and attributes, started "now".
    pub(crate) fn span(name: &'static str, kind: SpanKind, attributes: Vec<KeyValue>) -> SpanData {
        let start_time = SystemTime::now();
        SpanData {
            span_context: SpanContext::new(
                TraceId::from(0x5759e988_bd862e3f_e1be46a9_94272793_u128),
                SpanId::from(0x53995c3f42cd8ad8_u64),
                TraceFlags::SAMPLED,
                false,
                TraceState::default(),
            ),
            parent_span_id: SpanId::INVALID,
            parent_span_is_remote: false,
            span_kind: kind,
            name: Cow::Borrowed(name),
            start_time,
            end_time: start_time + Duration::from_millis(25),
            attributes,
            dropped_attributes_count: 0,
            events: SpanEvents::default(),
            links: SpanLinks::default(),
            status: Status::Unset,
            instrumentation_scope: InstrumentationScope::builder("opentelemetry-xray-tests").build(),
        }
    }
}
