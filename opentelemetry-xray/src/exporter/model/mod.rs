use crate::exporter::parser::{CauseParser, HttpParser, IdParser, NameParser, OriginParser};
use crate::exporter::Error;
use document::Document;
use opentelemetry_sdk::trace::SpanData;
use opentelemetry_sdk::Resource;
use span::EnrichedSpan;
use std::collections::HashSet;

pub(crate) mod attributes;
pub mod document;
pub(crate) mod prune;
pub(crate) mod semconv;
pub(crate) mod span;

/// Assembles one [`Document`] per span from the configured parsers.
#[derive(Debug)]
pub(crate) struct Translator {
    pub(crate) id_parser: Box<dyn IdParser>,
    pub(crate) cause_parser: Box<dyn CauseParser>,
    pub(crate) http_parser: Box<dyn HttpParser>,
    pub(crate) name_parser: Box<dyn NameParser>,
    pub(crate) origin_parser: Box<dyn OriginParser>,
    pub(crate) indexed_keys: HashSet<String>,
}

impl Translator {
    /// Converts a finished span into an unpruned document.
    ///
    /// Fails only when the span's trace id, or one of its links' trace ids,
    /// is not accepted by the id parser.
    pub(crate) fn translate(&self, span: &SpanData, resource: &Resource) -> Result<Document, Error> {
        let enriched = EnrichedSpan::new(span, resource);
        let id_parser = self.id_parser.as_ref();

        Ok(Document::builder()
            .id(enriched.span_id())
            .name(self.name_parser.name(span, resource))
            .start_time(enriched.start_time())
            .end_time(Some(enriched.end_time()))
            .trace_id(Some(enriched.trace_id(id_parser)?))
            .parent_id(enriched.parent_id())
            .origin(self.origin_parser.origin(resource))
            .namespace(enriched.namespace())
            .error(enriched.is_error())
            .fault(enriched.is_fault())
            .throttle(enriched.is_throttled())
            .user(enriched.user())
            .http(self.http_parser.http(span))
            .aws(Some(enriched.aws()))
            .sql(enriched.sql())
            .cause(self.cause_parser.cause(span))
            .annotations(enriched.annotations(&self.indexed_keys))
            .metadata(enriched.metadata())
            .service(Some(enriched.service()))
            .segment_type(enriched.segment_type())
            .links(enriched.links(id_parser)?)
            .build())
    }
}
