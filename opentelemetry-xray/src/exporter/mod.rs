pub(crate) mod emitter;
mod env;
pub(crate) mod filter;
pub(crate) mod model;
pub(crate) mod parser;

use emitter::{ApiEmitter, ConsoleEmitter, EmitterStrategy, SegmentEmitter, UdpDaemonEmitter};
use filter::{DefaultTraceFilter, TraceFilter};
use futures_util::future::join_all;
use model::document::Document;
use model::prune::Prune;
use model::Translator;
use opentelemetry::{otel_debug, otel_error, otel_warn};
use opentelemetry_http::HttpClient;
use opentelemetry_sdk::{
    error::{OTelSdkError, OTelSdkResult},
    trace::{SpanData, SpanExporter},
    Resource,
};
use parser::{
    CauseParser, DefaultCauseParser, DefaultHttpParser, DefaultIdParser, DefaultNameParser,
    DefaultOriginParser, HttpParser, IdParser, NameParser, OriginParser,
};
use std::collections::HashSet;
use std::sync::atomic;

/// Translates spans into X-Ray segment documents and hands them to every
/// configured [`SegmentEmitter`].
///
/// Spans whose trace id X-Ray would reject are dropped from the batch with a
/// warning. Documents refused by the [`TraceFilter`] are dropped silently.
#[derive(Debug)]
pub struct XrayExporter {
    translator: Translator,
    filter: Box<dyn TraceFilter>,
    emitters: Vec<Box<dyn SegmentEmitter>>,
    resource: Resource,
    is_shutdown: atomic::AtomicBool,
}

impl XrayExporter {
    /// Create a builder to configure this exporter.
    pub fn builder() -> XrayExporterBuilder {
        XrayExporterBuilder::default()
    }

    /// Translated, filtered and pruned documents, in span order.
    fn documents(&self, batch: &[SpanData]) -> Vec<Document> {
        let translated: Vec<Document> = batch
            .iter()
            .filter_map(
                |span| match self.translator.translate(span, &self.resource) {
                    Ok(document) => Some(document),
                    Err(err) => {
                        otel_warn!(
                            name: "XrayExporter.DocumentDropped",
                            span_id = span.span_context.span_id().to_string(),
                            error = err.to_string()
                        );
                        None
                    }
                },
            )
            .collect();

        let total = translated.len();
        let documents: Vec<Document> = translated
            .into_iter()
            .filter(|document| self.filter.do_filter(document))
            .map(|mut document| {
                document.prune();
                document
            })
            .collect();
        if documents.len() < total {
            otel_debug!(
                name: "XrayExporter.DocumentsFiltered",
                count = total - documents.len()
            );
        }
        documents
    }
}

impl SpanExporter for XrayExporter {
    async fn export(&self, batch: Vec<SpanData>) -> OTelSdkResult {
        if self.is_shutdown.load(atomic::Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }

        let documents = self.documents(&batch);
        if documents.is_empty() {
            return Ok(());
        }

        let results = join_all(
            self.emitters
                .iter()
                .map(|emitter| emitter.emit(&documents)),
        )
        .await;
        let failures: Vec<String> = results
            .into_iter()
            .filter_map(Result::err)
            .map(|err| err.to_string())
            .collect();

        if failures.is_empty() {
            otel_debug!(
                name: "XrayExporter.ExportSucceeded",
                documents = documents.len()
            );
            Ok(())
        } else {
            let error = failures.join("; ");
            otel_error!(name: "XrayExporter.ExportFailed", error = error.clone());
            Err(OTelSdkError::InternalFailure(error))
        }
    }

    fn shutdown(&mut self) -> OTelSdkResult {
        if self.is_shutdown.swap(true, atomic::Ordering::SeqCst) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        for emitter in &self.emitters {
            emitter.shutdown();
        }
        otel_debug!(name: "XrayExporter.Shutdown", emitters = self.emitters.len());
        Ok(())
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = resource.clone();
    }
}

/// Builder for [`XrayExporter`].
///
/// Every derivation step defaults to the crate's own implementation. Without
/// an explicit [`with_emitter`](Self::with_emitter) one emitter is created
/// from the [`EmitterStrategy`].
#[derive(Debug, Default)]
pub struct XrayExporterBuilder {
    emitters: Vec<Box<dyn SegmentEmitter>>,
    emitter_strategy: Option<EmitterStrategy>,
    client: Option<Box<dyn HttpClient>>,
    id_parser: Option<Box<dyn IdParser>>,
    cause_parser: Option<Box<dyn CauseParser>>,
    http_parser: Option<Box<dyn HttpParser>>,
    name_parser: Option<Box<dyn NameParser>>,
    origin_parser: Option<Box<dyn OriginParser>>,
    trace_filter: Option<Box<dyn TraceFilter>>,
    indexed_keys: HashSet<String>,
}

impl XrayExporterBuilder {
    /// Add an emitter. May be called repeatedly; every emitter receives every
    /// batch.
    pub fn with_emitter<T: SegmentEmitter + 'static>(mut self, emitter: T) -> Self {
        self.emitters.push(Box::new(emitter));
        self
    }

    /// Emitter to create when none is added explicitly. Defaults to
    /// [`EmitterStrategy::from_env`] when an HTTP client was supplied, and to
    /// [`EmitterStrategy::Udp`] otherwise.
    pub fn with_emitter_strategy(mut self, strategy: EmitterStrategy) -> Self {
        self.emitter_strategy = Some(strategy);
        self
    }

    /// Assign the client used by the [`EmitterStrategy::Api`] emitter.
    ///
    /// X-Ray only accepts SigV4-signed requests, so the client must sign them
    /// (or the emitter must post to a signing proxy).
    pub fn with_http_client<T: HttpClient + 'static>(mut self, client: T) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// Replace the trace id conversion.
    pub fn with_id_parser<T: IdParser + 'static>(mut self, parser: T) -> Self {
        self.id_parser = Some(Box::new(parser));
        self
    }

    /// Replace the exception extraction.
    pub fn with_cause_parser<T: CauseParser + 'static>(mut self, parser: T) -> Self {
        self.cause_parser = Some(Box::new(parser));
        self
    }

    /// Replace the HTTP block derivation.
    pub fn with_http_parser<T: HttpParser + 'static>(mut self, parser: T) -> Self {
        self.http_parser = Some(Box::new(parser));
        self
    }

    /// Replace the name derivation.
    pub fn with_name_parser<T: NameParser + 'static>(mut self, parser: T) -> Self {
        self.name_parser = Some(Box::new(parser));
        self
    }

    /// Replace the origin classification.
    pub fn with_origin_parser<T: OriginParser + 'static>(mut self, parser: T) -> Self {
        self.origin_parser = Some(Box::new(parser));
        self
    }

    /// Replace the filter deciding which documents are delivered.
    pub fn with_trace_filter<T: TraceFilter + 'static>(mut self, filter: T) -> Self {
        self.trace_filter = Some(Box::new(filter));
        self
    }

    /// Span attributes to report as (searchable) annotations. Non-scalar
    /// values are skipped.
    pub fn with_indexed_attributes<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.indexed_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Build the exporter.
    ///
    /// Fails if the default emitter cannot be created: a malformed
    /// `AWS_XRAY_DAEMON_ADDRESS`, or no HTTP client for the API emitter.
    pub fn build(self) -> Result<XrayExporter, Error> {
        let emitters = if self.emitters.is_empty() {
            let strategy = match (self.emitter_strategy, &self.client) {
                (Some(strategy), _) => strategy,
                (None, Some(_)) => EmitterStrategy::from_env(),
                (None, None) => EmitterStrategy::Udp,
            };
            vec![default_emitter(strategy, self.client)?]
        } else {
            self.emitters
        };

        Ok(XrayExporter {
            translator: Translator {
                id_parser: self
                    .id_parser
                    .unwrap_or_else(|| Box::new(DefaultIdParser::default())),
                cause_parser: self
                    .cause_parser
                    .unwrap_or_else(|| Box::new(DefaultCauseParser::default())),
                http_parser: self
                    .http_parser
                    .unwrap_or_else(|| Box::new(DefaultHttpParser)),
                name_parser: self
                    .name_parser
                    .unwrap_or_else(|| Box::new(DefaultNameParser)),
                origin_parser: self
                    .origin_parser
                    .unwrap_or_else(|| Box::new(DefaultOriginParser)),
                indexed_keys: self.indexed_keys,
            },
            filter: self
                .trace_filter
                .unwrap_or_else(|| Box::new(DefaultTraceFilter::default())),
            emitters,
            resource: Resource::builder_empty().build(),
            is_shutdown: atomic::AtomicBool::new(false),
        })
    }
}

fn default_emitter(
    strategy: EmitterStrategy,
    client: Option<Box<dyn HttpClient>>,
) -> Result<Box<dyn SegmentEmitter>, Error> {
    Ok(match strategy {
        EmitterStrategy::Udp => Box::new(UdpDaemonEmitter::from_env()?),
        EmitterStrategy::Api => {
            Box::new(ApiEmitter::from_boxed(client.ok_or(Error::NoHttpClient)?)?)
        }
        EmitterStrategy::Console => Box::new(ConsoleEmitter::default()),
    })
}

/// Wrap type for errors from this crate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The trace id cannot be converted into an X-Ray trace id.
    #[error("invalid trace id {trace_id}: {reason}")]
    InvalidTraceId {
        /// The offending trace id, as 32 hex characters.
        trace_id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An emitter was given an unusable configuration.
    #[error("invalid {config_name} for {emitter_name} emitter: {reason}")]
    ConfigError {
        /// Emitter being configured.
        emitter_name: &'static str,
        /// Setting that is malformed.
        config_name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The API emitter was requested without an HTTP client.
    #[error("http client must be set with `with_http_client` to post to the X-Ray API")]
    NoHttpClient,

    /// The emitter has been shut down.
    #[error("emitter is shut down")]
    AlreadyShutdown,

    /// A document could not be serialized.
    #[error("serialization failed with {0}")]
    Serialization(#[from] serde_json::Error),

    /// Socket errors from the daemon emitter.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Http requests failed
    #[error("http request failed with {0}")]
    RequestFailed(#[from] http::Error),

    /// The uri provided is invalid
    #[error("invalid uri")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// The X-Ray API could not be reached or answered with an error status.
    #[error("http error: {0}")]
    Http(String),

    /// Other errors
    #[error("export error: {0}")]
    Other(String),
}
