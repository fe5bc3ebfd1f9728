//! # OpenTelemetry AWS X-Ray Exporter
//!
//! Translates finished OpenTelemetry spans into [AWS X-Ray segment documents]
//! and hands them to one or more delivery sinks ("emitters"): the local X-Ray
//! daemon over UDP, the `PutTraceSegments` API over HTTP, or stdout.
//!
//! The translation reconciles the legacy and the stable HTTP/network semantic
//! conventions, the AWS SDK instrumentation attributes and the resource
//! detectors' platform attributes into one normalized document per span.
//!
//! [AWS X-Ray segment documents]: https://docs.aws.amazon.com/xray/latest/devguide/xray-api-segmentdocuments.html
//!
//! ## Quickstart
//!
//! ```no_run
//! use opentelemetry::global;
//! use opentelemetry::trace::Tracer;
//! use opentelemetry_sdk::trace::SdkTracerProvider;
//! use opentelemetry_xray::{EmitterStrategy, XrayExporter, XrayIdGenerator};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
//!     let exporter = XrayExporter::builder()
//!         .with_emitter_strategy(EmitterStrategy::Udp)
//!         .build()?;
//!
//!     let provider = SdkTracerProvider::builder()
//!         .with_id_generator(XrayIdGenerator::default())
//!         .with_simple_exporter(exporter)
//!         .build();
//!     global::set_tracer_provider(provider.clone());
//!
//!     global::tracer("my-component").in_span("doing_work", |_cx| {
//!         // Traced app logic here...
//!     });
//!
//!     provider.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! X-Ray rejects trace ids whose first 32 bits are not a recent epoch
//! timestamp, so tracer providers feeding this exporter should use
//! [`XrayIdGenerator`] (or another time-prefixed generator).
//!
//! ## Choosing an emitter
//!
//! Without an explicit emitter the builder consults its
//! [`EmitterStrategy`]. Documents go to the daemon at
//! `AWS_XRAY_DAEMON_ADDRESS` unless an [`HttpClient`] was supplied, in which
//! case [`EmitterStrategy::from_env`] decides: the daemon inside AWS Lambda
//! (`AWS_LAMBDA_FUNCTION_NAME` set), the regional X-Ray API everywhere else.
//! X-Ray only accepts SigV4-signed API requests, so that client has to sign
//! them.
//!
//! ```no_run
//! use opentelemetry_xray::{ConsoleEmitter, UdpDaemonEmitter, XrayExporter};
//!
//! # fn main() -> Result<(), opentelemetry_xray::Error> {
//! let exporter = XrayExporter::builder()
//!     .with_emitter(UdpDaemonEmitter::with_address("127.0.0.1:2000")?)
//!     .with_emitter(ConsoleEmitter::default())
//!     .with_indexed_attributes(["tenant.id", "order.priority"])
//!     .build()?;
//! # drop(exporter);
//! # Ok(())
//! # }
//! ```
//!
//! ## Customizing the translation
//!
//! Every derivation step sits behind a trait ([`IdParser`], [`CauseParser`],
//! [`HttpParser`], [`NameParser`], [`OriginParser`], [`TraceFilter`]) with a
//! single default implementation, so any of them can be swapped through the
//! builder.
//!
//! [`HttpClient`]: opentelemetry_http::HttpClient
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod exporter;
mod id_generator;

pub use exporter::{
    emitter::{
        ApiEmitter, ConsoleEmitter, EmitterStrategy, SegmentEmitter, UdpDaemonEmitter,
        DEFAULT_DAEMON_ADDRESS,
    },
    filter::{DefaultTraceFilter, TraceFilter},
    model::document,
    parser::{
        CauseParser, DefaultCauseParser, DefaultHttpParser, DefaultIdParser, DefaultNameParser,
        DefaultOriginParser, HttpParser, IdParser, NameParser, OriginParser,
    },
    Error, XrayExporter, XrayExporterBuilder,
};
pub use id_generator::XrayIdGenerator;
