//! # X-Ray PutTraceSegments client
use super::SegmentEmitter;
use crate::exporter::env;
use crate::exporter::model::document::Document;
use crate::exporter::Error;
use async_trait::async_trait;
use bytes::Bytes;
use http::{
    header::{CONTENT_TYPE, USER_AGENT},
    Method, Request, Uri,
};
use opentelemetry::otel_warn;
use opentelemetry_http::{HttpClient, ResponseExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic;

/// Sent with every request, and recognized by the default trace filter so the
/// emitter's own calls are not traced.
const USER_AGENT_VALUE: &str = concat!("opentelemetry-xray/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct PutTraceSegmentsRequest {
    #[serde(rename = "TraceSegmentDocuments")]
    trace_segment_documents: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PutTraceSegmentsResponse {
    #[serde(rename = "UnprocessedTraceSegments", default)]
    unprocessed_trace_segments: Vec<UnprocessedTraceSegment>,
}

#[derive(Debug, Deserialize)]
struct UnprocessedTraceSegment {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "ErrorCode")]
    error_code: Option<String>,
}

/// Posts each batch to the X-Ray `PutTraceSegments` API.
///
/// Segments the service reports as unprocessed are logged, not treated as
/// failures. Requests are sent unsigned, so the client is expected to add
/// SigV4 authentication (or the endpoint to be a signing proxy).
#[derive(Debug)]
pub struct ApiEmitter {
    client: Box<dyn HttpClient>,
    endpoint: Uri,
    is_shutdown: atomic::AtomicBool,
}

impl ApiEmitter {
    /// Emitter posting to the endpoint of the region in `AWS_REGION`,
    /// `AWS_DEFAULT_REGION` or `us-east-1`, in that order.
    pub fn new<T: HttpClient + 'static>(client: T) -> Result<Self, Error> {
        Self::from_boxed(Box::new(client))
    }

    pub(crate) fn from_boxed(client: Box<dyn HttpClient>) -> Result<Self, Error> {
        Ok(ApiEmitter {
            client,
            endpoint: regional_endpoint(&env::get_region())?,
            is_shutdown: atomic::AtomicBool::new(false),
        })
    }

    /// Post to `endpoint` instead, e.g. a VPC endpoint or a signing proxy.
    pub fn with_endpoint<T: AsRef<str>>(mut self, endpoint: T) -> Result<Self, Error> {
        self.endpoint = endpoint.as_ref().parse()?;
        Ok(self)
    }
}

fn regional_endpoint(region: &str) -> Result<Uri, Error> {
    Ok(format!("https://xray.{region}.amazonaws.com/TraceSegments").parse()?)
}

#[async_trait]
impl SegmentEmitter for ApiEmitter {
    async fn emit(&self, documents: &[Document]) -> Result<(), Error> {
        if self.is_shutdown.load(atomic::Ordering::SeqCst) {
            return Err(Error::AlreadyShutdown);
        }

        let body = PutTraceSegmentsRequest {
            trace_segment_documents: documents
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<_, _>>()?,
        };
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .body(Bytes::from(serde_json::to_vec(&body)?))?;

        let response = self
            .client
            .send_bytes(request)
            .await
            .and_then(ResponseExt::error_for_status)
            .map_err(|err| Error::Http(err.to_string()))?;

        // An empty or unexpected body carries no rejections.
        let result: PutTraceSegmentsResponse =
            serde_json::from_slice(response.body()).unwrap_or_default();
        let unprocessed = result.unprocessed_trace_segments;
        if !unprocessed.is_empty() {
            otel_warn!(
                name: "ApiEmitter.UnprocessedSegments",
                count = unprocessed.len(),
                segments = unprocessed
                    .iter()
                    .map(|segment| {
                        format!(
                            "{}:{}",
                            segment.id.as_deref().unwrap_or("?"),
                            segment.error_code.as_deref().unwrap_or("?")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(",")
            );
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.is_shutdown.store(true, atomic::Ordering::SeqCst);
    }
}
