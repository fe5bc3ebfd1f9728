use crate::exporter::model::document::Document;
use std::fmt::Debug;

/// User agents of X-Ray's own clients. Their calls are instrumentation noise.
const DEFAULT_SIGNATURES: [&str; 3] = ["aws-sdk-js", "aws-sdk-rust", "opentelemetry-xray/"];

/// Decides which documents are delivered.
pub trait TraceFilter: Debug + Send + Sync {
    /// Returns `true` to keep the document.
    fn do_filter(&self, document: &Document) -> bool;
}

/// Drops documents whose request user agent contains one of a set of
/// signatures, by default those of the AWS SDKs and of this crate's own API
/// client.
#[derive(Clone, Debug)]
pub struct DefaultTraceFilter {
    signatures: Vec<String>,
}

impl Default for DefaultTraceFilter {
    fn default() -> Self {
        DefaultTraceFilter::with_signatures(DEFAULT_SIGNATURES)
    }
}

impl DefaultTraceFilter {
    /// Filter with the default signatures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter dropping user agents that contain any of `signatures`.
    pub fn with_signatures<I, S>(signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DefaultTraceFilter {
            signatures: signatures.into_iter().map(Into::into).collect(),
        }
    }
}

impl TraceFilter for DefaultTraceFilter {
    fn do_filter(&self, document: &Document) -> bool {
        let user_agent = document
            .http
            .as_ref()
            .and_then(|http| http.request.as_ref())
            .and_then(|request| request.user_agent.as_deref());
        match user_agent {
            Some(user_agent) => !self
                .signatures
                .iter()
                .any(|signature| user_agent.contains(signature.as_str())),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::model::document::{Http, Request};

    fn document(user_agent: Option<&str>) -> Document {
        Document::builder()
            .id("53995c3f42cd8ad8".to_string())
            .name("GET /".to_string())
            .start_time(1_700_000_000.0)
            .http(Some(Http {
                request: Some(Request {
                    user_agent: user_agent.map(str::to_string),
                    ..Default::default()
                }),
                response: None,
            }))
            .build()
    }

    fn filter_test_data() -> Vec<(Option<&'static str>, bool)> {
        vec![
            (None, true),
            (Some("Mozilla/5.0"), true),
            (Some("aws-sdk-js/2.1001.0 linux/v18"), false),
            (Some("aws-sdk-rust/1.1.1 os/linux lang/rust/1.80.0"), false),
            (Some("opentelemetry-xray/0.1.0"), false),
            (Some("curl/8.4.0"), true),
        ]
    }

    #[test]
    fn test_default_signatures() {
        let filter = DefaultTraceFilter::new();
        for (user_agent, expected) in filter_test_data() {
            assert_eq!(
                filter.do_filter(&document(user_agent)),
                expected,
                "{user_agent:?}"
            );
        }
    }

    #[test]
    fn test_document_without_http_is_kept() {
        let mut document = document(None);
        document.http = None;
        assert!(DefaultTraceFilter::new().do_filter(&document));
    }

    #[test]
    fn test_custom_signatures() {
        let filter = DefaultTraceFilter::with_signatures(["health-checker"]);
        assert!(!filter.do_filter(&document(Some("kube-health-checker/1.0"))));
        assert!(filter.do_filter(&document(Some("aws-sdk-js/2.0"))));
    }
}
