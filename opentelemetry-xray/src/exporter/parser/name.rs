use super::NameParser;
use crate::exporter::model::attributes::{resource_string, string};
use crate::exporter::model::semconv::*;
use once_cell::sync::Lazy;
use opentelemetry::trace::SpanKind;
use opentelemetry_sdk::trace::SpanData;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::attribute::SERVICE_NAME;
use regex::Regex;
use url::Url;

/// Longest name X-Ray accepts.
const MAX_NAME_LENGTH: usize = 200;

/// Used when no attribute yields a name.
const FALLBACK_NAME: &str = "span";

/// Prefix of `aws.remote.service` values set by AWS SDK instrumentation.
const AWS_SDK_SERVICE_PREFIX: &str = "AWS.SDK.";

const JDBC_PREFIX: &str = "jdbc:";

/// Characters X-Ray does not allow in segment names.
static DISALLOWED_CHARACTERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^ 0-9\p{L}_.:/%&#=+\-@]").expect("name filter is a valid regex")
});

/// Default [`NameParser`].
///
/// Takes the first non-empty candidate from:
///
/// 1. the span name
/// 2. `aws.local.service`, for server and internal spans marked
///    `aws.span.kind=local_root`
/// 3. `aws.remote.service`, for client, producer and consumer spans
/// 4. `peer.service`
/// 5. `aws.service`
/// 6. `db.name`, suffixed with `@host` from `db.connection_string`
/// 7. the resource's `service.name`, for server spans
/// 8. `rpc.service`
/// 9. `http.host`
/// 10. `net.peer.name`
///
/// and falls back to `"span"`. The result is stripped of characters X-Ray
/// rejects and truncated to 200 characters.
#[derive(Clone, Debug, Default)]
pub struct DefaultNameParser;

impl NameParser for DefaultNameParser {
    fn name(&self, span: &SpanData, resource: &Resource) -> String {
        let attribute = |key| string(&span.attributes, key);
        span_name(span)
            .or_else(|| local_service(span))
            .or_else(|| remote_service(span))
            .or_else(|| attribute(PEER_SERVICE))
            .or_else(|| attribute(AWS_SERVICE))
            .or_else(|| database_name(span))
            .or_else(|| service_name(span, resource))
            .or_else(|| attribute(RPC_SERVICE))
            .or_else(|| attribute(HTTP_HOST))
            .or_else(|| attribute(NET_PEER_NAME))
            .map(|name| sanitize(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_NAME.to_string())
    }
}

fn span_name(span: &SpanData) -> Option<String> {
    Some(span.name.to_string()).filter(|name| !name.is_empty())
}

fn local_service(span: &SpanData) -> Option<String> {
    let is_local_root =
        string(&span.attributes, AWS_SPAN_KIND).as_deref() == Some(AWS_SPAN_KIND_LOCAL_ROOT);
    match span.span_kind {
        SpanKind::Server | SpanKind::Internal if is_local_root => {
            string(&span.attributes, AWS_LOCAL_SERVICE)
        }
        _ => None,
    }
}

fn remote_service(span: &SpanData) -> Option<String> {
    if !matches!(
        span.span_kind,
        SpanKind::Client | SpanKind::Producer | SpanKind::Consumer
    ) {
        return None;
    }
    let name = string(&span.attributes, AWS_REMOTE_SERVICE)?;
    let is_aws_api = string(&span.attributes, RPC_SYSTEM).as_deref() == Some(RPC_SYSTEM_AWS_API);
    match name.strip_prefix(AWS_SDK_SERVICE_PREFIX) {
        Some(service) if is_aws_api => Some(service.to_string()),
        _ => Some(name),
    }
}

fn database_name(span: &SpanData) -> Option<String> {
    let name = string(&span.attributes, DB_NAME)?;
    let host = string(&span.attributes, DB_CONNECTION_STRING).and_then(|connection| {
        let connection = connection
            .strip_prefix(JDBC_PREFIX)
            .unwrap_or(&connection);
        Url::parse(connection)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .filter(|host| !host.is_empty())
    });
    match host {
        Some(host) => Some(format!("{name}@{host}")),
        None => Some(name),
    }
}

fn service_name(span: &SpanData, resource: &Resource) -> Option<String> {
    match span.span_kind {
        SpanKind::Server => resource_string(resource, SERVICE_NAME),
        _ => None,
    }
}

fn sanitize(name: &str) -> String {
    DISALLOWED_CHARACTERS
        .replace_all(name, "")
        .chars()
        .take(MAX_NAME_LENGTH)
        .collect()
}
