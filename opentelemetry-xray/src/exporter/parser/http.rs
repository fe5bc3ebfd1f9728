use super::HttpParser;
use crate::exporter::model::attributes::{contains, first_string, ip, number, string};
use crate::exporter::model::document::{Http, Request, Response};
use crate::exporter::model::semconv::*;
use opentelemetry::trace::SpanKind;
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::SpanData;
use opentelemetry_semantic_conventions::attribute::{
    CLIENT_ADDRESS, HTTP_REQUEST_METHOD, HTTP_RESPONSE_STATUS_CODE, NETWORK_PEER_ADDRESS,
    SERVER_ADDRESS, SERVER_PORT, URL_FULL, URL_PATH, URL_SCHEME, USER_AGENT_ORIGINAL,
};
use url::Url;

/// Any of these marks a span as carrying HTTP information.
const HTTP_KEYS: [&str; 24] = [
    HTTP_METHOD,
    HTTP_REQUEST_METHOD,
    HTTP_CLIENT_IP,
    HTTP_USER_AGENT,
    USER_AGENT_ORIGINAL,
    HTTP_STATUS_CODE,
    HTTP_RESPONSE_STATUS_CODE,
    HTTP_URL,
    URL_FULL,
    HTTP_SCHEME,
    URL_SCHEME,
    HTTP_HOST,
    HTTP_TARGET,
    HTTP_SERVER_NAME,
    NET_HOST_PORT,
    HOST_NAME,
    SERVER_ADDRESS,
    SERVER_PORT,
    NET_PEER_NAME,
    NET_PEER_PORT,
    NET_PEER_IP,
    NETWORK_PEER_ADDRESS,
    CLIENT_ADDRESS,
    URL_PATH,
];

/// Any of these allows a request url to be reported.
const URL_KEYS: [&str; 7] = [
    HTTP_URL,
    URL_FULL,
    HTTP_HOST,
    HTTP_SERVER_NAME,
    NET_HOST_NAME,
    HOST_NAME,
    SERVER_ADDRESS,
];

const CLIENT_IP_KEYS: [&str; 4] = [HTTP_CLIENT_IP, NET_PEER_IP, NETWORK_PEER_ADDRESS, CLIENT_ADDRESS];

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "host";
const DEFAULT_PATH: &str = "/";

/// `message.type` value of an inbound RPC message.
const MESSAGE_TYPE_RECEIVED: &str = "RECEIVED";

/// Default [`HttpParser`].
///
/// Reads both the legacy (`http.method`, `net.peer.ip`, ...) and the stable
/// (`http.request.method`, `client.address`, ...) conventions, preferring the
/// legacy key when both are present.
#[derive(Clone, Debug, Default)]
pub struct DefaultHttpParser;

impl HttpParser for DefaultHttpParser {
    fn http(&self, span: &SpanData) -> Option<Http> {
        let attributes = &span.attributes;
        if !HTTP_KEYS.iter().any(|key| contains(attributes, key)) {
            return None;
        }

        let request = Request {
            method: first_string(attributes, &[HTTP_METHOD, HTTP_REQUEST_METHOD]),
            url: request_url(attributes, &span.span_kind),
            user_agent: first_string(attributes, &[HTTP_USER_AGENT, USER_AGENT_ORIGINAL]),
            client_ip: CLIENT_IP_KEYS
                .iter()
                .find_map(|key| ip(string(attributes, key))),
            x_forwarded_for: (string(attributes, HTTP_CLIENT_IP).is_none()
                && string(attributes, NET_PEER_IP).is_some())
            .then_some(true),
        };

        let content_length = match string(attributes, MESSAGE_TYPE).as_deref() {
            Some(MESSAGE_TYPE_RECEIVED) => {
                number(attributes, MESSAGING_MESSAGE_PAYLOAD_SIZE_BYTES).unwrap_or(0)
            }
            _ => 0,
        };
        let response = Response {
            status: number(attributes, HTTP_STATUS_CODE)
                .or_else(|| number(attributes, HTTP_RESPONSE_STATUS_CODE)),
            content_length: Some(content_length),
        };

        Some(Http {
            request: Some(request),
            response: Some(response),
        })
    }
}

fn request_url(attributes: &[KeyValue], kind: &SpanKind) -> Option<String> {
    if !URL_KEYS.iter().any(|key| contains(attributes, key)) {
        return None;
    }
    if let Some(full) = first_string(attributes, &[HTTP_URL, URL_FULL]) {
        return Some(full);
    }

    let scheme = first_string(attributes, &[HTTP_SCHEME, URL_SCHEME]);
    let (host, port, path) = if *kind == SpanKind::Server {
        (
            first_string(
                attributes,
                &[
                    HTTP_HOST,
                    HTTP_SERVER_NAME,
                    NET_HOST_NAME,
                    HOST_NAME,
                    SERVER_ADDRESS,
                ],
            ),
            first_string(attributes, &[NET_HOST_PORT, SERVER_PORT]),
            first_string(attributes, &[HTTP_TARGET, URL_PATH]),
        )
    } else {
        (
            first_string(attributes, &[HTTP_HOST, NET_PEER_NAME, NET_PEER_IP]),
            string(attributes, NET_PEER_PORT),
            string(attributes, HTTP_TARGET),
        )
    };

    to_url(
        scheme.as_deref().unwrap_or(DEFAULT_SCHEME),
        host.as_deref().unwrap_or(DEFAULT_HOST),
        port.as_deref(),
        path.as_deref().unwrap_or(DEFAULT_PATH),
    )
}

/// Builds and normalizes `scheme://host[:port]path`. Unparseable
/// combinations yield no url.
fn to_url(scheme: &str, host: &str, port: Option<&str>, path: &str) -> Option<String> {
    let port = port.map(|port| format!(":{port}")).unwrap_or_default();
    Url::parse(&format!("{scheme}://{host}{port}{path}"))
        .ok()
        .map(String::from)
}
