use super::attributes::{
    epoch_seconds, first_string, get, non_empty, number, resource_contains,
    resource_string, string, to_json,
};
use super::document::*;
use super::semconv::*;
use crate::exporter::parser::{detect_platform, IdParser, Platform};
use crate::exporter::Error;
use opentelemetry::trace::{SpanId, SpanKind, Status};
use opentelemetry::{Array, Value};
use opentelemetry_sdk::trace::SpanData;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::attribute::{
    HTTP_RESPONSE_STATUS_CODE, SERVICE_NAME, SERVICE_VERSION, TELEMETRY_SDK_LANGUAGE,
    TELEMETRY_SDK_VERSION,
};
use std::collections::{BTreeMap, HashSet};

/// `db.system` values reported as SQL calls.
const SQL_DATABASES: [&str; 11] = [
    "db2",
    "derby",
    "hive",
    "mariadb",
    "mssql",
    "mysql",
    "oracle",
    "postgresql",
    "sqlite",
    "teradata",
    "other_sql",
];

const UNKNOWN: &str = "unknown";

/// Read-only view over a finished span and its resource exposing the derived
/// document fields.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EnrichedSpan<'a> {
    span: &'a SpanData,
    resource: &'a Resource,
}

impl<'a> EnrichedSpan<'a> {
    pub(crate) fn new(span: &'a SpanData, resource: &'a Resource) -> Self {
        EnrichedSpan { span, resource }
    }

    fn attribute(&self, key: &str) -> Option<String> {
        string(&self.span.attributes, key)
    }

    fn resource_attribute(&self, key: &'static str) -> Option<String> {
        resource_string(self.resource, key)
    }

    pub(crate) fn span_id(&self) -> String {
        self.span.span_context.span_id().to_string()
    }

    pub(crate) fn parent_id(&self) -> Option<String> {
        (self.span.parent_span_id != SpanId::INVALID).then(|| self.span.parent_span_id.to_string())
    }

    pub(crate) fn trace_id(&self, parser: &dyn IdParser) -> Result<String, Error> {
        parser.parse_id(&self.span.span_context.trace_id().to_string())
    }

    pub(crate) fn start_time(&self) -> f64 {
        epoch_seconds(self.span.start_time)
    }

    pub(crate) fn end_time(&self) -> f64 {
        epoch_seconds(self.span.end_time)
    }

    /// `subsegment` for every span with a parent, except server spans.
    pub(crate) fn segment_type(&self) -> Option<SegmentType> {
        (self.span.span_kind != SpanKind::Server && self.parent_id().is_some())
            .then_some(SegmentType::Subsegment)
    }

    pub(crate) fn namespace(&self) -> Option<Namespace> {
        if self.attribute(RPC_SYSTEM).as_deref() == Some(RPC_SYSTEM_AWS_API)
            || self.attribute(AWS_SERVICE).is_some()
        {
            Some(Namespace::Aws)
        } else if self.span.span_kind == SpanKind::Client {
            Some(Namespace::Remote)
        } else {
            None
        }
    }

    /// Status code from the legacy key, else the stable one.
    fn http_status(&self) -> Option<i64> {
        number(&self.span.attributes, HTTP_STATUS_CODE)
            .or_else(|| number(&self.span.attributes, HTTP_RESPONSE_STATUS_CODE))
    }

    /// Status 429.
    pub(crate) fn is_throttled(&self) -> Option<bool> {
        (self.http_status() == Some(429)).then_some(true)
    }

    /// Any 4xx status, throttling included.
    pub(crate) fn is_error(&self) -> Option<bool> {
        matches!(self.http_status(), Some(400..=499)).then_some(true)
    }

    /// Any 5xx status. Without an HTTP status the span's own error status is
    /// used instead.
    pub(crate) fn is_fault(&self) -> Option<bool> {
        let fault = match self.http_status() {
            Some(status) => (500..=599).contains(&status),
            None => matches!(self.span.status, Status::Error { .. }),
        };
        fault.then_some(true)
    }

    pub(crate) fn user(&self) -> Option<String> {
        self.attribute(ENDUSER_ID)
    }

    pub(crate) fn service(&self) -> Service {
        let or_unknown = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());
        Service {
            version: or_unknown(
                self.resource_attribute(SERVICE_VERSION)
                    .or_else(|| self.resource_attribute(CONTAINER_IMAGE_TAG)),
            ),
            runtime: or_unknown(self.resource_attribute(PROCESS_RUNTIME_NAME)),
            runtime_version: or_unknown(self.resource_attribute(PROCESS_RUNTIME_VERSION)),
            name: or_unknown(self.resource_attribute(SERVICE_NAME)),
        }
    }

    /// The span name is reported as the url: connection strings make poor
    /// summaries and may carry credentials.
    pub(crate) fn sql(&self) -> Option<Sql> {
        let database_type = first_string(&self.span.attributes, &[DB_SYSTEM, DB_SYSTEM_NAME])
            .filter(|system| SQL_DATABASES.contains(&system.as_str()))?;
        Some(Sql {
            url: Some(self.span.name.to_string()),
            connection_string: Some(format!(
                "{}/{}",
                self.attribute(DB_CONNECTION_STRING)
                    .as_deref()
                    .unwrap_or("localhost"),
                self.attribute(DB_NAME).unwrap_or_default()
            )),
            database_type: Some(database_type),
            user: self.attribute(DB_USER),
            sanitized_query: first_string(&self.span.attributes, &[DB_STATEMENT, DB_QUERY_TEXT]),
        })
    }

    pub(crate) fn aws(&self) -> Aws {
        let attributes = &self.span.attributes;
        let sdk_version = self.resource_attribute(TELEMETRY_SDK_VERSION);
        let mut aws = Aws {
            account_id: self.attribute(AWS_ACCOUNT_ID),
            operation: first_string(attributes, &[AWS_OPERATION, RPC_METHOD]),
            region: self.attribute(AWS_REGION),
            request_id: self.attribute(AWS_REQUEST_ID),
            id_2: self.attribute(AWS_REQUEST_EXTENDED_ID),
            queue_url: first_string(attributes, &[AWS_QUEUE_URL, AWS_QUEUE_URL_DOTTED]),
            table_name: first_string(attributes, &[AWS_TABLE_NAME, AWS_TABLE_NAME_DOTTED]),
            xray: Some(XraySdk {
                sdk: Some(format!(
                    "{}/{}",
                    self.resource_attribute(TELEMETRY_SDK_LANGUAGE)
                        .as_deref()
                        .unwrap_or("?"),
                    sdk_version.as_deref().unwrap_or_default()
                )),
                sdk_version,
                auto_instrumentation: resource_contains(self.resource, TELEMETRY_AUTO_VERSION),
            }),
            ..Default::default()
        };

        match detect_platform(self.resource) {
            Some(Platform::Eks) => {
                aws.eks = Some(Eks {
                    cluster_name: self.resource_attribute(K8S_CLUSTER_NAME),
                    pod: self.resource_attribute(K8S_POD_NAME),
                    container_id: self.resource_attribute(CONTAINER_ID),
                })
            }
            Some(Platform::ElasticBeanstalk) => {
                aws.elastic_beanstalk = Some(ElasticBeanstalk {
                    environment: self.resource_attribute(DEPLOYMENT_ENVIRONMENT),
                    version_label: self.resource_attribute(SERVICE_VERSION),
                    deployment_id: Some(
                        self.resource_attribute(SERVICE_INSTANCE_ID)
                            .and_then(|id| id.trim().parse().ok())
                            .unwrap_or(0),
                    ),
                })
            }
            Some(Platform::Ecs(_)) => {
                aws.ecs = Some(Ecs {
                    container: self.resource_attribute(CONTAINER_NAME),
                    container_id: self.resource_attribute(CONTAINER_ID),
                    availability_zone: self.resource_attribute(CLOUD_AVAILABILITY_ZONE),
                    container_arn: self.resource_attribute(AWS_ECS_CONTAINER_ARN),
                    cluster_arn: self.resource_attribute(AWS_ECS_CLUSTER_ARN),
                    task_arn: self.resource_attribute(AWS_ECS_TASK_ARN),
                    task_family: self.resource_attribute(AWS_ECS_TASK_FAMILY),
                    launch_type: self.resource_attribute(AWS_ECS_LAUNCHTYPE),
                })
            }
            Some(Platform::Ec2) => {
                aws.ec2 = Some(Ec2 {
                    instance_id: self.resource_attribute(HOST_ID),
                    availability_zone: self.resource_attribute(CLOUD_AVAILABILITY_ZONE),
                    instance_size: self.resource_attribute(HOST_TYPE),
                    ami_id: self.resource_attribute(HOST_IMAGE_ID),
                })
            }
            Some(Platform::AppRunner) | None => {}
        }

        aws
    }

    /// Scalar attributes named in `indexed_keys` or in the span's own
    /// `aws.xray.annotations` list.
    pub(crate) fn annotations(
        &self,
        indexed_keys: &HashSet<String>,
    ) -> Option<BTreeMap<String, AnnotationValue>> {
        let span_keys: Vec<String> = match get(&self.span.attributes, AWS_XRAY_ANNOTATIONS) {
            Some(Value::Array(Array::String(keys))) => {
                keys.iter().map(|key| key.as_str().to_string()).collect()
            }
            Some(Value::String(key)) => vec![key.as_str().to_string()],
            _ => Vec::new(),
        };

        let annotations: BTreeMap<String, AnnotationValue> = self
            .span
            .attributes
            .iter()
            .filter(|kv| {
                let key = kv.key.as_str();
                indexed_keys.contains(key) || span_keys.iter().any(|k| k == key)
            })
            .filter_map(|kv| {
                let value = match &kv.value {
                    Value::Bool(flag) => AnnotationValue::Bool(*flag),
                    Value::I64(number) => AnnotationValue::I64(*number),
                    Value::F64(number) if number.is_finite() => AnnotationValue::F64(*number),
                    Value::String(text) => AnnotationValue::String(text.as_str().to_string()),
                    _ => return None,
                };
                Some((kv.key.as_str().to_string(), value))
            })
            .collect();

        (!annotations.is_empty()).then_some(annotations)
    }

    /// Metadata is not derived from spans.
    pub(crate) fn metadata(&self) -> Option<BTreeMap<String, serde_json::Value>> {
        None
    }

    pub(crate) fn links(&self, parser: &dyn IdParser) -> Result<Option<Vec<Link>>, Error> {
        let links = self
            .span
            .links
            .links
            .iter()
            .map(|link| {
                Ok(Link {
                    id: link.span_context.span_id().to_string(),
                    trace_id: parser.parse_id(&link.span_context.trace_id().to_string())?,
                    attributes: link
                        .attributes
                        .iter()
                        .map(|kv| (kv.key.as_str().to_string(), to_json(&kv.value)))
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(non_empty(links))
    }
}
