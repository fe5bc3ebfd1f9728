//! X-Ray segment document wire types.
//!
//! Field names follow the [segment document schema]; everything optional is
//! omitted from the JSON when absent.
//!
//! [segment document schema]: https://docs.aws.amazon.com/xray/latest/devguide/xray-api-segmentdocuments.html
use serde::Serialize;
use std::collections::BTreeMap;
use typed_builder::TypedBuilder;

/// One X-Ray segment (or subsegment) derived from a single span.
#[derive(TypedBuilder, Clone, Debug, PartialEq, Serialize)]
pub struct Document {
    /// Span id, 16 lowercase hex characters.
    pub id: String,
    /// Display name, at most 200 characters from the allowed set.
    pub name: String,
    /// Start of the span in fractional epoch seconds.
    pub start_time: f64,
    /// End of the span in fractional epoch seconds.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    /// Trace id in `1-<epoch>-<random>` form.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Id of the parent span, if any.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// AWS resource type the application runs on.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Kind of downstream call.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
    /// Client error (4xx).
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
    /// Server error (5xx).
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<bool>,
    /// Request was throttled (429).
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle: Option<bool>,
    /// End user that made the request.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// HTTP request and response.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<Http>,
    /// AWS resource and SDK metadata.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws: Option<Aws>,
    /// SQL query details.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<Sql>,
    /// Recorded exceptions.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Cause>,
    /// Indexed key/value pairs usable in filter expressions.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, AnnotationValue>>,
    /// Non-indexed data, grouped by namespace.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// The application that produced the segment.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    /// Set for documents sent independently of their parent segment.
    #[builder(default)]
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub segment_type: Option<SegmentType>,
    /// Spans this one is causally linked to.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

/// Downstream call classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Call to an AWS service through an AWS SDK.
    Aws,
    /// Any other downstream call.
    Remote,
}

/// Document type marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    /// A non-root document sent on its own.
    Subsegment,
}

/// Scalar annotation value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// Boolean annotation.
    Bool(bool),
    /// Integer annotation.
    I64(i64),
    /// Floating point annotation.
    F64(f64),
    /// String annotation.
    String(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Http {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_forwarded_for: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<i64>,
}

/// AWS block of a document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Aws {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Extended request id (S3 `x-amz-id-2`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xray: Option<XraySdk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecs: Option<Ecs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2: Option<Ec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elastic_beanstalk: Option<ElasticBeanstalk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eks: Option<Eks>,
}

/// Instrumentation that produced the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct XraySdk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<String>,
    pub auto_instrumentation: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Ecs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Ec2 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct ElasticBeanstalk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Eks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

/// Database call details.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Sql {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_query: Option<String>,
}

/// Exceptions recorded on the span.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Cause {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<Exception>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Exception {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
    pub remote: bool,
    /// Id of the exception that caused this one. Never populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<StackFrame>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct StackFrame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The application that produced the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Service {
    pub version: String,
    pub runtime: String,
    pub runtime_version: String,
    pub name: String,
}

/// A span link.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Link {
    pub id: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod document_serialization_tests {
    use super::*;

    fn minimal() -> Document {
        Document::builder()
            .id("53995c3f42cd8ad8".to_string())
            .name("GET /x".to_string())
            .start_time(1_700_000_000.5)
            .build()
    }

    #[test]
    fn test_minimal_document() {
        assert_eq!(
            serde_json::to_string(&minimal()).unwrap(),
            r#"{"id":"53995c3f42cd8ad8","name":"GET /x","start_time":1700000000.5}"#
        );
    }

    #[test]
    fn test_type_and_namespace_rename() {
        let mut document = minimal();
        document.segment_type = Some(SegmentType::Subsegment);
        document.namespace = Some(Namespace::Remote);
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["type"], "subsegment");
        assert_eq!(json["namespace"], "remote");
        assert!(json.get("segment_type").is_none());
    }

    #[test]
    fn test_annotations_are_untagged() {
        let mut document = minimal();
        document.annotations = Some(BTreeMap::from([
            ("flag".to_string(), AnnotationValue::Bool(true)),
            ("count".to_string(), AnnotationValue::I64(3)),
            ("ratio".to_string(), AnnotationValue::F64(0.5)),
            ("tenant".to_string(), AnnotationValue::String("acme".into())),
        ]));
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(
            json["annotations"],
            serde_json::json!({"count": 3, "flag": true, "ratio": 0.5, "tenant": "acme"})
        );
    }

    #[test]
    fn test_exception_type_rename() {
        let exception = Exception {
            id: "0000000000000001".into(),
            exception_type: Some("TypeError".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&exception).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "0000000000000001", "type": "TypeError", "remote": false})
        );
    }
}
