use async_trait::async_trait;
use opentelemetry::trace::{Span, SpanKind, Status, Tracer, TracerProvider};
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_xray::document::{Document, SegmentType};
use opentelemetry_xray::{Error, SegmentEmitter, XrayExporter, XrayIdGenerator};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
struct CapturingEmitter {
    documents: Arc<Mutex<Vec<Document>>>,
}

#[async_trait]
impl SegmentEmitter for CapturingEmitter {
    async fn emit(&self, documents: &[Document]) -> Result<(), Error> {
        self.documents
            .lock()
            .unwrap()
            .extend(documents.iter().cloned());
        Ok(())
    }

    fn shutdown(&self) {}
}

fn provider(emitter: CapturingEmitter) -> SdkTracerProvider {
    let exporter = XrayExporter::builder()
        .with_emitter(emitter)
        .with_indexed_attributes(["order.id"])
        .build()
        .unwrap();
    SdkTracerProvider::builder()
        .with_id_generator(XrayIdGenerator::default())
        .with_resource(
            Resource::builder_empty()
                .with_service_name("checkout")
                .with_attributes([
                    KeyValue::new("cloud.provider", "aws"),
                    KeyValue::new("cloud.platform", "aws_eks"),
                    KeyValue::new("k8s.cluster.name", "prod"),
                ])
                .build(),
        )
        .with_simple_exporter(exporter)
        .build()
}

fn is_xray_trace_id(trace_id: &str) -> bool {
    let parts: Vec<&str> = trace_id.split('-').collect();
    parts.len() == 3
        && parts[0] == "1"
        && parts[1].len() == 8
        && parts[2].len() == 24
        && parts[1..]
            .iter()
            .all(|part| part.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[test]
fn exports_parent_and_child_segments() {
    let emitter = CapturingEmitter::default();
    let provider = provider(emitter.clone());
    let tracer = provider.tracer("integration");

    tracer.in_span("POST /orders", |_cx| {
        let mut child = tracer
            .span_builder("SELECT")
            .with_kind(SpanKind::Client)
            .with_attributes([
                KeyValue::new("db.system", "postgresql"),
                KeyValue::new("db.name", "orders"),
                KeyValue::new("order.id", 42),
            ])
            .start(&tracer);
        child.set_status(Status::error("connection reset"));
        child.end();
    });
    provider.shutdown().unwrap();

    let documents = emitter.documents.lock().unwrap();
    assert_eq!(documents.len(), 2);
    let (child, parent) = (&documents[0], &documents[1]);

    assert_eq!(parent.name, "POST /orders");
    assert_eq!(parent.segment_type, None);
    assert_eq!(parent.parent_id, None);
    assert_eq!(parent.fault, None);

    assert_eq!(child.name, "SELECT");
    assert_eq!(child.segment_type, Some(SegmentType::Subsegment));
    assert_eq!(child.parent_id.as_deref(), Some(parent.id.as_str()));
    assert_eq!(child.fault, Some(true));
    assert_eq!(
        child.sql.as_ref().and_then(|sql| sql.url.as_deref()),
        Some("SELECT")
    );
    assert!(child
        .annotations
        .as_ref()
        .is_some_and(|annotations| annotations.contains_key("order.id")));

    for document in documents.iter() {
        let trace_id = document.trace_id.as_deref().unwrap();
        assert!(is_xray_trace_id(trace_id), "{trace_id}");
        assert_eq!(document.trace_id, parent.trace_id);
        assert_eq!(document.origin.as_deref(), Some("AWS::EKS::Container"));
        assert_eq!(
            document.service.as_ref().map(|service| service.name.as_str()),
            Some("checkout")
        );
        assert!(document.end_time.unwrap() >= document.start_time);
    }
}

#[test]
fn serialized_documents_omit_empty_fields() {
    let emitter = CapturingEmitter::default();
    let provider = provider(emitter.clone());

    provider.tracer("integration").in_span("idle", |_cx| {});
    provider.shutdown().unwrap();

    let documents = emitter.documents.lock().unwrap();
    let json = serde_json::to_value(&documents[0]).unwrap();
    let object = json.as_object().unwrap();
    for absent in ["error", "fault", "throttle", "http", "sql", "cause", "type", "links"] {
        assert!(!object.contains_key(absent), "{absent} should be omitted");
    }
    assert!(!json.to_string().contains("null"));
    assert_eq!(json["aws"]["eks"]["cluster_name"], "prod");
}
