use opentelemetry::trace::{SpanId, TraceId};
use opentelemetry_sdk::trace::{IdGenerator, RandomIdGenerator};
use std::time::{SystemTime, UNIX_EPOCH};

const RANDOM_BITS_MASK: u128 = (1 << 96) - 1;

/// Generates trace ids X-Ray accepts.
///
/// The first 32 bits of every trace id hold the current epoch seconds, the
/// remaining 96 bits and all span ids are random.
///
/// ```
/// use opentelemetry_sdk::trace::SdkTracerProvider;
/// use opentelemetry_xray::XrayIdGenerator;
///
/// let provider = SdkTracerProvider::builder()
///     .with_id_generator(XrayIdGenerator::default())
///     .build();
/// # drop(provider);
/// ```
#[derive(Clone, Debug, Default)]
pub struct XrayIdGenerator {
    random: RandomIdGenerator,
}

impl XrayIdGenerator {
    fn trace_id_at(&self, epoch_seconds: u32) -> TraceId {
        let random = u128::from_be_bytes(self.random.new_trace_id().to_bytes());
        TraceId::from((u128::from(epoch_seconds) << 96) | (random & RANDOM_BITS_MASK))
    }
}

impl IdGenerator for XrayIdGenerator {
    fn new_trace_id(&self) -> TraceId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or_default();
        self.trace_id_at(now)
    }

    fn new_span_id(&self) -> SpanId {
        self.random.new_span_id()
    }
}
