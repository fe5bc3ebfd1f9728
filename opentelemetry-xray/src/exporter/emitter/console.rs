use super::SegmentEmitter;
use crate::exporter::model::document::Document;
use crate::exporter::Error;
use async_trait::async_trait;
use std::sync::atomic;

/// Prints every batch to stdout as a pretty-printed JSON array.
#[derive(Debug, Default)]
pub struct ConsoleEmitter {
    is_shutdown: atomic::AtomicBool,
}

#[async_trait]
impl SegmentEmitter for ConsoleEmitter {
    async fn emit(&self, documents: &[Document]) -> Result<(), Error> {
        if self.is_shutdown.load(atomic::Ordering::SeqCst) {
            return Err(Error::AlreadyShutdown);
        }
        println!("{}", serde_json::to_string_pretty(documents)?);
        Ok(())
    }

    fn shutdown(&self) {
        self.is_shutdown.store(true, atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_after_shutdown_fails() {
        let emitter = ConsoleEmitter::default();
        let document = Document::builder()
            .id("53995c3f42cd8ad8".to_string())
            .name("work".to_string())
            .start_time(1_700_000_000.0)
            .build();

        assert!(emitter.emit(&[document.clone()]).await.is_ok());
        emitter.shutdown();
        emitter.shutdown();
        assert!(matches!(
            emitter.emit(&[document]).await,
            Err(Error::AlreadyShutdown)
        ));
    }
}
