//! Delivery sinks for translated documents.
use crate::exporter::env;
use crate::exporter::model::document::Document;
use crate::exporter::Error;
use async_trait::async_trait;
use std::fmt::Debug;

mod api;
mod console;
mod udp;

pub use api::ApiEmitter;
pub use console::ConsoleEmitter;
pub use udp::{UdpDaemonEmitter, DEFAULT_DAEMON_ADDRESS};

/// Delivers batches of segment documents somewhere.
///
/// Every configured emitter receives every batch; the exporter drives them
/// concurrently and reports the export as failed if any of them fails.
/// Retrying is left to implementations.
#[async_trait]
pub trait SegmentEmitter: Debug + Send + Sync {
    /// Deliver `documents`, preserving their order where the transport allows.
    async fn emit(&self, documents: &[Document]) -> Result<(), Error>;

    /// Release held resources. Calling it more than once has no further
    /// effect.
    fn shutdown(&self);
}

/// Which emitter to build when none is supplied explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitterStrategy {
    /// Send to the local X-Ray daemon, see [`UdpDaemonEmitter::from_env`].
    Udp,
    /// Post to the regional X-Ray API, see [`ApiEmitter`].
    Api,
    /// Print to stdout, see [`ConsoleEmitter`].
    Console,
}

impl EmitterStrategy {
    /// [`EmitterStrategy::Udp`] inside AWS Lambda (`AWS_LAMBDA_FUNCTION_NAME`
    /// set), where a daemon is always running, [`EmitterStrategy::Api`]
    /// anywhere else.
    pub fn from_env() -> Self {
        if env::is_lambda() {
            EmitterStrategy::Udp
        } else {
            EmitterStrategy::Api
        }
    }
}

impl Default for EmitterStrategy {
    fn default() -> Self {
        EmitterStrategy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::env::ENV_LAMBDA_FUNCTION_NAME;

    #[test]
    fn test_strategy_from_env() {
        temp_env::with_var(ENV_LAMBDA_FUNCTION_NAME, Some("checkout-handler"), || {
            assert_eq!(EmitterStrategy::from_env(), EmitterStrategy::Udp);
        });
        temp_env::with_var_unset(ENV_LAMBDA_FUNCTION_NAME, || {
            assert_eq!(EmitterStrategy::from_env(), EmitterStrategy::Api);
            assert_eq!(EmitterStrategy::default(), EmitterStrategy::Api);
        });
        temp_env::with_var(ENV_LAMBDA_FUNCTION_NAME, Some(""), || {
            assert_eq!(EmitterStrategy::from_env(), EmitterStrategy::Api);
        });
    }
}
