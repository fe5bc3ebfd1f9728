use super::IdParser;
use crate::exporter::Error;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// X-Ray drops traces older than 28 days.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 28);

/// Clock skew tolerated for trace ids stamped in the future.
const DEFAULT_MAX_SKEW: Duration = Duration::from_secs(60 * 5);

/// Default [`IdParser`].
///
/// The first 8 hex characters of an X-Ray compatible trace id are the epoch
/// seconds at which the trace started. Ids whose timestamp falls outside
/// `[now - max_age, now + max_skew]` are rejected, since X-Ray would discard
/// them anyway.
#[derive(Clone, Debug)]
pub struct DefaultIdParser {
    max_age: Duration,
    max_skew: Duration,
}

impl Default for DefaultIdParser {
    fn default() -> Self {
        DefaultIdParser {
            max_age: DEFAULT_MAX_AGE,
            max_skew: DEFAULT_MAX_SKEW,
        }
    }
}

impl DefaultIdParser {
    /// Create a parser with a custom acceptance window.
    pub fn new(max_age: Duration, max_skew: Duration) -> Self {
        DefaultIdParser { max_age, max_skew }
    }

    pub(crate) fn parse_id_at(&self, trace_id: &str, now: u64) -> Result<String, Error> {
        let invalid = |reason: &'static str| Error::InvalidTraceId {
            trace_id: trace_id.to_string(),
            reason,
        };

        if trace_id.len() != 32 || !trace_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("expected 32 hex characters"));
        }
        let (epoch_hex, random_hex) = trace_id.split_at(8);
        let epoch = u64::from_str_radix(epoch_hex, 16)
            .map_err(|_| invalid("timestamp prefix is not a number"))?;

        if epoch < now.saturating_sub(self.max_age.as_secs()) {
            return Err(invalid("timestamp prefix is older than the maximum age"));
        }
        if epoch > now.saturating_add(self.max_skew.as_secs()) {
            return Err(invalid("timestamp prefix is too far in the future"));
        }

        Ok(format!("1-{epoch_hex}-{random_hex}"))
    }
}

impl IdParser for DefaultIdParser {
    fn parse_id(&self, trace_id: &str) -> Result<String, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.parse_id_at(trace_id, now)
    }
}
