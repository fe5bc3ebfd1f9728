use std::env;

/// Address of the X-Ray daemon, either `host:port` or
/// `udp:host:port tcp:host:port`.
pub(crate) const ENV_DAEMON_ADDRESS: &str = "AWS_XRAY_DAEMON_ADDRESS";

/// Set by the Lambda runtime for every function invocation environment.
pub(crate) const ENV_LAMBDA_FUNCTION_NAME: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// Region used to build the X-Ray API endpoint.
const ENV_REGION: &str = "AWS_REGION";

/// Fallback region variable read by the AWS SDKs.
const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Region used when neither region variable is set.
const DEFAULT_REGION: &str = "us-east-1";

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|var| !var.is_empty())
}

pub(crate) fn get_daemon_address() -> Option<String> {
    non_empty_var(ENV_DAEMON_ADDRESS)
}

pub(crate) fn is_lambda() -> bool {
    non_empty_var(ENV_LAMBDA_FUNCTION_NAME).is_some()
}

pub(crate) fn get_region() -> String {
    non_empty_var(ENV_REGION)
        .or_else(|| non_empty_var(ENV_DEFAULT_REGION))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                ENV_DAEMON_ADDRESS,
                ENV_LAMBDA_FUNCTION_NAME,
                ENV_REGION,
                ENV_DEFAULT_REGION,
            ],
            || {
                assert_eq!(get_daemon_address(), None);
                assert!(!is_lambda());
                assert_eq!(get_region(), DEFAULT_REGION);
            },
        );
    }

    #[test]
    fn test_empty_values_are_ignored() {
        temp_env::with_vars(
            [
                (ENV_DAEMON_ADDRESS, Some("")),
                (ENV_LAMBDA_FUNCTION_NAME, Some("")),
                (ENV_REGION, Some("")),
                (ENV_DEFAULT_REGION, Some("eu-west-1")),
            ],
            || {
                assert_eq!(get_daemon_address(), None);
                assert!(!is_lambda());
                assert_eq!(get_region(), "eu-west-1");
            },
        );
    }

    #[test]
    fn test_custom_values() {
        temp_env::with_vars(
            [
                (ENV_DAEMON_ADDRESS, Some("10.0.0.1:2001")),
                (ENV_LAMBDA_FUNCTION_NAME, Some("handler")),
                (ENV_REGION, Some("ap-south-1")),
                (ENV_DEFAULT_REGION, Some("eu-west-1")),
            ],
            || {
                assert_eq!(get_daemon_address().as_deref(), Some("10.0.0.1:2001"));
                assert!(is_lambda());
                assert_eq!(get_region(), "ap-south-1");
            },
        );
    }
}
