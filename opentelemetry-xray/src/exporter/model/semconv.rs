//! Attribute keys that `opentelemetry-semantic-conventions` only exposes
//! behind its experimental feature, or never exposed at all: the legacy
//! (pre-stabilization) HTTP/network keys still emitted by many
//! instrumentations and the AWS-specific keys set by AWS SDK instrumentation.

// Legacy HTTP and network keys.
pub(crate) const HTTP_METHOD: &str = "http.method";
pub(crate) const HTTP_CLIENT_IP: &str = "http.client_ip";
pub(crate) const HTTP_USER_AGENT: &str = "http.user_agent";
pub(crate) const HTTP_STATUS_CODE: &str = "http.status_code";
pub(crate) const HTTP_URL: &str = "http.url";
pub(crate) const HTTP_SCHEME: &str = "http.scheme";
pub(crate) const HTTP_HOST: &str = "http.host";
pub(crate) const HTTP_TARGET: &str = "http.target";
pub(crate) const HTTP_SERVER_NAME: &str = "http.server_name";
pub(crate) const NET_HOST_NAME: &str = "net.host.name";
pub(crate) const NET_HOST_PORT: &str = "net.host.port";
pub(crate) const NET_PEER_NAME: &str = "net.peer.name";
pub(crate) const NET_PEER_PORT: &str = "net.peer.port";
pub(crate) const NET_PEER_IP: &str = "net.peer.ip";
pub(crate) const HOST_NAME: &str = "host.name";
pub(crate) const MESSAGE_TYPE: &str = "message.type";
pub(crate) const MESSAGING_MESSAGE_PAYLOAD_SIZE_BYTES: &str = "messaging.message.payload_size_bytes";

// Database, RPC and identity keys.
pub(crate) const DB_SYSTEM: &str = "db.system";
pub(crate) const DB_SYSTEM_NAME: &str = "db.system.name";
pub(crate) const DB_NAME: &str = "db.name";
pub(crate) const DB_CONNECTION_STRING: &str = "db.connection_string";
pub(crate) const DB_USER: &str = "db.user";
pub(crate) const DB_STATEMENT: &str = "db.statement";
pub(crate) const DB_QUERY_TEXT: &str = "db.query.text";
pub(crate) const RPC_SYSTEM: &str = "rpc.system";
pub(crate) const RPC_SERVICE: &str = "rpc.service";
pub(crate) const RPC_METHOD: &str = "rpc.method";
pub(crate) const PEER_SERVICE: &str = "peer.service";
pub(crate) const ENDUSER_ID: &str = "enduser.id";

// AWS instrumentation keys.
pub(crate) const AWS_OPERATION: &str = "aws.operation";
pub(crate) const AWS_ACCOUNT_ID: &str = "aws.account_id";
pub(crate) const AWS_REGION: &str = "aws.region";
pub(crate) const AWS_REQUEST_ID: &str = "aws.request.id";
pub(crate) const AWS_REQUEST_EXTENDED_ID: &str = "aws.request.extended_id";
pub(crate) const AWS_QUEUE_URL: &str = "aws.queue_url";
pub(crate) const AWS_QUEUE_URL_DOTTED: &str = "aws.queue.url";
pub(crate) const AWS_SERVICE: &str = "aws.service";
pub(crate) const AWS_TABLE_NAME: &str = "aws.table_name";
pub(crate) const AWS_TABLE_NAME_DOTTED: &str = "aws.table.name";
pub(crate) const AWS_XRAY_ANNOTATIONS: &str = "aws.xray.annotations";
pub(crate) const AWS_SPAN_KIND: &str = "aws.span.kind";
pub(crate) const AWS_LOCAL_SERVICE: &str = "aws.local.service";
pub(crate) const AWS_REMOTE_SERVICE: &str = "aws.remote.service";

/// `rpc.system` value set by AWS SDK instrumentations.
pub(crate) const RPC_SYSTEM_AWS_API: &str = "aws-api";

/// `aws.span.kind` value marking the entry span of a local service.
pub(crate) const AWS_SPAN_KIND_LOCAL_ROOT: &str = "local_root";

// Resource keys.
pub(crate) const CLOUD_PROVIDER: &str = "cloud.provider";
pub(crate) const CLOUD_PLATFORM: &str = "cloud.platform";
pub(crate) const CLOUD_AVAILABILITY_ZONE: &str = "cloud.availability_zone";
pub(crate) const AWS_ECS_LAUNCHTYPE: &str = "aws.ecs.launchtype";
pub(crate) const AWS_ECS_CONTAINER_ARN: &str = "aws.ecs.container.arn";
pub(crate) const AWS_ECS_CLUSTER_ARN: &str = "aws.ecs.cluster.arn";
pub(crate) const AWS_ECS_TASK_ARN: &str = "aws.ecs.task.arn";
pub(crate) const AWS_ECS_TASK_FAMILY: &str = "aws.ecs.task.family";
pub(crate) const CONTAINER_ID: &str = "container.id";
pub(crate) const CONTAINER_NAME: &str = "container.name";
pub(crate) const CONTAINER_IMAGE_TAG: &str = "container.image.tag";
pub(crate) const K8S_CLUSTER_NAME: &str = "k8s.cluster.name";
pub(crate) const K8S_POD_NAME: &str = "k8s.pod.name";
pub(crate) const HOST_ID: &str = "host.id";
pub(crate) const HOST_TYPE: &str = "host.type";
pub(crate) const HOST_IMAGE_ID: &str = "host.image.id";
pub(crate) const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";
pub(crate) const SERVICE_INSTANCE_ID: &str = "service.instance.id";
pub(crate) const PROCESS_RUNTIME_NAME: &str = "process.runtime.name";
pub(crate) const PROCESS_RUNTIME_VERSION: &str = "process.runtime.version";
pub(crate) const TELEMETRY_AUTO_VERSION: &str = "telemetry.auto.version";
