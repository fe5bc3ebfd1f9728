//! Recursive removal of empty strings, arrays and objects from a document.
use super::document::*;
use std::collections::BTreeMap;

/// A value that can drop its empty parts.
pub(crate) trait Prune {
    /// Remove empty children.
    fn prune(&mut self);

    /// Whether nothing worth serializing is left.
    fn is_void(&self) -> bool;
}

fn prune_field<T: Prune>(field: &mut Option<T>) {
    if let Some(value) = field {
        value.prune();
        if value.is_void() {
            *field = None;
        }
    }
}

macro_rules! prune_fields {
    ($value:ident, $($field:ident),+ $(,)?) => {
        $(prune_field(&mut $value.$field);)+
    };
}

macro_rules! impl_scalar {
    ($($ty:ty),+) => {
        $(impl Prune for $ty {
            fn prune(&mut self) {}

            fn is_void(&self) -> bool {
                false
            }
        })+
    };
}

impl_scalar!(bool, i64, u32, f64, Namespace, SegmentType);

impl Prune for String {
    fn prune(&mut self) {}

    fn is_void(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Prune> Prune for Vec<T> {
    fn prune(&mut self) {
        self.iter_mut().for_each(Prune::prune);
        self.retain(|item| !item.is_void());
    }

    fn is_void(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Prune> Prune for BTreeMap<String, T> {
    fn prune(&mut self) {
        self.values_mut().for_each(Prune::prune);
        self.retain(|_, value| !value.is_void());
    }

    fn is_void(&self) -> bool {
        self.is_empty()
    }
}

impl Prune for serde_json::Value {
    fn prune(&mut self) {
        match self {
            serde_json::Value::Array(items) => {
                items.iter_mut().for_each(Prune::prune);
                items.retain(|item| !item.is_void());
            }
            serde_json::Value::Object(entries) => {
                entries.values_mut().for_each(Prune::prune);
                entries.retain(|_, value| !value.is_void());
            }
            _ => {}
        }
    }

    fn is_void(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::String(value) => value.is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(entries) => entries.is_empty(),
            _ => false,
        }
    }
}

impl Prune for AnnotationValue {
    fn prune(&mut self) {}

    fn is_void(&self) -> bool {
        match self {
            AnnotationValue::String(value) => value.is_empty(),
            AnnotationValue::F64(number) => !number.is_finite(),
            _ => false,
        }
    }
}

impl Prune for Document {
    fn prune(&mut self) {
        prune_fields!(
            self,
            end_time,
            trace_id,
            parent_id,
            origin,
            namespace,
            error,
            fault,
            throttle,
            user,
            http,
            aws,
            sql,
            cause,
            annotations,
            metadata,
            service,
            segment_type,
            links,
        );
    }

    fn is_void(&self) -> bool {
        false
    }
}

impl Prune for Http {
    fn prune(&mut self) {
        prune_fields!(self, request, response);
    }

    fn is_void(&self) -> bool {
        self.request.is_none() && self.response.is_none()
    }
}

impl Prune for Request {
    fn prune(&mut self) {
        prune_fields!(self, method, url, user_agent, client_ip, x_forwarded_for);
    }

    fn is_void(&self) -> bool {
        *self == Request::default()
    }
}

impl Prune for Response {
    fn prune(&mut self) {}

    fn is_void(&self) -> bool {
        *self == Response::default()
    }
}

impl Prune for Aws {
    fn prune(&mut self) {
        prune_fields!(
            self,
            account_id,
            operation,
            region,
            request_id,
            id_2,
            queue_url,
            table_name,
            xray,
            ecs,
            ec2,
            elastic_beanstalk,
            eks,
        );
    }

    fn is_void(&self) -> bool {
        *self == Aws::default()
    }
}

impl Prune for XraySdk {
    fn prune(&mut self) {
        prune_fields!(self, sdk, sdk_version);
    }

    // `auto_instrumentation` is always serialized.
    fn is_void(&self) -> bool {
        false
    }
}

impl Prune for Ecs {
    fn prune(&mut self) {
        prune_fields!(
            self,
            container,
            container_id,
            availability_zone,
            container_arn,
            cluster_arn,
            task_arn,
            task_family,
            launch_type,
        );
    }

    fn is_void(&self) -> bool {
        *self == Ecs::default()
    }
}

impl Prune for Ec2 {
    fn prune(&mut self) {
        prune_fields!(self, instance_id, availability_zone, instance_size, ami_id);
    }

    fn is_void(&self) -> bool {
        *self == Ec2::default()
    }
}

impl Prune for ElasticBeanstalk {
    fn prune(&mut self) {
        prune_fields!(self, environment, version_label);
    }

    fn is_void(&self) -> bool {
        *self == ElasticBeanstalk::default()
    }
}

impl Prune for Eks {
    fn prune(&mut self) {
        prune_fields!(self, cluster_name, pod, container_id);
    }

    fn is_void(&self) -> bool {
        *self == Eks::default()
    }
}

impl Prune for Sql {
    fn prune(&mut self) {
        prune_fields!(
            self,
            url,
            connection_string,
            database_type,
            user,
            sanitized_query,
        );
    }

    fn is_void(&self) -> bool {
        *self == Sql::default()
    }
}

impl Prune for Cause {
    fn prune(&mut self) {
        prune_fields!(self, exceptions);
    }

    fn is_void(&self) -> bool {
        self.exceptions.is_none()
    }
}

impl Prune for Exception {
    fn prune(&mut self) {
        prune_fields!(self, message, exception_type, cause, stack);
    }

    fn is_void(&self) -> bool {
        false
    }
}

impl Prune for StackFrame {
    fn prune(&mut self) {
        prune_fields!(self, path, line, label);
    }

    fn is_void(&self) -> bool {
        *self == StackFrame::default()
    }
}

impl Prune for Service {
    fn prune(&mut self) {}

    fn is_void(&self) -> bool {
        false
    }
}

impl Prune for Link {
    fn prune(&mut self) {
        self.attributes.prune();
    }

    fn is_void(&self) -> bool {
        false
    }
}
