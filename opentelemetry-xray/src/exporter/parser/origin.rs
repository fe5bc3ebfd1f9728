use super::OriginParser;
use crate::exporter::model::attributes::resource_string;
use crate::exporter::model::semconv::{AWS_ECS_LAUNCHTYPE, CLOUD_PLATFORM, CLOUD_PROVIDER};
use opentelemetry_sdk::Resource;

/// AWS compute platform a resource runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Platform {
    AppRunner,
    Eks,
    ElasticBeanstalk,
    Ecs(EcsLaunchType),
    Ec2,
}

/// How an ECS task was launched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EcsLaunchType {
    Unspecified,
    Ec2,
    Fargate,
}

impl Platform {
    pub(crate) fn origin(self) -> &'static str {
        match self {
            Platform::AppRunner => "AWS::AppRunner::Service",
            Platform::Eks => "AWS::EKS::Container",
            Platform::ElasticBeanstalk => "AWS::ElasticBeanstalk::Environment",
            Platform::Ecs(EcsLaunchType::Unspecified) => "AWS::ECS::Container",
            Platform::Ecs(EcsLaunchType::Ec2) => "AWS::ECS::EC2",
            Platform::Ecs(EcsLaunchType::Fargate) => "AWS::ECS::Fargate",
            Platform::Ec2 => "AWS::EC2::Instance",
        }
    }
}

/// Classifies the resource's platform. Resources not declaring
/// `cloud.provider = aws` have none.
///
/// Both the document origin and the platform block of the AWS metadata are
/// derived from this one decision.
pub(crate) fn detect_platform(resource: &Resource) -> Option<Platform> {
    if resource_string(resource, CLOUD_PROVIDER).as_deref() != Some("aws") {
        return None;
    }
    match resource_string(resource, CLOUD_PLATFORM)?.as_str() {
        "aws_app_runner" => Some(Platform::AppRunner),
        "aws_eks" => Some(Platform::Eks),
        "aws_elastic_beanstalk" => Some(Platform::ElasticBeanstalk),
        "aws_ecs" => Some(Platform::Ecs(
            match resource_string(resource, AWS_ECS_LAUNCHTYPE).as_deref() {
                Some("ec2" | "aws_ec2") => EcsLaunchType::Ec2,
                Some("fargate") => EcsLaunchType::Fargate,
                _ => EcsLaunchType::Unspecified,
            },
        )),
        "aws_ec2" => Some(Platform::Ec2),
        _ => None,
    }
}

/// Default [`OriginParser`].
#[derive(Clone, Debug, Default)]
pub struct DefaultOriginParser;

impl OriginParser for DefaultOriginParser {
    fn origin(&self, resource: &Resource) -> Option<String> {
        detect_platform(resource).map(|platform| platform.origin().to_string())
    }
}
