use crate::composition::domain::{
    AccessIdentity, ArtifactSource, ComputeSpec, ComputeTarget, DeploymentPlan, EnvValue,
    NetworkAttachment, PersistedParameter, PolicyStatement, ResourcePattern, RuntimeConfig,
    ServicePrincipal, TriggerKind, TriggerSpec,
};
use crate::ports::outbound::PlanFormatter;
use crate::shared::Result;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
const POLICY_VERSION: &str = "2012-10-17";
const INLINE_POLICY_NAME: &str = "CollectorAccess";
const CLUSTER_ID: &str = "CollectorCluster";
const TASK_DEFINITION_ID: &str = "CollectorTaskDefinition";
const CONTAINER_NAME: &str = "collector";
const EXECUTION_ROLE_ID: &str = "CollectorExecutionRole";
const LOG_GROUP_ID: &str = "CollectorLogGroup";
const LOG_RETENTION_DAYS: u32 = 30;

/// Image pull and log delivery for Fargate tasks. Kept off the collector role.
const TASK_EXECUTION_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

#[derive(Debug, Serialize)]
struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Metadata")]
    metadata: Value,
    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, TemplateParameter>,
    #[serde(rename = "Resources")]
    resources: BTreeMap<String, Resource>,
}

#[derive(Debug, Serialize)]
struct TemplateParameter {
    #[serde(rename = "Type")]
    parameter_type: &'static str,
    #[serde(rename = "Description")]
    description: String,
}

#[derive(Debug, Serialize)]
struct Resource {
    #[serde(rename = "Type")]
    resource_type: &'static str,
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    #[serde(rename = "Metadata", skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
    #[serde(rename = "Properties")]
    properties: Value,
}

impl Resource {
    fn new(resource_type: &'static str, properties: Value) -> Self {
        Self {
            resource_type,
            depends_on: Vec::new(),
            metadata: None,
            properties,
        }
    }

    fn depends_on(mut self, logical_id: &str) -> Self {
        self.depends_on.push(logical_id.to_string());
        self
    }

    fn with_metadata(mut self, metadata: Option<Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// CloudFormationFormatter adapter rendering the plan as a JSON template
///
/// Local build sources cannot be embedded in a template; they become
/// template parameters, and the resource carries the source location as
/// asset metadata for the packaging step.
pub struct CloudFormationFormatter;

impl CloudFormationFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Strings holding `${...}` pseudo parameters are wrapped in `Fn::Sub`.
    fn substituted(value: &str) -> Value {
        if value.contains("${") {
            json!({ "Fn::Sub": value })
        } else {
            Value::String(value.to_string())
        }
    }

    fn get_att(logical_id: &str, attribute: &str) -> Value {
        json!({ "Fn::GetAtt": [logical_id, attribute] })
    }

    fn reference(logical_id: &str) -> Value {
        json!({ "Ref": logical_id })
    }

    fn env_value(value: &EnvValue) -> Value {
        match value {
            EnvValue::Literal(literal) => Value::String(literal.clone()),
            // Ref on a parameter resolves to its name
            EnvValue::Parameter(parameter) => Self::reference(parameter.logical_id()),
        }
    }

    fn build_metadata(plan: &DeploymentPlan) -> Value {
        let variant = &plan.variant;
        json!({
            "collector-deploy": {
                "toolName": plan.metadata.tool_name(),
                "toolVersion": plan.metadata.tool_version(),
                "timestamp": plan.metadata.timestamp(),
                "compositionId": plan.metadata.composition_id(),
                "variant": {
                    "computeTarget": variant.compute_kind().to_string(),
                    "runMode": variant.run_mode().to_string(),
                    "targetArch": variant.build_settings().target_arch.function_architecture(),
                    "networkAttached": variant.network_attached(),
                    "eventsTrigger": variant.events_trigger(),
                    "customMetrics": plan.parameter.is_some(),
                }
            }
        })
    }

    fn build_parameter(parameter: &PersistedParameter) -> Resource {
        Resource::new(
            "AWS::SSM::Parameter",
            json!({
                "Name": parameter.name().as_str(),
                "Type": "String",
                "Tier": parameter.tier().as_str(),
                "Value": parameter.value(),
                "Description": "Custom metric definitions for the database collector",
            }),
        )
    }

    fn build_statement(statement: &PolicyStatement) -> Value {
        let resources: Vec<Value> = statement
            .resources()
            .iter()
            .map(|r| match r {
                ResourcePattern::Any => Value::String("*".to_string()),
                ResourcePattern::Arn(arn) => Self::substituted(arn),
            })
            .collect();

        let mut rendered = Map::new();
        rendered.insert("Sid".to_string(), json!(statement.sid()));
        rendered.insert("Effect".to_string(), json!("Allow"));
        rendered.insert("Action".to_string(), json!(statement.actions()));
        rendered.insert("Resource".to_string(), Value::Array(resources));
        if let Some(condition) = statement.condition() {
            rendered.insert(
                "Condition".to_string(),
                json!({ condition.operator.as_str(): { condition.key.as_str(): condition.value.as_str() } }),
            );
        }
        Value::Object(rendered)
    }

    fn build_role(plan: &DeploymentPlan) -> Resource {
        let identity: &AccessIdentity = &plan.identity;
        let principals: Vec<&str> = identity
            .principals()
            .iter()
            .map(|p| p.as_str())
            .collect();
        let statements: Vec<Value> = identity
            .scope()
            .statements()
            .iter()
            .map(Self::build_statement)
            .collect();
        let managed: Vec<Value> = identity
            .scope()
            .managed_policies()
            .iter()
            .map(|p| Self::substituted(&p.arn))
            .collect();

        Resource::new(
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": {
                    "Version": POLICY_VERSION,
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": principals },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": managed,
                "Policies": [{
                    "PolicyName": INLINE_POLICY_NAME,
                    "PolicyDocument": {
                        "Version": POLICY_VERSION,
                        "Statement": statements,
                    },
                }],
            }),
        )
    }

    /// Code or image location plus, for local sources, the template
    /// parameters it needs and the asset metadata.
    fn artifact(
        target: &ComputeTarget,
        parameters: &mut BTreeMap<String, TemplateParameter>,
    ) -> (Value, Option<Value>) {
        let id = &target.logical_id;
        match &target.source {
            ArtifactSource::Bundle { uri } => {
                let (bucket, key) = target
                    .source
                    .bundle_location()
                    .unwrap_or((uri.as_str(), ""));
                (json!({ "S3Bucket": bucket, "S3Key": key }), None)
            }
            ArtifactSource::Image { uri } => (Value::String(uri.clone()), None),
            ArtifactSource::LocalEntry { path } => {
                let bucket = format!("{}AssetBucket", id);
                let key = format!("{}AssetKey", id);
                parameters.insert(
                    bucket.clone(),
                    TemplateParameter {
                        parameter_type: "String",
                        description: format!("S3 bucket holding the packaged {}", target.entry_point.name()),
                    },
                );
                parameters.insert(
                    key.clone(),
                    TemplateParameter {
                        parameter_type: "String",
                        description: format!("S3 key of the packaged {}", target.entry_point.name()),
                    },
                );
                (
                    json!({ "S3Bucket": Self::reference(&bucket), "S3Key": Self::reference(&key) }),
                    Some(json!({
                        "aws:asset:path": path.display().to_string(),
                        "aws:asset:property": "Code",
                    })),
                )
            }
            ArtifactSource::LocalImageBuild {
                context,
                dockerfile,
                platform,
            } => {
                let image = format!("{}ImageUri", id);
                parameters.insert(
                    image.clone(),
                    TemplateParameter {
                        parameter_type: "String",
                        description: format!("Image URI of the built {}", target.entry_point.name()),
                    },
                );
                (
                    Self::reference(&image),
                    Some(json!({
                        "aws:asset:path": context.display().to_string(),
                        "aws:asset:dockerfile-path": dockerfile.display().to_string(),
                        "aws:asset:docker-platform": platform,
                        "aws:asset:property": "Image",
                    })),
                )
            }
        }
    }

    fn function_environment(environment: &RuntimeConfig) -> Value {
        let variables: Map<String, Value> = environment
            .iter()
            .map(|(name, value)| (name.to_string(), Self::env_value(value)))
            .collect();
        Value::Object(variables)
    }

    fn build_function(
        target: &ComputeTarget,
        parameters: &mut BTreeMap<String, TemplateParameter>,
    ) -> Option<Resource> {
        let ComputeSpec::Function(spec) = &target.spec else {
            return None;
        };
        let (code, asset) = Self::artifact(target, parameters);

        let mut properties = Map::new();
        properties.insert("Role".to_string(), Self::get_att(&target.role_id, "Arn"));
        properties.insert("Runtime".to_string(), json!(spec.runtime));
        properties.insert("Handler".to_string(), json!(spec.handler));
        properties.insert(
            "Architectures".to_string(),
            json!([spec.architecture.function_architecture()]),
        );
        properties.insert("MemorySize".to_string(), json!(spec.memory_mib));
        properties.insert("Timeout".to_string(), json!(spec.timeout.as_secs()));
        properties.insert("Code".to_string(), code);
        if !target.environment.is_empty() {
            properties.insert(
                "Environment".to_string(),
                json!({ "Variables": Self::function_environment(&target.environment) }),
            );
        }
        if let NetworkAttachment::Attached(placement) = &target.network {
            properties.insert(
                "VpcConfig".to_string(),
                json!({
                    "SubnetIds": placement.subnet_ids().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                    "SecurityGroupIds": placement
                        .security_group_ids()
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>(),
                }),
            );
        }

        Some(
            Resource::new("AWS::Lambda::Function", Value::Object(properties))
                .depends_on(&target.role_id)
                .with_metadata(asset),
        )
    }

    /// Role the ECS agent assumes to pull the image and ship container logs.
    fn build_execution_role() -> Resource {
        Resource::new(
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": {
                    "Version": POLICY_VERSION,
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": [ServicePrincipal::EcsTasks.as_str()] },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": [TASK_EXECUTION_POLICY_ARN],
            }),
        )
    }

    /// Cluster, execution role, log group, task definition and service for a
    /// containerized target.
    fn build_service(
        target: &ComputeTarget,
        parameters: &mut BTreeMap<String, TemplateParameter>,
    ) -> Vec<(String, Resource)> {
        let ComputeSpec::Service(spec) = &target.spec else {
            return Vec::new();
        };
        let (image, asset) = Self::artifact(target, parameters);
        let environment: Vec<Value> = target
            .environment
            .iter()
            .map(|(name, value)| json!({ "Name": name, "Value": Self::env_value(value) }))
            .collect();

        let log_group = Resource::new(
            "AWS::Logs::LogGroup",
            json!({ "RetentionInDays": LOG_RETENTION_DAYS }),
        );

        let task_definition = Resource::new(
            "AWS::ECS::TaskDefinition",
            json!({
                "RequiresCompatibilities": ["FARGATE"],
                "NetworkMode": "awsvpc",
                "Cpu": spec.cpu_units.to_string(),
                "Memory": spec.memory_mib.to_string(),
                "TaskRoleArn": Self::get_att(&target.role_id, "Arn"),
                "ExecutionRoleArn": Self::get_att(EXECUTION_ROLE_ID, "Arn"),
                "RuntimePlatform": {
                    "OperatingSystemFamily": "LINUX",
                    "CpuArchitecture": spec.architecture.task_cpu_architecture(),
                },
                "ContainerDefinitions": [{
                    "Name": CONTAINER_NAME,
                    "Image": image,
                    "Essential": true,
                    "Environment": environment,
                    "LogConfiguration": {
                        "LogDriver": "awslogs",
                        "Options": {
                            "awslogs-group": Self::reference(LOG_GROUP_ID),
                            "awslogs-region": Self::reference("AWS::Region"),
                            "awslogs-stream-prefix": CONTAINER_NAME,
                        },
                    },
                }],
            }),
        )
        .depends_on(&target.role_id)
        .depends_on(EXECUTION_ROLE_ID)
        .with_metadata(asset);

        let mut network = Map::new();
        if let Some(placement) = target.network.placement() {
            network.insert(
                "AwsvpcConfiguration".to_string(),
                json!({
                    "AssignPublicIp": "DISABLED",
                    "Subnets": placement.subnet_ids().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                    "SecurityGroups": placement
                        .security_group_ids()
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>(),
                }),
            );
        }

        let service = Resource::new(
            "AWS::ECS::Service",
            json!({
                "Cluster": Self::reference(CLUSTER_ID),
                "TaskDefinition": Self::reference(TASK_DEFINITION_ID),
                "LaunchType": "FARGATE",
                "DesiredCount": spec.desired_count,
                "NetworkConfiguration": Value::Object(network),
            }),
        );

        vec![
            (
                CLUSTER_ID.to_string(),
                Resource::new("AWS::ECS::Cluster", json!({})),
            ),
            (EXECUTION_ROLE_ID.to_string(), Self::build_execution_role()),
            (LOG_GROUP_ID.to_string(), log_group),
            (TASK_DEFINITION_ID.to_string(), task_definition),
            (target.logical_id.clone(), service),
        ]
    }

    fn build_rule(trigger: &TriggerSpec) -> Resource {
        let mut properties = Map::new();
        properties.insert("State".to_string(), json!("ENABLED"));
        match trigger.kind() {
            TriggerKind::Schedule { .. } => {
                properties.insert(
                    "ScheduleExpression".to_string(),
                    json!(trigger.kind().schedule_expression()),
                );
            }
            TriggerKind::EventPattern {
                source,
                detail_types,
            } => {
                let mut pattern = Map::new();
                pattern.insert("source".to_string(), json!([source]));
                if !detail_types.is_empty() {
                    pattern.insert("detail-type".to_string(), json!(detail_types));
                }
                properties.insert("EventPattern".to_string(), Value::Object(pattern));
            }
        }
        properties.insert(
            "Targets".to_string(),
            json!([{
                "Id": trigger.target_id(),
                "Arn": Self::get_att(trigger.target_id(), "Arn"),
            }]),
        );
        Resource::new("AWS::Events::Rule", Value::Object(properties))
    }

    fn build_invoke_permission(trigger: &TriggerSpec) -> Resource {
        Resource::new(
            "AWS::Lambda::Permission",
            json!({
                "Action": "lambda:InvokeFunction",
                "FunctionName": Self::reference(trigger.target_id()),
                "Principal": "events.amazonaws.com",
                "SourceArn": Self::get_att(trigger.logical_id(), "Arn"),
            }),
        )
    }
}

impl Default for CloudFormationFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanFormatter for CloudFormationFormatter {
    fn format(&self, plan: &DeploymentPlan) -> Result<String> {
        let mut parameters = BTreeMap::new();
        let mut resources = BTreeMap::new();

        if let Some(parameter) = &plan.parameter {
            resources.insert(
                parameter.logical_id().to_string(),
                Self::build_parameter(parameter),
            );
        }
        resources.insert(plan.identity.logical_id().to_string(), Self::build_role(plan));

        for target in &plan.compute_targets {
            if let Some(function) = Self::build_function(target, &mut parameters) {
                resources.insert(target.logical_id.clone(), function);
            }
            for (logical_id, resource) in Self::build_service(target, &mut parameters) {
                resources.insert(logical_id, resource);
            }
        }

        for trigger in &plan.triggers {
            resources.insert(trigger.logical_id().to_string(), Self::build_rule(trigger));
            resources.insert(
                format!("{}Permission", trigger.logical_id()),
                Self::build_invoke_permission(trigger),
            );
        }

        let template = Template {
            format_version: TEMPLATE_FORMAT_VERSION,
            description: format!(
                "Database metrics collector ({}, {})",
                plan.variant.compute_kind(),
                plan.variant.build_settings().target_arch.function_architecture()
            ),
            metadata: Self::build_metadata(plan),
            parameters,
            resources,
        };

        Ok(serde_json::to_string_pretty(&template)?)
    }
}
