//! Testing utilities for IA Logs workspace
//!
//! Shared fixtures that build compiled templates the way the host's compile
//! step would, plus lookup helpers and test tracing.

#![allow(missing_docs)]

use ialogs_augmenter::{FunctionNaming, ServerlessNaming, ServiceConfig};
use ialogs_template::{
    FunctionResource, LogGroupResource, LogicalId, ResourceNode, RoleResource, Template,
};
use serde_json::{json, Value};

/// Logical id of the default execution role
pub const ROLE_ID: &str = "IamRoleLambdaExecution";

/// Service name used in generated physical names
pub const SERVICE: &str = "svc";

/// Stage used in generated physical names
pub const STAGE: &str = "dev";

/// Install a fmt subscriber writing to the test output
///
/// Honors `RUST_LOG`, defaulting to `ialogs=debug`. Safe to call repeatedly.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ialogs=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Compute node as compiled for `function`
pub fn compute_node_json(function: &str) -> Value {
    let normalized = ServerlessNaming::normalized_function_name(function);
    json!({
        "Type": "AWS::Lambda::Function",
        "Properties": {
            "Code": {"S3Bucket": {"Ref": "ServerlessDeploymentBucket"}, "S3Key": format!("{function}.zip")},
            "Handler": format!("handler.{function}"),
            "Runtime": "nodejs20.x",
            "FunctionName": format!("{SERVICE}-{STAGE}-{function}"),
            "Role": {"Fn::GetAtt": [ROLE_ID, "Arn"]}
        },
        "DependsOn": [format!("{normalized}LogGroup")]
    })
}

/// Execution role as compiled for a service
pub fn role_node_json() -> Value {
    json!({
        "Type": "AWS::IAM::Role",
        "Properties": {
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"Service": ["lambda.amazonaws.com"]},
                    "Action": ["sts:AssumeRole"]
                }]
            },
            "Policies": [{
                "PolicyName": {"Fn::Join": ["-", [SERVICE, STAGE, "lambda"]]},
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Action": ["logs:CreateLogStream", "logs:CreateLogGroup", "logs:TagResource"],
                        "Resource": [{
                            "Fn::Sub": format!("arn:${{AWS::Partition}}:logs:${{AWS::Region}}:${{AWS::AccountId}}:log-group:/aws/lambda/{SERVICE}-{STAGE}*:*")
                        }]
                    }]
                }
            }],
            "Path": "/"
        }
    })
}

/// Compiled template with one compute node and default log group per function,
/// all sharing [`ROLE_ID`]
pub fn compiled_template(functions: &[&str]) -> Template {
    let mut resources = serde_json::Map::new();
    for function in functions {
        let normalized = ServerlessNaming::normalized_function_name(function);
        resources.insert(
            format!("{normalized}LogGroup"),
            json!({
                "Type": "AWS::Logs::LogGroup",
                "Properties": {"LogGroupName": format!("/aws/lambda/{SERVICE}-{STAGE}-{function}")}
            }),
        );
    }
    resources.insert(ROLE_ID.to_string(), role_node_json());
    for function in functions {
        resources.insert(
            ServerlessNaming.compute_resource_id(function).into_inner(),
            compute_node_json(function),
        );
    }

    Template::from_value(json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Resources": resources
    }))
    .unwrap()
}

/// Service from a `{"functions": ..., "custom": ...}` description, with a
/// compiled template generated for its functions
pub fn service(description: Value) -> ServiceConfig {
    let mut service = ServiceConfig::from_value(description).unwrap();
    let names: Vec<&str> = service.functions.keys().map(String::as_str).collect();
    let template = compiled_template(&names);
    service.template = template;
    service
}

/// Compiled compute node of `function`
pub fn compute<'t>(template: &'t Template, function: &str) -> &'t FunctionResource {
    let id = ServerlessNaming.compute_resource_id(function);
    template
        .get(id.as_str())
        .and_then(ResourceNode::as_function)
        .unwrap_or_else(|| panic!("no compute node {id}"))
}

/// Log group created for `function`
pub fn ia_log_group<'t>(template: &'t Template, function: &str) -> &'t LogGroupResource {
    let id = ialogs_augmenter::log_group_id(function);
    template
        .get(id.as_str())
        .and_then(ResourceNode::as_log_group)
        .unwrap_or_else(|| panic!("no log group {id}"))
}

/// Role node by logical id
pub fn role<'t>(template: &'t Template, id: &str) -> &'t RoleResource {
    template
        .get(id)
        .and_then(ResourceNode::as_role)
        .unwrap_or_else(|| panic!("no role {id}"))
}

/// Add a standalone role and point `function` at it
pub fn give_own_role(template: &mut Template, function: &str, role_id: &str) {
    template.insert(
        LogicalId::new(role_id),
        ResourceNode::try_from(role_node_json()).unwrap(),
    );
    let id = ServerlessNaming.compute_resource_id(function);
    if let Some(ResourceNode::Function(compute)) = template.get_mut(id.as_str()) {
        compute.properties.role = Some(ialogs_template::RoleReference::arn_of(role_id));
    }
}
