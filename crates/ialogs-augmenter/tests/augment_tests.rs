//! End-to-end augmentation tests against realistic compiled templates

use ialogs_augmenter::{
    augment, log_write_statement, AugmentError, AugmenterOptions, IntegrationError,
    ResourceAugmenter, ServerlessNaming, ServiceConfig, SettingScope, ValidationError,
    ROLE_POLICY_NAME,
};
use ialogs_template::{LogicalId, ResourceNode};
use ialogs_test_utils::{
    compiled_template, compute, give_own_role, ia_log_group, init_tracing, role, service, ROLE_ID,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn logging_target(service: &ServiceConfig, function: &str) -> Option<String> {
    compute(&service.template, function)
        .properties
        .logging_config
        .as_ref()
        .and_then(|config| config.log_group_str())
        .map(str::to_string)
}

fn run(service: &mut ServiceConfig) -> Result<ialogs_augmenter::AugmentReport, AugmentError> {
    init_tracing();
    augment(service, &ServerlessNaming)
}

#[test]
fn global_enrollment_applies_without_local_setting() {
    let mut svc = service(json!({
        "functions": {"func1": {"handler": "handler.func1"}},
        "custom": {"infrequentAccessLogs": true}
    }));

    run(&mut svc).unwrap();

    let node = compute(&svc.template, "func1");
    assert_eq!(
        node.depends_on,
        vec![LogicalId::new("func1PluginIALogGroup"), LogicalId::new("Func1LogGroup")]
    );
    assert_eq!(logging_target(&svc, "func1").as_deref(), Some("func1PluginIALogGroup"));
}

#[test]
fn local_false_beats_global_true() {
    let mut svc = service(json!({
        "functions": {"func1": {"infrequentAccessLogs": false}},
        "custom": {"infrequentAccessLogs": true}
    }));
    let compute_before = compute(&svc.template, "func1").clone();

    run(&mut svc).unwrap();

    assert_eq!(logging_target(&svc, "func1"), None);
    assert_eq!(compute(&svc.template, "func1"), &compute_before);
    assert!(svc.template.contains("func1PluginIALogGroup"));
}

#[test]
fn local_true_beats_global_false() {
    let mut svc = service(json!({
        "functions": {"func1": {"infrequentAccessLogs": true}, "func2": {}},
        "custom": {"infrequentAccessLogs": false}
    }));

    let report = run(&mut svc).unwrap();

    assert_eq!(logging_target(&svc, "func1").as_deref(), Some("func1PluginIALogGroup"));
    assert_eq!(logging_target(&svc, "func2"), None);
    assert_eq!(report.enrolled_count(), 1);
}

#[test]
fn neither_set_creates_log_group_only() {
    let mut svc = service(json!({"functions": {"func1": {}}}));

    run(&mut svc).unwrap();

    assert_eq!(logging_target(&svc, "func1"), None);
    let group = ia_log_group(&svc.template, "func1");
    assert_eq!(group.properties.name_str(), Some("/aws/lambda/plugin/ia/func1"));
    assert_eq!(group.properties.class_str(), Some("INFREQUENT_ACCESS"));
    assert_eq!(group.properties.retention_days(), None);
}

#[test]
fn global_retention_flows_to_enrolled_function() {
    let mut svc = service(json!({
        "functions": {"func1": {}},
        "custom": {"infrequentAccessLogs": true, "infrequentAccessLogRetention": 30}
    }));

    run(&mut svc).unwrap();

    assert_eq!(ia_log_group(&svc.template, "func1").properties.retention_days(), Some(30));
    assert!(logging_target(&svc, "func1").is_some());
}

#[test]
fn retention_precedence() {
    let mut svc = service(json!({
        "functions": {
            "local": {"infrequentAccessLogRetention": 7},
            "inherit": {}
        },
        "custom": {"infrequentAccessLogRetention": 30}
    }));

    run(&mut svc).unwrap();

    assert_eq!(ia_log_group(&svc.template, "local").properties.retention_days(), Some(7));
    assert_eq!(ia_log_group(&svc.template, "inherit").properties.retention_days(), Some(30));

    let mut svc = service(json!({"functions": {"plain": {}}}));
    run(&mut svc).unwrap();

    let rendered = svc.template.to_value().unwrap();
    assert!(rendered["Resources"]["plainPluginIALogGroup"]["Properties"]
        .get("RetentionInDays")
        .is_none());
}

#[test]
fn string_boolean_is_rejected_at_either_scope() {
    let mut global = service(json!({
        "functions": {"func1": {}},
        "custom": {"infrequentAccessLogs": "false"}
    }));
    let err = run(&mut global).unwrap_err();
    assert!(matches!(
        err,
        AugmentError::Validation(ValidationError::InvalidBoolean { scope: SettingScope::Global, .. })
    ));
    assert!(err
        .to_string()
        .contains("infrequentAccessLogs must be either boolean true or false"));

    let mut local = service(json!({"functions": {"func1": {"infrequentAccessLogs": "false"}}}));
    let err = run(&mut local).unwrap_err();
    match err {
        AugmentError::Validation(ValidationError::InvalidBoolean { scope, value }) => {
            assert_eq!(scope, SettingScope::function("func1"));
            assert_eq!(value, json!("false"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unlisted_retention_is_rejected_at_either_scope() {
    let mut global = service(json!({
        "functions": {"func1": {}},
        "custom": {"infrequentAccessLogRetention": 4}
    }));
    let err = run(&mut global).unwrap_err();
    assert!(err.is_validation());
    assert!(err
        .to_string()
        .contains("infrequentAccessLogRetention must be one of 1,3,5,7,14,30,60,90,120,150,180,365,400,545,731,1096,1827,2192,2557,2922,3288,3653"));

    let mut local = service(json!({"functions": {"func1": {"infrequentAccessLogRetention": 4}}}));
    let err = run(&mut local).unwrap_err();
    match err {
        AugmentError::Validation(ValidationError::InvalidRetention { scope, value }) => {
            assert_eq!(scope, SettingScope::function("func1"));
            assert_eq!(value, json!(4));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn falsy_local_retention_inherits_global() {
    for falsy in [json!(0), json!(false), json!(""), json!(null)] {
        let mut svc = service(json!({
            "functions": {"func1": {"infrequentAccessLogRetention": falsy}},
            "custom": {"infrequentAccessLogRetention": 30}
        }));
        run(&mut svc).unwrap();
        assert_eq!(ia_log_group(&svc.template, "func1").properties.retention_days(), Some(30));
    }
}

#[test]
fn zero_global_retention_means_never_expires() {
    let mut svc = service(json!({
        "functions": {"func1": {}},
        "custom": {"infrequentAccessLogs": true, "infrequentAccessLogRetention": 0}
    }));

    let report = run(&mut svc).unwrap();

    assert!(report.get("func1").is_some_and(|o| o.enrolled && o.retention.is_none()));
    let rendered = svc.template.to_value().unwrap();
    assert!(rendered["Resources"]["func1PluginIALogGroup"]["Properties"]
        .get("RetentionInDays")
        .is_none());
}

#[test]
fn second_pass_changes_nothing() {
    let mut svc = service(json!({
        "functions": {"func1": {}, "func2": {"infrequentAccessLogs": false}},
        "custom": {"infrequentAccessLogs": true, "infrequentAccessLogRetention": 14}
    }));
    let augmenter = ResourceAugmenter::new(AugmenterOptions::extended());

    augmenter.augment(&mut svc, &ServerlessNaming).unwrap();
    let once = svc.template.clone();
    let report = augmenter.augment(&mut svc, &ServerlessNaming).unwrap();

    assert_eq!(svc.template, once);
    assert_eq!(report.statements_added(), 0);
    let depends_on = &compute(&svc.template, "func1").depends_on;
    assert_eq!(
        depends_on.iter().filter(|id| id.as_str() == "func1PluginIALogGroup").count(),
        1
    );
}

#[test]
fn shared_role_gets_one_statement_per_function_in_order() {
    let mut svc = service(json!({
        "functions": {"zeta": {}, "alpha": {}, "off": {"infrequentAccessLogs": false}},
        "custom": {"infrequentAccessLogs": true}
    }));
    let augmenter = ResourceAugmenter::new(AugmenterOptions::new().with_role_grants(true));

    let report = augmenter.augment(&mut svc, &ServerlessNaming).unwrap();
    assert_eq!(report.statements_added(), 2);

    let policy = role(&svc.template, ROLE_ID)
        .properties
        .inline_policy(ROLE_POLICY_NAME)
        .unwrap();
    assert_eq!(
        policy.policy_document.statement,
        vec![
            log_write_statement("/aws/lambda/plugin/ia/zeta"),
            log_write_statement("/aws/lambda/plugin/ia/alpha"),
        ]
    );

    let report = augmenter.augment(&mut svc, &ServerlessNaming).unwrap();
    assert_eq!(report.statements_added(), 0);
    let policy = role(&svc.template, ROLE_ID)
        .properties
        .inline_policy(ROLE_POLICY_NAME)
        .unwrap();
    assert_eq!(policy.policy_document.statement.len(), 2);
}

#[test]
fn grants_land_on_the_function_own_role() {
    let mut svc = service(json!({
        "functions": {"func1": {}, "func2": {}},
        "custom": {"infrequentAccessLogs": true}
    }));
    give_own_role(&mut svc.template, "func2", "Func2Role");

    ResourceAugmenter::new(AugmenterOptions::new().with_role_grants(true))
        .augment(&mut svc, &ServerlessNaming)
        .unwrap();

    let shared = role(&svc.template, ROLE_ID).properties.inline_policy(ROLE_POLICY_NAME).unwrap();
    let own = role(&svc.template, "Func2Role").properties.inline_policy(ROLE_POLICY_NAME).unwrap();
    assert_eq!(shared.policy_document.statement, vec![log_write_statement("/aws/lambda/plugin/ia/func1")]);
    assert_eq!(own.policy_document.statement, vec![log_write_statement("/aws/lambda/plugin/ia/func2")]);
}

#[test]
fn display_name_paths_keep_logical_id_addressing() {
    let mut svc = service(json!({
        "functions": {"func1": {"name": "svc-dev-func1"}, "func2": {}},
        "custom": {"infrequentAccessLogs": true}
    }));

    ResourceAugmenter::new(AugmenterOptions::extended())
        .augment(&mut svc, &ServerlessNaming)
        .unwrap();

    assert_eq!(
        ia_log_group(&svc.template, "func1").properties.name_str(),
        Some("/aws/lambda/plugin/ia/svc-dev-func1")
    );
    assert_eq!(
        ia_log_group(&svc.template, "func2").properties.name_str(),
        Some("/aws/lambda/plugin/ia/func2")
    );
    assert_eq!(logging_target(&svc, "func1").as_deref(), Some("func1PluginIALogGroup"));

    let policy = role(&svc.template, ROLE_ID).properties.inline_policy(ROLE_POLICY_NAME).unwrap();
    assert_eq!(policy.policy_document.statement[0], log_write_statement("/aws/lambda/plugin/ia/svc-dev-func1"));
}

#[test]
fn dashed_function_names_resolve_through_naming() {
    let mut svc = service(json!({
        "functions": {"my-func_v2": {"infrequentAccessLogs": true}}
    }));

    run(&mut svc).unwrap();

    assert!(svc.template.contains("MyDashfuncUnderscorev2LambdaFunction"));
    assert_eq!(logging_target(&svc, "my-func_v2").as_deref(), Some("my-func_v2PluginIALogGroup"));
}

#[test]
fn missing_compute_node_fails_without_mutation() {
    let mut svc = service(json!({
        "functions": {"func1": {}, "ghost": {}},
        "custom": {"infrequentAccessLogs": true}
    }));
    svc.template = compiled_template(&["func1"]);
    let before = svc.template.to_json().unwrap();

    let err = run(&mut svc).unwrap_err();

    assert!(err.is_integration());
    assert!(matches!(
        err,
        AugmentError::Integration(IntegrationError::MissingComputeResource { ref function, .. })
            if function == "ghost"
    ));
    assert_eq!(svc.template.to_json().unwrap(), before);
}

#[test]
fn missing_role_fails_without_mutation() {
    let mut svc = service(json!({
        "functions": {"func1": {}},
        "custom": {"infrequentAccessLogs": true}
    }));
    svc.template.resources_mut().shift_remove(ROLE_ID);
    let before = svc.template.clone();

    let err = ResourceAugmenter::new(AugmenterOptions::extended())
        .augment(&mut svc, &ServerlessNaming)
        .unwrap_err();

    assert!(matches!(err, AugmentError::Integration(IntegrationError::MissingRole { .. })));
    assert_eq!(svc.template, before);
}

#[test]
fn external_role_is_left_alone() {
    let mut svc = service(json!({
        "functions": {"func1": {}},
        "custom": {"infrequentAccessLogs": true}
    }));
    if let Some(ResourceNode::Function(node)) = svc.template.get_mut("Func1LambdaFunction") {
        node.properties.role = Some(json!("arn:aws:iam::123456789012:role/shared").into());
    }

    let report = ResourceAugmenter::new(AugmenterOptions::extended())
        .augment(&mut svc, &ServerlessNaming)
        .unwrap();

    assert!(report.get("func1").is_some_and(|o| o.enrolled && !o.policy_statement_added));
    assert!(role(&svc.template, ROLE_ID).properties.inline_policy(ROLE_POLICY_NAME).is_none());
}

#[test]
fn untouched_resources_survive_round_trip() {
    let mut svc = service(json!({
        "functions": {"func1": {}},
        "custom": {"infrequentAccessLogs": true}
    }));

    run(&mut svc).unwrap();

    let rendered = svc.template.to_value().unwrap();
    assert_eq!(rendered["AWSTemplateFormatVersion"], json!("2010-09-09"));
    assert_eq!(
        rendered["Resources"]["Func1LambdaFunction"]["Properties"]["Handler"],
        json!("handler.func1")
    );
    assert_eq!(
        rendered["Resources"][ROLE_ID]["Properties"]["AssumeRolePolicyDocument"]["Statement"][0]["Action"],
        json!(["sts:AssumeRole"])
    );
    assert_eq!(
        rendered["Resources"]["func1PluginIALogGroup"],
        json!({
            "Type": "AWS::Logs::LogGroup",
            "Properties": {
                "LogGroupName": "/aws/lambda/plugin/ia/func1",
                "LogGroupClass": "INFREQUENT_ACCESS"
            }
        })
    );
}

#[test]
fn yaml_service_description() {
    let yaml = r"
functions:
  hello:
    handler: handler.hello
    infrequentAccessLogRetention: 90
custom:
  infrequentAccessLogs: true
template:
  Resources:
    HelloLambdaFunction:
      Type: AWS::Lambda::Function
      Properties:
        Handler: handler.hello
";
    let mut svc = ServiceConfig::from_yaml(yaml).unwrap();

    run(&mut svc).unwrap();

    assert_eq!(ia_log_group(&svc.template, "hello").properties.retention_days(), Some(90));
    assert_eq!(
        compute(&svc.template, "hello").depends_on,
        vec![LogicalId::new("helloPluginIALogGroup")]
    );
}
