//! Property tests for settings precedence and repeated passes

use ialogs_augmenter::{
    AugmenterOptions, ResourceAugmenter, ServerlessNaming, ROLE_POLICY_NAME, VALID_RETENTION_DAYS,
};
use ialogs_test_utils::{compute, ia_log_group, role, service, ROLE_ID};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone)]
struct Settings {
    enrolled: Option<bool>,
    retention: Option<u32>,
}

impl Settings {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        if let Some(enrolled) = self.enrolled {
            map.insert("infrequentAccessLogs".to_string(), json!(enrolled));
        }
        if let Some(days) = self.retention {
            map.insert("infrequentAccessLogRetention".to_string(), json!(days));
        }
        Value::Object(map)
    }
}

fn settings() -> impl Strategy<Value = Settings> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(proptest::sample::select(VALID_RETENTION_DAYS.to_vec())),
    )
        .prop_map(|(enrolled, retention)| Settings { enrolled, retention })
}

fn description(global: &Settings, locals: &[Settings]) -> Value {
    let functions: Map<String, Value> = locals
        .iter()
        .enumerate()
        .map(|(i, local)| (format!("fn{i}"), local.to_json()))
        .collect();
    json!({"functions": functions, "custom": global.to_json()})
}

proptest! {
    #[test]
    fn local_setting_wins_per_field(
        global in settings(),
        locals in proptest::collection::vec(settings(), 1..5),
    ) {
        let mut svc = service(description(&global, &locals));

        let report = ResourceAugmenter::default()
            .augment(&mut svc, &ServerlessNaming)
            .unwrap();

        for (i, local) in locals.iter().enumerate() {
            let function = format!("fn{i}");
            let enrolled = local.enrolled.or(global.enrolled).unwrap_or(false);
            let retention = local.retention.or(global.retention).map(u64::from);

            prop_assert_eq!(report.get(&function).map(|o| o.enrolled), Some(enrolled));
            prop_assert_eq!(
                ia_log_group(&svc.template, &function).properties.retention_days(),
                retention
            );
            prop_assert_eq!(
                compute(&svc.template, &function).properties.logging_config.is_some(),
                enrolled
            );
        }
    }

    #[test]
    fn repeated_passes_are_stable(
        global in settings(),
        locals in proptest::collection::vec(settings(), 1..5),
        passes in 2usize..4,
    ) {
        let mut svc = service(description(&global, &locals));
        let augmenter = ResourceAugmenter::new(AugmenterOptions::extended());

        augmenter.augment(&mut svc, &ServerlessNaming).unwrap();
        let once = svc.template.clone();
        for _ in 1..passes {
            augmenter.augment(&mut svc, &ServerlessNaming).unwrap();
        }

        prop_assert_eq!(&svc.template, &once);

        let enrolled = locals
            .iter()
            .filter(|local| local.enrolled.or(global.enrolled).unwrap_or(false))
            .count();
        let statements = role(&svc.template, ROLE_ID)
            .properties
            .inline_policy(ROLE_POLICY_NAME)
            .map_or(0, |policy| policy.policy_document.statement.len());
        prop_assert_eq!(statements, enrolled);
    }
}
