/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use integration_test_utils::RecordingTransport;
use mqtt_dispatcher::{Dispatcher, DispatcherConfig, GrantedSubscription, QoS, RuleOptions};
use std::sync::Arc;

pub(crate) fn make_dispatcher(
    transport: &Arc<RecordingTransport>,
    config: DispatcherConfig,
) -> Dispatcher {
    integration_test_utils::init_logging();
    Dispatcher::new(transport.clone(), config)
}

#[allow(dead_code)]
pub(crate) fn granted(topic: &str) -> GrantedSubscription {
    GrantedSubscription {
        topic: topic.to_string(),
        qos: QoS::AtMostOnce,
    }
}

#[allow(dead_code)]
pub(crate) fn shared_key(key: &str) -> RuleOptions {
    RuleOptions::new().with_subscription_key(key)
}

/// `(pattern, subscription_key)` of every live rule, in insertion order.
#[allow(dead_code)]
pub(crate) fn rule_pairs(dispatcher: &Dispatcher) -> Vec<(String, String)> {
    dispatcher
        .rules()
        .into_iter()
        .map(|rule| (rule.pattern, rule.subscription_key))
        .collect()
}

#[allow(dead_code)]
pub(crate) fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter()
        .map(|(pattern, key)| (pattern.to_string(), key.to_string()))
        .collect()
}
