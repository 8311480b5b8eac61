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

use mqtt_dispatcher::{DispatcherConfig, QoS, RuleOptions};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    #[serde(default)]
    pub(crate) dispatcher: DispatcherConfig,
    pub(crate) rules: Vec<RuleConfig>,
    #[serde(default)]
    pub(crate) publish: Vec<PublishConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub(crate) pattern: String,
    #[serde(default)]
    pub(crate) subscription_key: Option<String>,
    #[serde(default)]
    pub(crate) qos: Option<QoS>,
}

impl RuleConfig {
    pub(crate) fn options(&self) -> RuleOptions {
        RuleOptions {
            subscription_key: self.subscription_key.clone(),
            qos: self.qos,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    pub(crate) topic: String,
    pub(crate) payload: String,
}

#[cfg(test)]
mod tests {
    use super::DemoConfig;

    #[test]
    fn bundled_demo_config_parses() {
        let contents = include_str!("../config/demo.json5");
        let config: DemoConfig = json5::from_str(contents).expect("demo config should parse");

        assert!(config.dispatcher.handle_subscriptions);
        assert_eq!(config.rules.len(), 4);
        assert_eq!(
            config.rules[3].options().subscription_key.as_deref(),
            Some("mqtt-dispatcher/status/+")
        );
        assert_eq!(config.publish.len(), 5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<DemoConfig, _> = json5::from_str("{ rules: [], extra: 1 }");

        assert!(result.is_err());
    }
}
