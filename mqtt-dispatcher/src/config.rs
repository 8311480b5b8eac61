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

//! Dispatcher and per-rule configuration.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Delivery guarantee requested from the transport.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidQoS(pub u8);

impl Display for InvalidQoS {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid QoS level {}, expected 0, 1 or 2", self.0)
    }
}

impl Error for InvalidQoS {}

impl TryFrom<u8> for QoS {
    type Error = InvalidQoS;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(InvalidQoS(other)),
        }
    }
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> Self {
        qos as u8
    }
}

fn default_handle_subscriptions() -> bool {
    true
}

/// Dispatcher-wide settings.
///
/// ```
/// use mqtt_dispatcher::{DispatcherConfig, QoS};
///
/// let config = DispatcherConfig::from_json5_str("{ qos: 1 }").unwrap();
/// assert_eq!(config.qos, QoS::AtLeastOnce);
/// assert!(config.handle_subscriptions);
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Forwarded on every subscribe call unless the rule sets its own.
    #[serde(default)]
    pub qos: QoS,
    /// When `false` the dispatcher never subscribes or unsubscribes; the caller
    /// keeps the transport fed (for example through a standing `#` subscription).
    #[serde(default = "default_handle_subscriptions")]
    pub handle_subscriptions: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            qos: QoS::default(),
            handle_subscriptions: default_handle_subscriptions(),
        }
    }
}

impl DispatcherConfig {
    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_handle_subscriptions(mut self, handle_subscriptions: bool) -> Self {
        self.handle_subscriptions = handle_subscriptions;
        self
    }

    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        json5::from_str(contents).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json5_str(&contents)
    }
}

/// Failures while loading a [`DispatcherConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(json5::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "unable to parse config file: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

/// Per-rule overrides accepted by `Dispatcher::add_rule`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleOptions {
    /// Transport subscription backing the rule; defaults to the rule's pattern.
    /// Several rules may share one broader key such as `cmd/+`.
    #[serde(default)]
    pub subscription_key: Option<String>,
    /// Overrides the dispatcher-level QoS for this rule's subscribe call.
    #[serde(default)]
    pub qos: Option<QoS>,
}

impl RuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription_key(mut self, subscription_key: impl Into<String>) -> Self {
        self.subscription_key = Some(subscription_key.into());
        self
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = Some(qos);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DispatcherConfig, InvalidQoS, QoS, RuleOptions};
    use std::error::Error;

    #[test]
    fn defaults_match_an_unconfigured_dispatcher() {
        let config = DispatcherConfig::default();

        assert_eq!(config.qos, QoS::AtMostOnce);
        assert!(config.handle_subscriptions);
        assert_eq!(DispatcherConfig::from_json5_str("{}").unwrap(), config);
    }

    #[test]
    fn json5_overrides_every_field() {
        let config = DispatcherConfig::from_json5_str(
            r#"{
                // comments are allowed
                qos: 2,
                handle_subscriptions: false,
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.qos, QoS::ExactlyOnce);
        assert!(!config.handle_subscriptions);
    }

    #[test]
    fn json5_rejects_unknown_fields_and_bad_qos() {
        assert!(matches!(
            DispatcherConfig::from_json5_str("{ qos: 0, retries: 3 }"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DispatcherConfig::from_json5_str("{ qos: 7 }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_io_error_with_source() {
        let err = DispatcherConfig::from_file("/definitely/not/here.json5")
            .expect_err("missing file should fail");

        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("unable to read config file"));
    }

    #[test]
    fn qos_converts_to_and_from_levels() {
        assert_eq!(QoS::try_from(1), Ok(QoS::AtLeastOnce));
        assert_eq!(QoS::try_from(3), Err(InvalidQoS(3)));
        assert_eq!(u8::from(QoS::ExactlyOnce), 2);
        assert_eq!(serde_json::to_string(&QoS::AtLeastOnce).unwrap(), "1");
    }

    #[test]
    fn rule_options_builder_sets_overrides() {
        let options = RuleOptions::new()
            .with_subscription_key("cmd/+")
            .with_qos(QoS::AtLeastOnce);

        assert_eq!(options.subscription_key.as_deref(), Some("cmd/+"));
        assert_eq!(options.qos, Some(QoS::AtLeastOnce));
    }
}
