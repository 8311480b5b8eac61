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

//! Translates rule-table changes into the minimal set of transport calls.

use crate::config::QoS;
use crate::control_plane::pending_ops::{PendingOps, PendingSubscriptionOp};
use crate::control_plane::rule_table::{RemovalPlan, Rule, RuleTable};
use crate::error::TransportError;
use crate::observability::{events, fields};
use crate::transport::{GrantedSubscription, PubSubTransport, SubscribeOptions};
use tracing::debug;

const COMPONENT: &str = "subscription_coordinator";

/// Subscribe call decided under the dispatcher lock, executed outside it.
pub(crate) struct SubscribeCall {
    key: String,
    options: SubscribeOptions,
    pending: PendingSubscriptionOp,
}

impl SubscribeCall {
    pub(crate) async fn execute(
        mut self,
        transport: &dyn PubSubTransport,
    ) -> Result<Vec<GrantedSubscription>, TransportError> {
        self.pending.wait_for_predecessors().await;

        debug!(
            event = events::SUBSCRIBE_START,
            component = COMPONENT,
            subscription_key = self.key.as_str(),
            qos = u8::from(self.options.qos),
            reason = fields::REASON_FIRST_RULE_FOR_KEY,
            "subscribing"
        );

        let granted = transport
            .subscribe(std::slice::from_ref(&self.key), self.options)
            .await?;

        debug!(
            event = events::SUBSCRIBE_OK,
            component = COMPONENT,
            subscription_key = self.key.as_str(),
            granted = granted.len(),
            "subscribed"
        );

        Ok(granted)
    }
}

/// Batched unsubscribe call decided under the dispatcher lock, executed outside it.
pub(crate) struct UnsubscribeCall {
    keys: Vec<String>,
    reason: &'static str,
    pending: PendingSubscriptionOp,
}

impl UnsubscribeCall {
    pub(crate) async fn execute(
        mut self,
        transport: &dyn PubSubTransport,
    ) -> Result<Vec<String>, TransportError> {
        self.pending.wait_for_predecessors().await;

        let keys = fields::format_keys(&self.keys);
        debug!(
            event = events::UNSUBSCRIBE_START,
            component = COMPONENT,
            subscription_keys = keys.as_str(),
            reason = self.reason,
            "unsubscribing"
        );

        transport.unsubscribe(&self.keys).await?;

        debug!(
            event = events::UNSUBSCRIBE_OK,
            component = COMPONENT,
            subscription_keys = keys.as_str(),
            "unsubscribed"
        );

        Ok(std::mem::take(&mut self.keys))
    }
}

/// Reference-counts subscription keys against the rule table.
pub(crate) struct SubscriptionCoordinator {
    handle_subscriptions: bool,
    pending: PendingOps,
}

impl SubscriptionCoordinator {
    pub(crate) fn new(handle_subscriptions: bool) -> Self {
        Self {
            handle_subscriptions,
            pending: PendingOps::new(),
        }
    }

    /// Must run right after `rule` was inserted into `table`, under the same lock.
    pub(crate) fn on_rule_added(
        &self,
        table: &RuleTable,
        rule: &Rule,
        qos: QoS,
    ) -> Option<SubscribeCall> {
        if !self.handle_subscriptions || table.count_key(&rule.subscription_key) != 1 {
            return None;
        }

        let key = rule.subscription_key.clone();
        let pending = self.pending.register(std::slice::from_ref(&key));
        Some(SubscribeCall {
            key,
            options: SubscribeOptions { qos },
            pending,
        })
    }

    pub(crate) fn on_rules_removed(&self, plan: &RemovalPlan) -> Option<UnsubscribeCall> {
        if !self.handle_subscriptions {
            return None;
        }

        self.unsubscribe(plan.released_keys(), fields::REASON_NO_REMAINING_RULES)
    }

    pub(crate) fn on_destroy(&self, keys: Vec<String>) -> Option<UnsubscribeCall> {
        if !self.handle_subscriptions {
            return None;
        }

        self.unsubscribe(keys, fields::REASON_DESTROY)
    }

    pub(crate) fn pending_keys(&self) -> usize {
        self.pending.pending_keys()
    }

    fn unsubscribe(&self, keys: Vec<String>, reason: &'static str) -> Option<UnsubscribeCall> {
        if keys.is_empty() {
            return None;
        }

        let pending = self.pending.register(&keys);
        Some(UnsubscribeCall {
            keys,
            reason,
            pending,
        })
    }
}
