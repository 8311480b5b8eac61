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

//! `Dispatcher` facade: rule registration, subscription sharing and message routing.

use crate::config::{DispatcherConfig, RuleOptions};
use crate::control_plane::rule_table::{Rule, RuleTable};
use crate::control_plane::subscription_coordinator::SubscriptionCoordinator;
use crate::data_plane::fan_out::{self, DispatchReport};
use crate::data_plane::ingress_listener::IngressListener;
use crate::error::DispatcherError;
use crate::handler::HandlerRef;
use crate::observability::{events, fields};
use crate::routing::pattern_matcher::PatternMatcher;
use crate::routing::topic_pattern::TopicPattern;
use crate::runtime::completion::Completion;
use crate::transport::{GrantedSubscription, Message, MessageListener, PubSubTransport};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tracing::debug;

const COMPONENT: &str = "dispatcher";

/// Outcome of a successful [`Dispatcher::add_rule`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddRuleOutcome {
    pub pattern: String,
    /// Subscriptions granted by the transport; empty when the key was already in use.
    pub subscribed: Vec<GrantedSubscription>,
}

/// Outcome of a successful [`Dispatcher::remove_rule`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoveRuleOutcome {
    pub pattern: String,
    /// Subscription keys released at the transport.
    pub unsubscribed: Vec<String>,
}

/// Outcome of a successful [`Dispatcher::destroy`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DestroyOutcome {
    pub unsubscribed: Vec<String>,
}

/// A live rule as listed by [`Dispatcher::rules`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleSnapshot {
    pub pattern: String,
    pub subscription_key: String,
    pub handler: HandlerRef,
}

struct DispatcherState {
    destroyed: bool,
    rules: RuleTable,
    matcher: PatternMatcher,
    coordinator: SubscriptionCoordinator,
}

pub(crate) struct DispatcherCore {
    transport: Arc<dyn PubSubTransport>,
    config: DispatcherConfig,
    runtime: Handle,
    state: Mutex<DispatcherState>,
}

impl DispatcherCore {
    fn new(transport: Arc<dyn PubSubTransport>, config: DispatcherConfig, runtime: Handle) -> Self {
        let coordinator = SubscriptionCoordinator::new(config.handle_subscriptions);
        Self {
            transport,
            config,
            runtime,
            state: Mutex::new(DispatcherState {
                destroyed: false,
                rules: RuleTable::new(),
                matcher: PatternMatcher::new(),
                coordinator,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, DispatcherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Matches under the lock, invokes handlers after releasing it.
    pub(crate) fn dispatch(&self, message: &Message) -> DispatchReport {
        let matched = {
            let state = self.lock_state();
            if state.destroyed {
                debug!(
                    event = events::INGRESS_AFTER_DESTROY,
                    component = COMPONENT,
                    topic = message.topic.as_str(),
                    "ignoring message delivered after destroy"
                );
                return DispatchReport::default();
            }
            state.matcher.matches(&message.topic)
        };

        fan_out::deliver(matched, message)
    }
}

///
/// [`Dispatcher`] routes inbound messages of a pub/sub transport to rule handlers
/// while keeping transport subscriptions reference-counted.
///
/// Every operation runs in two phases. The synchronous call validates the request,
/// updates the rule table and decides which transport call (if any) is needed;
/// rules are visible to inbound messages as soon as it returns. The returned
/// [`Completion`] resolves once that transport call has finished.
///
/// A transport failure is reported through the completion and does not roll the
/// rule table back.
///
/// # Panics
///
/// [`Dispatcher::new`] must be called from within a Tokio runtime; use
/// [`Dispatcher::with_runtime`] to supply one explicitly.
pub struct Dispatcher {
    core: Arc<DispatcherCore>,
    listener: Arc<dyn MessageListener>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn PubSubTransport>, config: DispatcherConfig) -> Self {
        Self::with_runtime(transport, config, Handle::current())
    }

    /// Builds a dispatcher whose transport calls run on `runtime`.
    pub fn with_runtime(
        transport: Arc<dyn PubSubTransport>,
        config: DispatcherConfig,
        runtime: Handle,
    ) -> Self {
        debug!(
            event = events::DISPATCHER_CREATE,
            component = COMPONENT,
            qos = u8::from(config.qos),
            handle_subscriptions = config.handle_subscriptions,
            "creating dispatcher"
        );

        let core = Arc::new(DispatcherCore::new(transport.clone(), config, runtime));
        let listener: Arc<dyn MessageListener> =
            Arc::new(IngressListener::new(Arc::downgrade(&core)));
        transport.add_message_listener(listener.clone());

        Self { core, listener }
    }

    /// Registers `handler` for topics matching `pattern`.
    ///
    /// Subscribes at the transport only when no other live rule uses the rule's
    /// subscription key (`options.subscription_key`, or `pattern` itself).
    ///
    /// # Errors
    ///
    /// Fails without touching any state when the dispatcher was destroyed, the
    /// pattern or key is malformed, or the (pattern, handler) pair is already
    /// registered. A destroyed dispatcher reports [`DispatcherError::Destroyed`]
    /// whatever the arguments.
    pub fn add_rule(
        &self,
        pattern: &str,
        handler: HandlerRef,
        options: RuleOptions,
    ) -> Result<Completion<AddRuleOutcome>, DispatcherError> {
        let qos = options.qos.unwrap_or(self.core.config.qos);

        let call = {
            let mut guard = self.core.lock_state();
            let state = &mut *guard;
            if state.destroyed {
                return Err(DispatcherError::Destroyed);
            }

            let topic_pattern = TopicPattern::parse(pattern)?;
            let subscription_key = match options.subscription_key {
                Some(key) => TopicPattern::parse(&key)?.to_string(),
                None => pattern.to_string(),
            };
            let rule = Rule::new(topic_pattern, handler, subscription_key);
            if !state.rules.try_add(rule.clone()) {
                return Err(DispatcherError::DuplicateRule {
                    pattern: pattern.to_string(),
                });
            }
            state.matcher.add(&rule.pattern, rule.handler.clone());
            let call = state.coordinator.on_rule_added(&state.rules, &rule, qos);

            debug!(
                event = events::RULE_ADD_OK,
                component = COMPONENT,
                pattern,
                subscription_key = rule.subscription_key.as_str(),
                subscribe_required = call.is_some(),
                rules = state.rules.len(),
                "rule added"
            );
            call
        };

        let pattern = pattern.to_string();
        let Some(call) = call else {
            return Ok(Completion::ready(Ok(AddRuleOutcome {
                pattern,
                subscribed: Vec::new(),
            })));
        };

        let transport = self.core.transport.clone();
        Ok(Completion::spawn(&self.core.runtime, async move {
            let subscribed = call.execute(transport.as_ref()).await?;
            Ok(AddRuleOutcome {
                pattern,
                subscribed,
            })
        }))
    }

    /// Removes the rule `(pattern, handler)`, or every rule under `pattern` when
    /// `handler` is `None`.
    ///
    /// Unsubscribes, in one batched call, every key that no surviving rule uses.
    ///
    /// # Errors
    ///
    /// Fails without touching any state when the dispatcher was destroyed or no
    /// live rule matches the request.
    pub fn remove_rule(
        &self,
        pattern: &str,
        handler: Option<&HandlerRef>,
    ) -> Result<Completion<RemoveRuleOutcome>, DispatcherError> {
        let call = {
            let mut guard = self.core.lock_state();
            let state = &mut *guard;
            if state.destroyed {
                return Err(DispatcherError::Destroyed);
            }

            let plan = state.rules.remove_matching(pattern, handler).ok_or_else(|| {
                DispatcherError::ExtraneousRule {
                    pattern: pattern.to_string(),
                }
            })?;
            for rule in &plan.removed {
                state.matcher.remove(&rule.pattern, Some(&rule.handler));
            }
            let call = state.coordinator.on_rules_removed(&plan);

            debug!(
                event = events::RULE_REMOVE_OK,
                component = COMPONENT,
                pattern,
                handler_given = handler.is_some(),
                removed = plan.removed.len(),
                unsubscribe_required = call.is_some(),
                rules = state.rules.len(),
                "rules removed"
            );
            call
        };

        let pattern = pattern.to_string();
        let Some(call) = call else {
            return Ok(Completion::ready(Ok(RemoveRuleOutcome {
                pattern,
                unsubscribed: Vec::new(),
            })));
        };

        let transport = self.core.transport.clone();
        Ok(Completion::spawn(&self.core.runtime, async move {
            let unsubscribed = call.execute(transport.as_ref()).await?;
            Ok(RemoveRuleOutcome {
                pattern,
                unsubscribed,
            })
        }))
    }

    /// Detaches from the transport, drops every rule and releases every
    /// outstanding subscription in one batched call.
    ///
    /// The dispatcher stays destroyed even when that call fails.
    ///
    /// # Errors
    ///
    /// Fails with [`DispatcherError::Destroyed`] on every call after the first.
    pub fn destroy(&self) -> Result<Completion<DestroyOutcome>, DispatcherError> {
        let call = {
            let mut guard = self.core.lock_state();
            let state = &mut *guard;
            if state.destroyed {
                return Err(DispatcherError::Destroyed);
            }

            state.destroyed = true;
            let keys = state.rules.remove_all();
            state.matcher.clear();

            debug!(
                event = events::DISPATCHER_DESTROY,
                component = COMPONENT,
                subscription_keys = fields::format_keys(&keys),
                pending_keys = state.coordinator.pending_keys(),
                "destroying dispatcher"
            );
            state.coordinator.on_destroy(keys)
        };

        self.core
            .transport
            .remove_message_listener(&self.listener);

        let Some(call) = call else {
            return Ok(Completion::ready(Ok(DestroyOutcome::default())));
        };

        let transport = self.core.transport.clone();
        Ok(Completion::spawn(&self.core.runtime, async move {
            let unsubscribed = call.execute(transport.as_ref()).await?;
            Ok(DestroyOutcome { unsubscribed })
        }))
    }

    /// Delivers `message` to every handler whose pattern matches its topic.
    ///
    /// This is what the transport listener calls for each inbound message; it is
    /// public so callers with their own receive loop can feed messages directly.
    pub fn dispatch(&self, message: &Message) -> DispatchReport {
        self.core.dispatch(message)
    }

    /// Live rules in insertion order.
    pub fn rules(&self) -> Vec<RuleSnapshot> {
        self.core
            .lock_state()
            .rules
            .iter()
            .map(|rule| RuleSnapshot {
                pattern: rule.pattern.to_string(),
                subscription_key: rule.subscription_key.clone(),
                handler: rule.handler.clone(),
            })
            .collect()
    }

    /// Subscription keys held by live rules, in first-use order.
    pub fn subscription_keys(&self) -> Vec<String> {
        self.core.lock_state().rules.keys_in_use()
    }

    pub fn is_destroyed(&self) -> bool {
        self.core.lock_state().destroyed
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.core.config
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.is_destroyed() {
            return;
        }

        debug!(
            event = events::DISPATCHER_DROP_DETACH,
            component = COMPONENT,
            "dispatcher dropped without destroy, detaching listener"
        );
        self.core
            .transport
            .remove_message_listener(&self.listener);
    }
}
