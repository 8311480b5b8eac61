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

//! Control-plane layer.
//!
//! Owns the rule table, subscription-key reference counting and the per-key
//! ordering of transport calls. Decisions are taken under the dispatcher lock;
//! the resulting transport calls run outside it.
//!
//! ```
//! use std::sync::Arc;
//! use mqtt_dispatcher::{Dispatcher, DispatcherConfig, HandlerRef, HandlerResult, Message, RuleOptions};
//! # use async_trait::async_trait;
//! # use mqtt_dispatcher::{GrantedSubscription, MessageListener, PubSubTransport, SubscribeOptions, TransportError};
//! #
//! # struct MockTransport;
//! #
//! # #[async_trait]
//! # impl PubSubTransport for MockTransport {
//! #     async fn subscribe(
//! #         &self,
//! #         topics: &[String],
//! #         options: SubscribeOptions,
//! #     ) -> Result<Vec<GrantedSubscription>, TransportError> {
//! #         Ok(topics
//! #             .iter()
//! #             .map(|topic| GrantedSubscription { topic: topic.clone(), qos: options.qos })
//! #             .collect())
//! #     }
//! #
//! #     async fn unsubscribe(&self, _topics: &[String]) -> Result<(), TransportError> {
//! #         Ok(())
//! #     }
//! #
//! #     fn add_message_listener(&self, _listener: Arc<dyn MessageListener>) {}
//! #
//! #     fn remove_message_listener(&self, _listener: &Arc<dyn MessageListener>) {}
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let dispatcher = Dispatcher::new(Arc::new(MockTransport), DispatcherConfig::default());
//! let restart = HandlerRef::new(|_message: &Message| -> HandlerResult { Ok(()) });
//! let shutdown = HandlerRef::new(|_message: &Message| -> HandlerResult { Ok(()) });
//! let shared = RuleOptions::new().with_subscription_key("cmd/+");
//!
//! // Two rules share one transport subscription.
//! let first = dispatcher.add_rule("cmd/restart", restart, shared.clone()).unwrap().await.unwrap();
//! let second = dispatcher.add_rule("cmd/shutdown", shutdown, shared).unwrap().await.unwrap();
//! assert_eq!(first.subscribed.len(), 1);
//! assert!(second.subscribed.is_empty());
//!
//! // Only the removal that frees the key unsubscribes.
//! let removed = dispatcher.remove_rule("cmd/restart", None).unwrap().await.unwrap();
//! assert!(removed.unsubscribed.is_empty());
//! let removed = dispatcher.remove_rule("cmd/shutdown", None).unwrap().await.unwrap();
//! assert_eq!(removed.unsubscribed, vec!["cmd/+".to_string()]);
//! # });
//! ```

pub(crate) mod pending_ops;
pub(crate) mod rule_table;
pub(crate) mod subscription_coordinator;
