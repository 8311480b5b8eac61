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

//! # mqtt-dispatcher
//!
//! `mqtt-dispatcher` routes messages of a hierarchical pub/sub transport (MQTT
//! style topics with `+` and `#` wildcards) to registered rule handlers while
//! keeping the transport's subscriptions minimal.
//!
//! Typical usage is centered on [`Dispatcher`]: register rules with
//! [`Dispatcher::add_rule`], remove them with [`Dispatcher::remove_rule`] and tear
//! everything down with [`Dispatcher::destroy`]. The transport is any client
//! implementing [`PubSubTransport`].
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use mqtt_dispatcher::{
//!     Dispatcher, DispatcherConfig, DispatcherError, HandlerRef, HandlerResult, Message,
//!     RuleOptions,
//! };
//!
//! # pub mod mock_transport {
//! #     use std::sync::{Arc, Mutex};
//! #     use async_trait::async_trait;
//! #     use mqtt_dispatcher::{
//! #         GrantedSubscription, Message, MessageListener, PubSubTransport, SubscribeOptions,
//! #         TransportError,
//! #     };
//! #
//! #     #[derive(Default)]
//! #     pub struct MockTransport {
//! #         listener: Mutex<Option<Arc<dyn MessageListener>>>,
//! #     }
//! #
//! #     impl MockTransport {
//! #         pub fn publish(&self, message: Message) {
//! #             let listener = self.listener.lock().unwrap().clone();
//! #             if let Some(listener) = listener {
//! #                 listener.on_message(&message);
//! #             }
//! #         }
//! #     }
//! #
//! #     #[async_trait]
//! #     impl PubSubTransport for MockTransport {
//! #         async fn subscribe(
//! #             &self,
//! #             topics: &[String],
//! #             options: SubscribeOptions,
//! #         ) -> Result<Vec<GrantedSubscription>, TransportError> {
//! #             Ok(topics
//! #                 .iter()
//! #                 .map(|topic| GrantedSubscription { topic: topic.clone(), qos: options.qos })
//! #                 .collect())
//! #         }
//! #         async fn unsubscribe(&self, _topics: &[String]) -> Result<(), TransportError> {
//! #             Ok(())
//! #         }
//! #         fn add_message_listener(&self, listener: Arc<dyn MessageListener>) {
//! #             *self.listener.lock().unwrap() = Some(listener);
//! #         }
//! #         fn remove_message_listener(&self, _listener: &Arc<dyn MessageListener>) {
//! #             *self.listener.lock().unwrap() = None;
//! #         }
//! #     }
//! # }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let transport = Arc::new(mock_transport::MockTransport::default());
//! let dispatcher = Dispatcher::new(transport.clone(), DispatcherConfig::default());
//!
//! let print = HandlerRef::new(|message: &Message| -> HandlerResult {
//!     println!("{} -> {:?}", message.topic, message.payload);
//!     Ok(())
//! });
//!
//! let added = dispatcher
//!     .add_rule("sensors/+/temperature", print.clone(), RuleOptions::new())
//!     .unwrap()
//!     .await
//!     .unwrap();
//! assert_eq!(added.subscribed[0].topic, "sensors/+/temperature");
//!
//! transport.publish(Message::new("sensors/kitchen/temperature", "21.5"));
//!
//! // Registering the same pair twice is rejected synchronously.
//! assert!(matches!(
//!     dispatcher.add_rule("sensors/+/temperature", print.clone(), RuleOptions::new()),
//!     Err(DispatcherError::DuplicateRule { .. })
//! ));
//!
//! let removed = dispatcher
//!     .remove_rule("sensors/+/temperature", Some(&print))
//!     .unwrap()
//!     .await
//!     .unwrap();
//! assert_eq!(removed.unsubscribed, vec!["sensors/+/temperature".to_string()]);
//!
//! dispatcher.destroy().unwrap().await.unwrap();
//! assert!(matches!(dispatcher.destroy(), Err(DispatcherError::Destroyed)));
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: outward `Dispatcher` surface and operation outcomes
//! - Control plane: rule table, subscription-key reference counts and per-key
//!   ordering of transport calls
//! - Routing: topic pattern validation and the trie pattern matcher
//! - Data plane: inbound listener and isolated handler fan-out
//! - Runtime: spawned transport calls and their completions
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod config;
pub use config::{ConfigError, DispatcherConfig, InvalidQoS, QoS, RuleOptions};

mod control_plane;
mod data_plane;
pub use data_plane::fan_out::{DispatchReport, HandlerFailure, HandlerPanicked};

mod dispatcher;
pub use dispatcher::{AddRuleOutcome, DestroyOutcome, Dispatcher, RemoveRuleOutcome, RuleSnapshot};

mod error;
pub use error::{DispatcherError, TransportError, TransportErrorKind};

mod handler;
pub use handler::{HandlerError, HandlerRef, HandlerResult, MessageHandler};

#[doc(hidden)]
pub mod observability;

mod routing;
pub use routing::pattern_matcher::{MatchedHandler, PatternMatcher};
pub use routing::topic_pattern::{PatternError, TopicPattern};

mod runtime;
pub use runtime::completion::Completion;

mod transport;
pub use transport::{
    GrantedSubscription, Message, MessageListener, MessageMetadata, PubSubTransport,
    SubscribeOptions,
};
