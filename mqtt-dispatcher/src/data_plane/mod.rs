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

//! Data-plane layer.
//!
//! Receives inbound messages from the transport and fans each one out to every
//! handler whose pattern matches its topic. Handlers run outside the dispatcher
//! lock and each invocation is isolated from its siblings.
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
//! #         _topics: &[String],
//! #         _options: SubscribeOptions,
//! #     ) -> Result<Vec<GrantedSubscription>, TransportError> {
//! #         Ok(Vec::new())
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
//! let failing = HandlerRef::new(|_message: &Message| -> HandlerResult { Err("rejected".into()) });
//! let healthy = HandlerRef::new(|_message: &Message| -> HandlerResult { Ok(()) });
//! dispatcher.add_rule("+/mqtt", failing, RuleOptions::new()).unwrap().await.unwrap();
//! dispatcher.add_rule("#", healthy, RuleOptions::new()).unwrap().await.unwrap();
//!
//! // One failing handler does not keep the message from its siblings.
//! let report = dispatcher.dispatch(&Message::new("hello/mqtt", "payload"));
//! assert_eq!(report.matched, 2);
//! assert_eq!(report.delivered(), 1);
//! assert_eq!(report.failures[0].pattern, "+/mqtt");
//! # });
//! ```

pub(crate) mod fan_out;
pub(crate) mod ingress_listener;
