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

use async_trait::async_trait;
use bytes::Bytes;
use mqtt_dispatcher::{
    GrantedSubscription, Message, MessageListener, PubSubTransport, QoS, SubscribeOptions,
    TransportError, TransportErrorKind,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// One call as seen by the transport, recorded when the call starts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransportCall {
    Subscribe { topics: Vec<String>, qos: QoS },
    Unsubscribe { topics: Vec<String> },
}

#[derive(Default)]
struct InFlight {
    per_key: HashMap<String, usize>,
    max_per_key: usize,
}

/// Transport double recording every subscribe/unsubscribe call.
///
/// Calls can be slowed down with [`RecordingTransport::with_latency`] and made to
/// fail with the `set_fail_*` toggles. The set of active subscriptions only
/// changes when a call succeeds.
#[derive(Default)]
pub struct RecordingTransport {
    latency: Duration,
    calls: Mutex<Vec<TransportCall>>,
    active: Mutex<BTreeSet<String>>,
    in_flight: Mutex<InFlight>,
    fail_subscribe: AtomicBool,
    fail_unsubscribe: AtomicBool,
    listeners: Mutex<Vec<Arc<dyn MessageListener>>>,
    listener_additions: AtomicUsize,
    listener_removals: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_unsubscribe(&self, fail: bool) {
        self.fail_unsubscribe.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn subscribe_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Subscribe { topics, .. } => Some(topics),
                TransportCall::Unsubscribe { .. } => None,
            })
            .collect()
    }

    pub fn unsubscribe_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Unsubscribe { topics } => Some(topics),
                TransportCall::Subscribe { .. } => None,
            })
            .collect()
    }

    /// Topics subscribed and not yet unsubscribed, sorted.
    pub fn active_subscriptions(&self) -> Vec<String> {
        self.active.lock().unwrap().iter().cloned().collect()
    }

    /// Highest number of calls observed in flight for one key at the same time.
    pub fn max_in_flight_per_key(&self) -> usize {
        self.in_flight.lock().unwrap().max_per_key
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn listener_additions(&self) -> usize {
        self.listener_additions.load(Ordering::SeqCst)
    }

    pub fn listener_removals(&self) -> usize {
        self.listener_removals.load(Ordering::SeqCst)
    }

    /// Hands a message to every attached listener, regardless of subscriptions.
    pub fn simulate_publish(&self, topic: &str, payload: impl Into<Bytes>) {
        let message = Message::new(topic, payload);
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener.on_message(&message);
        }
    }

    fn record(&self, call: TransportCall) {
        debug!(?call, "recording transport call");
        self.calls.lock().unwrap().push(call);
    }

    fn enter(&self, topics: &[String]) {
        let mut in_flight = self.in_flight.lock().unwrap();
        for topic in topics {
            let count = in_flight.per_key.entry(topic.clone()).or_insert(0);
            *count += 1;
            let count = *count;
            in_flight.max_per_key = in_flight.max_per_key.max(count);
        }
    }

    fn leave(&self, topics: &[String]) {
        let mut in_flight = self.in_flight.lock().unwrap();
        for topic in topics {
            if let Some(count) = in_flight.per_key.get_mut(topic) {
                *count -= 1;
            }
        }
    }

    async fn simulate_round_trip(&self, topics: &[String]) {
        self.enter(topics);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.leave(topics);
    }
}

#[async_trait]
impl PubSubTransport for RecordingTransport {
    async fn subscribe(
        &self,
        topics: &[String],
        options: SubscribeOptions,
    ) -> Result<Vec<GrantedSubscription>, TransportError> {
        self.record(TransportCall::Subscribe {
            topics: topics.to_vec(),
            qos: options.qos,
        });
        self.simulate_round_trip(topics).await;

        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(TransportError::new(
                TransportErrorKind::Rejected,
                "subscribe rejected by broker",
            ));
        }

        self.active.lock().unwrap().extend(topics.iter().cloned());
        Ok(topics
            .iter()
            .map(|topic| GrantedSubscription {
                topic: topic.clone(),
                qos: options.qos,
            })
            .collect())
    }

    async fn unsubscribe(&self, topics: &[String]) -> Result<(), TransportError> {
        self.record(TransportCall::Unsubscribe {
            topics: topics.to_vec(),
        });
        self.simulate_round_trip(topics).await;

        if self.fail_unsubscribe.load(Ordering::SeqCst) {
            return Err(TransportError::new(
                TransportErrorKind::Unavailable,
                "client disconnected",
            ));
        }

        let mut active = self.active.lock().unwrap();
        for topic in topics {
            active.remove(topic);
        }
        Ok(())
    }

    fn add_message_listener(&self, listener: Arc<dyn MessageListener>) {
        self.listener_additions.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().push(listener);
    }

    fn remove_message_listener(&self, listener: &Arc<dyn MessageListener>) {
        let mut listeners = self.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|attached| !Arc::ptr_eq(attached, listener));
        if listeners.len() != before {
            self.listener_removals.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordingTransport, TransportCall};
    use mqtt_dispatcher::{PubSubTransport, QoS, SubscribeOptions};
    use std::time::Duration;

    fn topics(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn records_calls_and_tracks_active_subscriptions() {
        let transport = RecordingTransport::new();

        transport
            .subscribe(
                &topics(&["a/+"]),
                SubscribeOptions {
                    qos: QoS::AtLeastOnce,
                },
            )
            .await
            .unwrap();
        transport.unsubscribe(&topics(&["a/+"])).await.unwrap();

        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::Subscribe {
                    topics: topics(&["a/+"]),
                    qos: QoS::AtLeastOnce,
                },
                TransportCall::Unsubscribe {
                    topics: topics(&["a/+"]),
                },
            ]
        );
        assert!(transport.active_subscriptions().is_empty());
        assert_eq!(transport.max_in_flight_per_key(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overlapping_calls_on_one_key_are_detected() {
        let transport = RecordingTransport::with_latency(Duration::from_millis(20));
        let key = topics(&["a"]);

        let (first, second) = tokio::join!(
            transport.subscribe(&key, SubscribeOptions::default()),
            transport.subscribe(&key, SubscribeOptions::default()),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(transport.max_in_flight_per_key(), 2);
    }

    #[tokio::test]
    async fn failing_calls_leave_active_set_unchanged() {
        let transport = RecordingTransport::new();
        transport.set_fail_subscribe(true);

        assert!(transport
            .subscribe(&topics(&["a"]), SubscribeOptions::default())
            .await
            .is_err());
        assert!(transport.active_subscriptions().is_empty());
        assert_eq!(transport.subscribe_calls(), vec![topics(&["a"])]);
    }
}
