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

mod support;

use integration_test_utils::{recording_handler, RecordingTransport, TransportCall};
use mqtt_dispatcher::{DispatcherConfig, DispatcherError, QoS, RuleOptions};
use std::sync::Arc;
use support::{granted, make_dispatcher, pairs, rule_pairs, shared_key};

#[tokio::test]
async fn attaches_listener_and_reference_counts_subscriptions() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    assert_eq!(transport.listener_additions(), 1);

    let (fn1, _) = recording_handler();
    let (fn2, _) = recording_handler();
    let (fn3, _) = recording_handler();

    let outcome = dispatcher
        .add_rule("hello/mqtt", fn1.clone(), RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(outcome.pattern, "hello/mqtt");
    assert_eq!(outcome.subscribed, vec![granted("hello/mqtt")]);
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Subscribe {
            topics: vec!["hello/mqtt".to_string()],
            qos: QoS::AtMostOnce,
        }]
    );

    let outcome = dispatcher
        .add_rule("hello/mqtt", fn2.clone(), RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    assert!(outcome.subscribed.is_empty());
    assert_eq!(transport.subscribe_calls().len(), 1);

    let outcome = dispatcher
        .add_rule("hello/world", fn3.clone(), RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(outcome.subscribed, vec![granted("hello/world")]);
    assert_eq!(
        rule_pairs(&dispatcher),
        pairs(&[
            ("hello/mqtt", "hello/mqtt"),
            ("hello/mqtt", "hello/mqtt"),
            ("hello/world", "hello/world"),
        ])
    );
    assert_eq!(dispatcher.rules()[1].handler, fn2);

    let outcome = dispatcher
        .remove_rule("hello/mqtt", Some(&fn2))
        .unwrap()
        .await
        .unwrap();
    assert!(outcome.unsubscribed.is_empty());
    assert!(transport.unsubscribe_calls().is_empty());

    let outcome = dispatcher
        .remove_rule("hello/mqtt", Some(&fn1))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(outcome.unsubscribed, vec!["hello/mqtt"]);
    assert_eq!(
        rule_pairs(&dispatcher),
        pairs(&[("hello/world", "hello/world")])
    );

    let outcome = dispatcher
        .remove_rule("hello/world", Some(&fn3))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(outcome.unsubscribed, vec!["hello/world"]);
    assert_eq!(
        transport.unsubscribe_calls(),
        vec![vec!["hello/mqtt".to_string()], vec!["hello/world".to_string()]]
    );
    assert!(dispatcher.rules().is_empty());
    assert!(transport.active_subscriptions().is_empty());
}

#[tokio::test]
async fn destroy_batches_unsubscribe_and_fails_every_later_call() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (f, _) = recording_handler();
    let (g, _) = recording_handler();

    for pattern in ["+/mqtt", "#", "abcdef/#"] {
        dispatcher
            .add_rule(pattern, f.clone(), RuleOptions::new())
            .unwrap()
            .await
            .unwrap();
    }
    dispatcher
        .add_rule("#", g, RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(transport.subscribe_calls().len(), 3);

    let outcome = dispatcher.destroy().unwrap().await.unwrap();

    assert_eq!(outcome.unsubscribed, vec!["+/mqtt", "#", "abcdef/#"]);
    assert_eq!(transport.unsubscribe_calls().len(), 1);
    assert_eq!(transport.listener_removals(), 1);
    assert_eq!(transport.listener_count(), 0);
    assert!(dispatcher.is_destroyed());

    assert!(matches!(
        dispatcher.add_rule("abc", f.clone(), RuleOptions::new()),
        Err(DispatcherError::Destroyed)
    ));
    assert!(matches!(
        dispatcher.remove_rule("abc", Some(&f)),
        Err(DispatcherError::Destroyed)
    ));
    let err = dispatcher.destroy().err().expect("second destroy fails");
    assert!(err.to_string().contains("destroyed"));
}

#[tokio::test]
async fn destroyed_dispatcher_reports_destroyed_before_validating_arguments() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (f, _) = recording_handler();

    dispatcher.destroy().unwrap().await.unwrap();

    assert!(matches!(
        dispatcher.add_rule("#/x", f.clone(), RuleOptions::new()),
        Err(DispatcherError::Destroyed)
    ));
    assert!(matches!(
        dispatcher.add_rule("", f.clone(), RuleOptions::new()),
        Err(DispatcherError::Destroyed)
    ));
    assert!(matches!(
        dispatcher.add_rule("a/b", f, RuleOptions::new().with_subscription_key("")),
        Err(DispatcherError::Destroyed)
    ));
    assert!(transport.subscribe_calls().is_empty());
}

#[tokio::test]
async fn destroy_without_subscriptions_makes_no_transport_call() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());

    let completion = dispatcher.destroy().unwrap();
    assert!(completion.is_immediate());
    assert!(completion.await.unwrap().unsubscribed.is_empty());

    assert!(dispatcher.is_destroyed());
    assert!(transport.calls().is_empty());
    assert_eq!(transport.listener_removals(), 1);
}

#[tokio::test]
async fn remove_without_handler_detaches_every_rule_under_the_pattern() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (f, _) = recording_handler();
    let (g, _) = recording_handler();

    dispatcher
        .add_rule("#", f, RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    dispatcher
        .add_rule("#", g, RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    assert_eq!(transport.subscribe_calls().len(), 1);

    let outcome = dispatcher.remove_rule("#", None).unwrap().await.unwrap();

    assert_eq!(outcome.unsubscribed, vec!["#"]);
    assert_eq!(transport.unsubscribe_calls().len(), 1);
    assert!(dispatcher.rules().is_empty());
}

#[tokio::test]
async fn extraneous_handler_keeps_the_subscription_alive() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (fn1, _) = recording_handler();
    let (fn2, _) = recording_handler();
    let (extraneous, _) = recording_handler();

    dispatcher
        .add_rule("#", fn1.clone(), RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    dispatcher
        .add_rule("#", fn2.clone(), RuleOptions::new())
        .unwrap()
        .await
        .unwrap();

    let outcome = dispatcher
        .remove_rule("#", Some(&fn1))
        .unwrap()
        .await
        .unwrap();
    assert!(outcome.unsubscribed.is_empty());

    let err = dispatcher
        .remove_rule("#", Some(&extraneous))
        .err()
        .expect("handler was never registered");
    assert!(matches!(err, DispatcherError::ExtraneousRule { ref pattern } if pattern == "#"));
    assert!(err.to_string().contains("extraneous"));
    assert!(transport.unsubscribe_calls().is_empty());

    let outcome = dispatcher
        .remove_rule("#", Some(&fn2))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(outcome.unsubscribed, vec!["#"]);
}

#[tokio::test]
async fn duplicate_registration_is_rejected_without_side_effects() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (f, _) = recording_handler();
    let (g, _) = recording_handler();

    dispatcher
        .add_rule("a/b", f.clone(), RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    dispatcher
        .add_rule("foo/#", f.clone(), RuleOptions::new())
        .unwrap()
        .await
        .unwrap();

    let err = dispatcher
        .add_rule("a/b", f.clone(), RuleOptions::new())
        .err()
        .expect("same pair twice");
    assert!(matches!(err, DispatcherError::DuplicateRule { ref pattern } if pattern == "a/b"));
    assert!(err.to_string().contains("already registered"));

    dispatcher
        .add_rule("a/b", g, RuleOptions::new())
        .unwrap()
        .await
        .unwrap();

    assert_eq!(
        rule_pairs(&dispatcher),
        pairs(&[("a/b", "a/b"), ("foo/#", "foo/#"), ("a/b", "a/b")])
    );
    assert_eq!(transport.subscribe_calls().len(), 2);
    assert!(transport.unsubscribe_calls().is_empty());
}

#[tokio::test]
async fn unknown_patterns_are_extraneous() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (f, _) = recording_handler();

    assert!(matches!(
        dispatcher.remove_rule("/test", None),
        Err(DispatcherError::ExtraneousRule { .. })
    ));
    assert!(matches!(
        dispatcher.remove_rule("/test", Some(&f)),
        Err(DispatcherError::ExtraneousRule { .. })
    ));
}

#[tokio::test]
async fn configured_qos_is_forwarded_on_subscribe() {
    let transport = Arc::new(RecordingTransport::new());
    let config = DispatcherConfig::from_json5_str("{ qos: 2 }").unwrap();
    let dispatcher = make_dispatcher(&transport, config);
    assert_eq!(dispatcher.config().qos, QoS::ExactlyOnce);
    let (f, _) = recording_handler();

    let outcome = dispatcher
        .add_rule("#", f, RuleOptions::new())
        .unwrap()
        .await
        .unwrap();

    assert_eq!(outcome.subscribed[0].qos, QoS::ExactlyOnce);
    assert_eq!(
        transport.calls(),
        vec![TransportCall::Subscribe {
            topics: vec!["#".to_string()],
            qos: QoS::ExactlyOnce,
        }]
    );
}

#[tokio::test]
async fn rules_sharing_a_key_subscribe_and_unsubscribe_once() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (f1, _) = recording_handler();
    let (f2, _) = recording_handler();

    dispatcher
        .add_rule("cmd/restart", f1, shared_key("cmd/+"))
        .unwrap()
        .await
        .unwrap();
    dispatcher
        .add_rule("cmd/shutdown", f2, shared_key("cmd/+"))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(transport.subscribe_calls(), vec![vec!["cmd/+".to_string()]]);
    assert_eq!(dispatcher.subscription_keys(), vec!["cmd/+"]);

    let first = dispatcher
        .remove_rule("cmd/restart", None)
        .unwrap()
        .await
        .unwrap();
    assert!(first.unsubscribed.is_empty());
    assert!(transport.unsubscribe_calls().is_empty());

    let second = dispatcher
        .remove_rule("cmd/shutdown", None)
        .unwrap()
        .await
        .unwrap();
    assert_eq!(second.unsubscribed, vec!["cmd/+"]);
    assert_eq!(
        transport.unsubscribe_calls(),
        vec![vec!["cmd/+".to_string()]]
    );
    assert!(dispatcher.subscription_keys().is_empty());
}

#[tokio::test]
async fn removing_a_pattern_releases_only_keys_nobody_else_holds() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = make_dispatcher(&transport, DispatcherConfig::default());
    let (f, _) = recording_handler();
    let (g, _) = recording_handler();
    let (h, _) = recording_handler();

    dispatcher
        .add_rule("status/a", f, shared_key("status/+"))
        .unwrap()
        .await
        .unwrap();
    dispatcher
        .add_rule("status/a", g, RuleOptions::new())
        .unwrap()
        .await
        .unwrap();
    dispatcher
        .add_rule("status/b", h, shared_key("status/+"))
        .unwrap()
        .await
        .unwrap();

    let outcome = dispatcher
        .remove_rule("status/a", None)
        .unwrap()
        .await
        .unwrap();

    assert_eq!(outcome.unsubscribed, vec!["status/a"]);
    assert_eq!(
        transport.unsubscribe_calls(),
        vec![vec!["status/a".to_string()]]
    );
    assert_eq!(transport.active_subscriptions(), vec!["status/+"]);
}
