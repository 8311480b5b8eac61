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

//! Canonical structured event names used across `mqtt-dispatcher`.

// Dispatcher lifecycle events.
pub const DISPATCHER_CREATE: &str = "dispatcher_create";
pub const DISPATCHER_DESTROY: &str = "dispatcher_destroy";
pub const DISPATCHER_DROP_DETACH: &str = "dispatcher_drop_detach";

// Control-plane rule events.
pub const RULE_ADD_OK: &str = "rule_add_ok";
pub const RULE_REMOVE_OK: &str = "rule_remove_ok";

// Subscription coordination events.
pub const SUBSCRIBE_START: &str = "subscribe_start";
pub const SUBSCRIBE_OK: &str = "subscribe_ok";
pub const UNSUBSCRIBE_START: &str = "unsubscribe_start";
pub const UNSUBSCRIBE_OK: &str = "unsubscribe_ok";
pub const PENDING_OP_WAIT: &str = "pending_op_wait";

// Data-plane events.
pub const INGRESS_RECEIVE: &str = "ingress_receive";
pub const INGRESS_AFTER_DESTROY: &str = "ingress_after_destroy";
pub const HANDLER_FAILED: &str = "handler_failed";
