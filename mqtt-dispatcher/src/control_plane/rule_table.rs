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

//! Ordered rule storage and subscription-key reference counts.

use crate::handler::HandlerRef;
use crate::routing::topic_pattern::TopicPattern;
use std::collections::{HashMap, HashSet};

/// One live (pattern, handler) registration and the transport key backing it.
#[derive(Clone, Debug)]
pub(crate) struct Rule {
    pub(crate) pattern: TopicPattern,
    pub(crate) handler: HandlerRef,
    pub(crate) subscription_key: String,
}

impl Rule {
    pub(crate) fn new(pattern: TopicPattern, handler: HandlerRef, subscription_key: String) -> Self {
        Self {
            pattern,
            handler,
            subscription_key,
        }
    }

    fn is_same_registration(&self, pattern: &str, handler: &HandlerRef) -> bool {
        self.pattern.as_str() == pattern && &self.handler == handler
    }

    fn matches_removal(&self, pattern: &str, handler: Option<&HandlerRef>) -> bool {
        match handler {
            Some(handler) => self.is_same_registration(pattern, handler),
            None => self.pattern.as_str() == pattern,
        }
    }
}

/// Rules selected by a removal request plus the keys the survivors still hold.
#[derive(Debug)]
pub(crate) struct RemovalPlan {
    pub(crate) removed: Vec<Rule>,
    pub(crate) keys_in_use: HashSet<String>,
}

impl RemovalPlan {
    /// Keys of removed rules that no surviving rule uses, first occurrence order.
    pub(crate) fn released_keys(&self) -> Vec<String> {
        distinct_keys(self.removed.iter())
            .into_iter()
            .filter(|key| !self.keys_in_use.contains(key))
            .collect()
    }
}

/// Insertion-ordered rules with no duplicate (pattern, handler) pair.
#[derive(Debug, Default)]
pub(crate) struct RuleTable {
    rules: Vec<Rule>,
    key_counts: HashMap<String, usize>,
}

impl RuleTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `rule`. Returns `false` without changes when the pair already exists.
    pub(crate) fn try_add(&mut self, rule: Rule) -> bool {
        if self.contains(rule.pattern.as_str(), &rule.handler) {
            return false;
        }

        *self
            .key_counts
            .entry(rule.subscription_key.clone())
            .or_insert(0) += 1;
        self.rules.push(rule);
        true
    }

    pub(crate) fn contains(&self, pattern: &str, handler: &HandlerRef) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.is_same_registration(pattern, handler))
    }

    /// Removes every rule under `pattern` (only the given pair when `handler` is
    /// set). Returns `None` and leaves the table untouched when nothing matches.
    pub(crate) fn remove_matching(
        &mut self,
        pattern: &str,
        handler: Option<&HandlerRef>,
    ) -> Option<RemovalPlan> {
        if !self
            .rules
            .iter()
            .any(|rule| rule.matches_removal(pattern, handler))
        {
            return None;
        }

        let (removed, surviving): (Vec<Rule>, Vec<Rule>) = self
            .rules
            .drain(..)
            .partition(|rule| rule.matches_removal(pattern, handler));
        self.rules = surviving;

        for rule in &removed {
            self.release_key(&rule.subscription_key);
        }

        Some(RemovalPlan {
            removed,
            keys_in_use: self.key_counts.keys().cloned().collect(),
        })
    }

    /// Clears the table, returning every key that was in use.
    pub(crate) fn remove_all(&mut self) -> Vec<String> {
        let keys = self.keys_in_use();
        self.rules.clear();
        self.key_counts.clear();
        keys
    }

    pub(crate) fn count_key(&self, key: &str) -> usize {
        self.key_counts.get(key).copied().unwrap_or(0)
    }

    /// Keys held by live rules, first occurrence order.
    pub(crate) fn keys_in_use(&self) -> Vec<String> {
        distinct_keys(self.rules.iter())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.rules.len()
    }

    fn release_key(&mut self, key: &str) {
        if let Some(count) = self.key_counts.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                self.key_counts.remove(key);
            }
        }
    }
}

fn distinct_keys<'a>(rules: impl Iterator<Item = &'a Rule>) -> Vec<String> {
    let mut seen = HashSet::new();
    rules
        .filter(|rule| seen.insert(rule.subscription_key.as_str()))
        .map(|rule| rule.subscription_key.clone())
        .collect()
}
