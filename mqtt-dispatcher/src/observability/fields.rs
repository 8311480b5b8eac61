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

//! Canonical structured field values and value-format helpers.

pub const NONE: &str = "none";
pub const KEY_SEPARATOR: &str = ",";

pub const REASON_NO_REMAINING_RULES: &str = "no_remaining_rules";
pub const REASON_FIRST_RULE_FOR_KEY: &str = "first_rule_for_key";
pub const REASON_DESTROY: &str = "destroy";

/// Joins subscription keys into one field value, `none` when empty.
pub fn format_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        NONE.to_string()
    } else {
        keys.join(KEY_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_keys, NONE};

    #[test]
    fn format_keys_joins_in_order() {
        let keys = vec!["cmd/+".to_string(), "status/#".to_string()];

        assert_eq!(format_keys(&keys), "cmd/+,status/#");
    }

    #[test]
    fn format_keys_returns_none_when_empty() {
        assert_eq!(format_keys(&[]), NONE);
    }
}
