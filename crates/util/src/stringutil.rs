//! String slice helpers shared across services.

use std::collections::HashSet;

/// Elements of `base` not present in `exclude`, in `base` order.
pub fn diff(base: &[String], exclude: &[String]) -> Vec<String> {
    let excluded: HashSet<&str> = exclude.iter().map(String::as_str).collect();

    base.iter().filter(|s| !excluded.contains(s.as_str())).cloned().collect()
}

/// Deduplicate, keeping the first occurrence of each element.
pub fn unique(ss: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();

    ss.iter().filter(|s| seen.insert(s.as_str())).cloned().collect()
}

pub fn find_string(find: &str, ss: &[String]) -> Option<usize> {
    ss.iter().position(|s| s == find)
}

pub fn string_in(find: &str, ss: &[String]) -> bool {
    find_string(find, ss).is_some()
}

/// Reverse by character, not by byte, so multi-byte text survives.
pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

pub fn camel_case_to_underscore(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);

    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

pub fn underscore_to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;

    for c in s.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}
