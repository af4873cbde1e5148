//! Format validators and the structured field-error model.
//!
//! Validators return a list of human-readable messages, empty on success, so
//! callers can accumulate every violation in one pass instead of stopping at
//! the first. The typed error model lives in [`field`].

#![forbid(unsafe_code)]

use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;

pub mod field;

use field::ErrorList;

/// Capability of validating one's own fields. Implementors walk their fields
/// and accumulate failures; they never short-circuit on the first one.
pub trait Validate {
    fn validate(&self) -> ErrorList;
}

pub const DESCRIPTION_MAX_LEN: usize = 256;

const QNAME_FMT: &str = "[0-9a-zA-Z]";
const QNAME_EXT_FMT: &str = "[0-9a-zA-Z._-]";
const QUALIFIED_NAME_ERR_MSG: &str = "must consist of alphanumeric characters, '-', '.' or '_' \
                                      and must start and end with alphanumeric characters";
const NAME_MAX_LEN: usize = 63;

static QUALIFIED_NAME_FMT: Lazy<String> =
    Lazy::new(|| format!("({QNAME_FMT}{QNAME_EXT_FMT}*)?{QNAME_FMT}"));
static QNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", *QUALIFIED_NAME_FMT)).expect("static regex"));

/// A qualified name is `name` or `prefix/name` where the prefix is a DNS-1123
/// subdomain and the name part is alphanumeric with `-`, `.`, `_` inside.
pub fn is_qualified_name(name: &str) -> Vec<String> {
    let mut errs = Vec::new();
    let parts: Vec<&str> = name.split('/').collect();

    let name = match parts.as_slice() {
        [only] => *only,
        [prefix, name] => {
            let prefix_errs = is_valid_subdomain_dns1123(prefix);
            if !prefix_errs.is_empty() {
                errs.push(prefix_each("prefix part: ", &prefix_errs));
            }
            *name
        }
        _ => {
            errs.push(format!(
                "a qualified name {} with an optional DNS subdomain prefix and '/' (e.g. example.com/)",
                regexp_error(QUALIFIED_NAME_ERR_MSG, QNAME_FMT, &["myname", "abc.123"])
            ));
            return errs;
        }
    };

    if name.is_empty() {
        errs.push(empty_error());
    }
    if name.len() > NAME_MAX_LEN {
        errs.push(max_len_error(NAME_MAX_LEN));
    }
    if !QNAME_REGEX.is_match(name) {
        errs.push(regexp_error(QUALIFIED_NAME_ERR_MSG, QNAME_FMT, &["myName", "my_name", "123.45"]));
    }

    errs
}

const LABEL_ERR_MSG: &str = "a valid label must be an empty string or consist of alphanumeric \
                             characters, '-', '_' or '.', and must start and end with an \
                             alphanumeric character";
const LABEL_MAX_LEN: usize = 63;

static LABEL_FMT: Lazy<String> = Lazy::new(|| format!("({})?", *QUALIFIED_NAME_FMT));
static LABEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", *LABEL_FMT)).expect("static regex"));

pub fn is_valid_label(label: &str) -> Vec<String> {
    let mut errs = Vec::new();

    if label.len() > LABEL_MAX_LEN {
        errs.push(max_len_error(LABEL_MAX_LEN));
    }
    if !LABEL_REGEX.is_match(label) {
        errs.push(regexp_error(LABEL_ERR_MSG, &LABEL_FMT, &["MyName", "my_value", "12345"]));
    }

    errs
}

const LABEL_DNS1123_FMT: &str = "([0-9a-z][0-9a-z-]*)?[0-9a-z]";
const LABEL_DNS1123_ERR_MSG: &str = "a DNS-1123 label must consist of lower case alphanumeric \
                                     characters or '-', and must start and end with an \
                                     alphanumeric character";
const LABEL_DNS1123_MAX_LEN: usize = 63;

static LABEL_DNS1123_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{LABEL_DNS1123_FMT}$")).expect("static regex"));

pub fn is_valid_label_dns1123(label: &str) -> Vec<String> {
    let mut errs = Vec::new();

    if label.len() > LABEL_DNS1123_MAX_LEN {
        errs.push(max_len_error(LABEL_DNS1123_MAX_LEN));
    }
    if !LABEL_DNS1123_REGEX.is_match(label) {
        errs.push(regexp_error(LABEL_DNS1123_ERR_MSG, LABEL_DNS1123_FMT, &["my-name", "123-abc"]));
    }

    errs
}

const SUBDOMAIN_DNS1123_ERR_MSG: &str = "a DNS-1123 subdomain must consist of lower case \
                                         alphanumeric characters, '-' or '.', and must start \
                                         and end with an alphanumeric character";
const SUBDOMAIN_DNS1123_MAX_LEN: usize = 253;

static SUBDOMAIN_DNS1123_FMT: Lazy<String> =
    Lazy::new(|| format!("{LABEL_DNS1123_FMT}(\\.{LABEL_DNS1123_FMT})*"));
static SUBDOMAIN_DNS1123_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", *SUBDOMAIN_DNS1123_FMT)).expect("static regex"));

pub fn is_valid_subdomain_dns1123(subdomain: &str) -> Vec<String> {
    let mut errs = Vec::new();

    if subdomain.len() > SUBDOMAIN_DNS1123_MAX_LEN {
        errs.push(max_len_error(SUBDOMAIN_DNS1123_MAX_LEN));
    }
    if !SUBDOMAIN_DNS1123_REGEX.is_match(subdomain) {
        errs.push(regexp_error(SUBDOMAIN_DNS1123_ERR_MSG, &SUBDOMAIN_DNS1123_FMT, &["example.com"]));
    }

    errs
}

pub fn is_valid_port(port: i64) -> Vec<String> {
    if (1..=65535).contains(&port) {
        return Vec::new();
    }

    vec![inclusive_range_error(1, 65535)]
}

pub fn is_in_range(value: i64, lo: i64, hi: i64) -> Vec<String> {
    if value >= lo && value <= hi {
        return Vec::new();
    }

    vec![inclusive_range_error(lo, hi)]
}

pub fn is_valid_ip(ip: &str) -> Vec<String> {
    if ip.parse::<IpAddr>().is_ok() {
        return Vec::new();
    }

    vec!["must be a valid ip address, (e.g. 9.8.7.1)".to_string()]
}

pub fn is_valid_ipv4_address(ip: &str) -> Vec<String> {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => Vec::new(),
        _ => vec!["must be a valid ipv4 address".to_string()],
    }
}

pub fn is_valid_ipv6_address(ip: &str) -> Vec<String> {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => Vec::new(),
        _ => vec!["must be a valid ipv6 address".to_string()],
    }
}

const PERCENT_FMT: &str = "(0|[1-9][0-9]*)%";
const PERCENT_ERR_MSG: &str =
    "a valid percent string must be a numeric string followed by an ending '%'";

static PERCENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{PERCENT_FMT}$")).expect("static regex"));

pub fn is_valid_percent(percent: &str) -> Vec<String> {
    if PERCENT_REGEX.is_match(percent) {
        return Vec::new();
    }

    vec![regexp_error(PERCENT_ERR_MSG, PERCENT_FMT, &["99%", "0%"])]
}

const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_MAX_LEN: usize = 16;

/// Password policy: 8-16 counted characters mixing lower, upper, digit and
/// special. Only letters, digits, punctuation, symbols and spaces count
/// toward the length.
pub fn is_valid_password(password: &str) -> Vec<String> {
    let mut has_lower = false;
    let mut has_upper = false;
    let mut has_num = false;
    let mut has_special = false;
    let mut len = 0usize;
    let mut errs = Vec::new();

    for c in password.chars() {
        if c.is_numeric() {
            has_num = true;
            len += 1;
        } else if c.is_lowercase() {
            has_lower = true;
            len += 1;
        } else if c.is_uppercase() {
            has_upper = true;
            len += 1;
        } else if c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()) {
            has_special = true;
            len += 1;
        } else if c == ' ' {
            len += 1;
        }
    }

    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        errs.push(inclusive_range_error(PASSWORD_MIN_LEN as i64, PASSWORD_MAX_LEN as i64));
    }
    if !has_lower || !has_upper || !has_num || !has_special {
        errs.push("must consist of lower alpha, upper alpha, number and special character".to_string());
    }

    errs
}

pub fn is_valid_description(description: &str) -> Vec<String> {
    if description.len() <= DESCRIPTION_MAX_LEN {
        return Vec::new();
    }

    vec![max_len_error(DESCRIPTION_MAX_LEN)]
}

pub fn is_existing_dir(dir: &str) -> Vec<String> {
    if std::path::Path::new(dir).is_dir() {
        return Vec::new();
    }

    vec![format!("must point to an existing dir, but found {dir}")]
}

pub fn is_existing_file(file: &str) -> Vec<String> {
    if std::path::Path::new(file).is_file() {
        return Vec::new();
    }

    vec![format!("must point to an existing file, but found {file}")]
}

pub fn max_len_error(max_len: usize) -> String {
    format!("must be not over {max_len}")
}

pub fn regexp_error(msg: &str, fmt: &str, examples: &[&str]) -> String {
    if examples.is_empty() {
        return format!("{msg} (fmt used for regexp is '{fmt}')");
    }

    let mut out = format!("{msg} (e.g. ");
    for (i, example) in examples.iter().enumerate() {
        if i > 0 {
            out.push_str("or ");
        }
        out.push_str(example);
        out.push_str(", ");
    }
    out.push_str(&format!("fmt used for regexp is '{fmt}')"));

    out
}

pub fn empty_error() -> String {
    "must be not empty".to_string()
}

pub fn inclusive_range_error(lo: i64, hi: i64) -> String {
    format!("must be between {lo} and {hi}, inclusive")
}

pub fn prefix_each(prefix: &str, msgs: &[String]) -> String {
    let mut out = String::new();

    for (i, msg) in msgs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(prefix);
        out.push_str(msg);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_names() {
        assert!(is_qualified_name("my-name").is_empty());
        assert!(is_qualified_name("example.com/my-name").is_empty());
        assert!(!is_qualified_name("#").is_empty());
        assert!(!is_qualified_name("").is_empty());
        assert!(!is_qualified_name("a/b/c").is_empty());
        assert!(!is_qualified_name("-starts-with-dash").is_empty());
        assert!(!is_qualified_name(&"x".repeat(64)).is_empty());
        // bad prefix is reported with the prefix marker
        let errs = is_qualified_name("Bad_Prefix/name");
        assert!(errs.iter().any(|e| e.starts_with("prefix part: ")));
    }

    #[test]
    fn labels() {
        assert!(is_valid_label("123").is_empty());
        assert!(is_valid_label("").is_empty());
        assert!(!is_valid_label("-x").is_empty());
        assert!(is_valid_label_dns1123("my-name").is_empty());
        assert!(!is_valid_label_dns1123("My-Name").is_empty());
        assert!(is_valid_subdomain_dns1123("example.com").is_empty());
        assert!(!is_valid_subdomain_dns1123("example..com").is_empty());
        assert!(!is_valid_subdomain_dns1123(&"a".repeat(254)).is_empty());
    }

    #[test]
    fn ranges_and_ports() {
        assert!(is_valid_port(80).is_empty());
        assert_eq!(is_valid_port(0), vec![inclusive_range_error(1, 65535)]);
        assert!(is_in_range(5, 1, 10).is_empty());
        assert!(!is_in_range(11, 1, 10).is_empty());
    }

    #[test]
    fn ip_addresses() {
        assert!(is_valid_ip("9.8.7.1").is_empty());
        assert!(!is_valid_ip("9.1").is_empty());
        assert!(is_valid_ipv4_address("127.0.0.1").is_empty());
        assert!(!is_valid_ipv4_address("::1").is_empty());
        assert!(is_valid_ipv6_address("::1").is_empty());
        assert!(!is_valid_ipv6_address("127.0.0.1").is_empty());
    }

    #[test]
    fn percents() {
        assert!(is_valid_percent("99%").is_empty());
        assert!(is_valid_percent("0%").is_empty());
        assert!(!is_valid_percent("01%").is_empty());
        assert!(!is_valid_percent("99").is_empty());
    }

    #[test]
    fn passwords() {
        assert!(is_valid_password("Wto1260644864!").is_empty());
        assert!(!is_valid_password("short1!").is_empty());
        assert!(!is_valid_password("alllowercase1!").is_empty());
        assert!(!is_valid_password("NoSpecials123").is_empty());
    }

    #[test]
    fn descriptions_and_paths() {
        assert!(is_valid_description("ok").is_empty());
        assert!(!is_valid_description(&"d".repeat(257)).is_empty());
        assert!(!is_existing_dir("definitely/not/a/dir").is_empty());
        assert!(!is_existing_file("definitely-not-a-file").is_empty());
        assert!(is_existing_dir("/").is_empty());
    }

    #[test]
    fn message_helpers() {
        assert_eq!(empty_error(), "must be not empty");
        assert_eq!(max_len_error(63), "must be not over 63");
        assert_eq!(inclusive_range_error(1, 10), "must be between 1 and 10, inclusive");
        assert_eq!(
            prefix_each("p: ", &["a".to_string(), "b".to_string()]),
            "p: a, p: b"
        );
        assert_eq!(prefix_each("p: ", &[]), "");
        assert!(regexp_error("msg", "f", &[]).contains("fmt used for regexp is 'f'"));
        assert!(regexp_error("msg", "f", &["x", "y"]).contains("x, or y, "));
    }
}
