//! Low-level matchers shared by the evaluator
//!
//! Glob patterns compile to anchored regexes and are cached process-wide;
//! IP matching goes through `ipnet`.

use crate::features::condition_eval::domain::ConditionError;
use ipnet::IpNet;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::net::IpAddr;

/// Cleared wholesale once it grows past this many patterns
const GLOB_CACHE_LIMIT: usize = 1024;

static GLOB_CACHE: Lazy<RwLock<HashMap<String, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Translate a glob into an anchored regex source
///
/// `*` matches any sequence, `?` any single character, everything else is
/// literal (including `.`).
pub fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");
    let mut literal = [0u8; 4];
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut literal))),
        }
    }
    out.push('$');
    out
}

/// Full-string glob match
pub fn glob_match(pattern: &str, candidate: &str) -> Result<bool, ConditionError> {
    if let Some(re) = GLOB_CACHE.read().get(pattern) {
        return Ok(re.is_match(candidate));
    }

    let re = Regex::new(&glob_to_regex(pattern)).map_err(|e| ConditionError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    let matched = re.is_match(candidate);

    let mut cache = GLOB_CACHE.write();
    if cache.len() >= GLOB_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(pattern.to_string(), re);
    Ok(matched)
}

/// Parse an IP literal (surrounding whitespace ignored)
pub fn parse_ip(text: &str) -> Result<IpAddr, ConditionError> {
    text.trim()
        .parse::<IpAddr>()
        .map_err(|_| ConditionError::InvalidValue {
            operator: "IpAddress".to_string(),
            value: text.to_string(),
        })
}

/// True if `addr` equals `spec` (bare IP) or falls inside it (CIDR)
pub fn ip_in(addr: IpAddr, spec: &str) -> Result<bool, ConditionError> {
    let spec = spec.trim();
    if spec.contains('/') {
        let net = spec
            .parse::<IpNet>()
            .map_err(|_| ConditionError::InvalidValue {
                operator: "IpAddress".to_string(),
                value: spec.to_string(),
            })?;
        Ok(net.contains(&addr))
    } else {
        Ok(parse_ip(spec)? == addr)
    }
}

/// Boolean normalization: `true`, `1`, `yes` (any case) are true
pub fn truthy(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
