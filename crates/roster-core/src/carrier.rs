//! Best-effort carrier classification for tracking codes.
//!
//! Patterns are tried in order and the first match wins. Codes are trimmed
//! and uppercased before matching. An unrecognised code is not an error; the
//! carrier is simply left unset.
//!
//! Because FedEx's 20+ digit form is tried before USPS, all-digit codes of
//! 20 or more characters classify as FedEx.

use regex::Regex;
use std::sync::LazyLock;

use crate::enums::Carrier;

macro_rules! carrier_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

carrier_pattern!(RE_UPS, r"^1Z[A-Z0-9]{16}$");
carrier_pattern!(RE_FEDEX_SHORT, r"^[0-9]{12,15}$");
carrier_pattern!(RE_FEDEX_LONG, r"^[0-9]{20,}$");
carrier_pattern!(RE_USPS, r"^[0-9]{20,22}$");
carrier_pattern!(RE_USPS_94, r"^94[0-9]{18,}$");
carrier_pattern!(RE_DHL, r"^[0-9]{10}$");

/// Ordered pattern table. First match wins.
static PATTERNS: [(&LazyLock<Option<Regex>>, Carrier); 6] = [
    (&RE_UPS, Carrier::Ups),
    (&RE_FEDEX_SHORT, Carrier::FedEx),
    (&RE_FEDEX_LONG, Carrier::FedEx),
    (&RE_USPS, Carrier::Usps),
    (&RE_USPS_94, Carrier::Usps),
    (&RE_DHL, Carrier::Dhl),
];

/// Normalise a raw tracking code: trim surrounding whitespace and uppercase.
#[must_use]
pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Infer the carrier for a tracking code, if any pattern matches.
#[must_use]
pub fn detect_carrier(code: &str) -> Option<Carrier> {
    let code = normalize(code);
    if code.is_empty() {
        return None;
    }
    PATTERNS.iter().find_map(|&(pattern, carrier)| {
        let compiled: &Option<Regex> = pattern;
        compiled
            .as_ref()
            .filter(|re| re.is_match(&code))
            .map(|_| carrier)
    })
}
