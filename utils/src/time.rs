//! Time formatting helpers.

use stake_types::Timestamp;

/// Format a duration in seconds using its two largest units, e.g. `"29d 23h"`.
pub fn format_duration(secs: u64) -> String {
    const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

    let mut parts = Vec::with_capacity(2);
    let mut rest = secs;
    for (size, suffix) in UNITS {
        let count = rest / size;
        if count > 0 || (!parts.is_empty() && parts.len() < 2) {
            parts.push(format!("{count}{suffix}"));
            rest %= size;
        }
        if parts.len() == 2 {
            break;
        }
    }
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.join(" ")
}

/// Describe a maturity instant relative to `now`.
pub fn format_maturity(now: Timestamp, matures_at: Timestamp) -> String {
    if matures_at.has_expired(0, now) {
        "matured".to_string()
    } else {
        format!("matures in {}", format_duration(now.elapsed_since(matures_at)))
    }
}
