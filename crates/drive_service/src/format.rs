//! Human-readable sizes, quotas, and timestamps.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::StorageQuota;

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Largest unit whose whole part is non-zero, truncated: `1536` is `"1KB"`, `512` is `"512bytes"`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut label = format!("{bytes}bytes");
    for unit in UNITS {
        value /= 1024.0;
        if value < 1.0 {
            break;
        }
        label = format!("{}{unit}", value.trunc() as u64);
    }
    label
}

/// `"Used 1.50 GB of 15.00 GB"`; values under one GiB are shown in MiB.
#[must_use]
pub fn format_quota(quota: &StorageQuota) -> String {
    let used = quota.usage_in_drive as f64;
    let used = if used / GIB >= 1.0 {
        format!("Used {:.2} GB", used / GIB)
    } else {
        format!("Used {:.2} MB", used / MIB)
    };
    let limit = quota.limit as f64;
    let limit = if limit / GIB >= 1.0 {
        format!("{:.2} GB", limit / GIB)
    } else {
        format!("{:.2} MB", limit / MIB)
    };
    format!("{used} of {limit}")
}

/// RFC3339 timestamp as `"Oct 18, 2026, 03:04:05 PM"` in UTC. Unparseable input is returned as is.
#[must_use]
pub fn format_date(rfc3339: &str) -> String {
    let Ok(parsed) = OffsetDateTime::parse(rfc3339, &Rfc3339) else {
        return rfc3339.to_string();
    };
    let utc = parsed.to_offset(time::UtcOffset::UTC);
    utc.format(format_description!(
        "[month repr:short] [day padding:none], [year], [hour repr:12]:[minute]:[second] [period]"
    ))
    .unwrap_or_else(|_| rfc3339.to_string())
}
