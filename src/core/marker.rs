//! Text codec for the `Zone.Identifier` marker.
//!
//! The stored value is a small INI-style block:
//!
//! ```text
//! [ZoneTransfer]
//! ZoneId=3
//! HostUrl=about:internet
//! ```
//!
//! Parsing is lenient: anything another tool may have written is treated as
//! untrusted input, and a marker without a usable `ZoneId` parses as `None`
//! instead of failing.

use crate::core::types::{ZoneId, ZoneMarker};

/// Section header of the marker block.
pub const SECTION_HEADER: &str = "[ZoneTransfer]";

/// Line terminator used when writing markers.
pub const LINE_ENDING: &str = "\r\n";

const ZONE_ID_KEY: &str = "ZoneId";
const HOST_URL_KEY: &str = "HostUrl";

/// Renders a marker into its stored text form.
pub fn render(marker: &ZoneMarker) -> String {
    format!(
        "{SECTION_HEADER}{LINE_ENDING}{ZONE_ID_KEY}={}{LINE_ENDING}{HOST_URL_KEY}={}{LINE_ENDING}",
        marker.zone_id,
        marker.host_url_or_default(),
    )
}

/// Returns true if `url` can be stored as the `HostUrl` value.
///
/// A line break would end the value early and start a new key.
pub fn is_valid_host_url(url: &str) -> bool {
    !url.contains(['\r', '\n'])
}

/// Parses stored marker text.
///
/// Returns `None` when no `ZoneId` line parses as an integer in `[0,4]`.
/// Only the first occurrence of each key is considered.
pub fn parse(content: &str) -> Option<ZoneMarker> {
    let mut zone_id: Option<Option<ZoneId>> = None;
    let mut host_url: Option<String> = None;

    for line in content.split(['\r', '\n']).map(str::trim) {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();

        if key.eq_ignore_ascii_case(ZONE_ID_KEY) && zone_id.is_none() {
            zone_id = Some(
                value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(|raw| ZoneId::new(raw).ok()),
            );
        } else if key.eq_ignore_ascii_case(HOST_URL_KEY) && host_url.is_none() {
            let value = value.trim();
            if !value.is_empty() {
                host_url = Some(value.to_string());
            }
        }
    }

    let zone_id = zone_id.flatten()?;
    Some(ZoneMarker { zone_id, host_url })
}

/// Parses raw marker bytes, tolerating invalid UTF-8 and a leading BOM.
pub fn parse_bytes(bytes: &[u8]) -> Option<ZoneMarker> {
    let text = String::from_utf8_lossy(bytes);
    parse(text.trim_start_matches('\u{feff}'))
}
