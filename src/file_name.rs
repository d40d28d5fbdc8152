use std::fmt::Display;
use chrono::{DateTime, Local, TimeZone};
use percent_encoding::percent_decode_str;
use reqwest::Url;

/// Picks a local file name for `url`: its last path segment, or a
/// timestamped fallback when there is no usable segment.
pub fn generate_output_file(url: &str) -> String {
    match get_file_name_from_url(url) {
        Some(file_name) => file_name,
        None => fallback_file_name(&Local::now()),
    }
}

pub fn get_file_name_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url.path_segments()?.filter(|segment| !segment.is_empty()).last()?;
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    // A decoded '/' splits the segment again; keep the last component.
    let file_name = decoded.rsplit('/').next()?;
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return None;
    }
    // An encoded '?' means the name would smuggle part of a query.
    if file_name.contains('?') {
        return None;
    }
    Some(file_name.to_string())
}

pub fn fallback_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("downloaded_file_{}", now.format("%Y%m%d_%H%M%S"))
}
