use serde::Deserialize;

use crate::Time;

/// Parse time string in HH:MM:SS format to seconds since midnight.
///
/// Hours may exceed 23 for trips running past midnight; `H:MM:SS` is accepted.
pub(super) fn parse_time(time_str: &str) -> Option<Time> {
    let bytes = time_str.as_bytes();

    // Fast path for HH:MM:SS format
    if bytes.len() == 8 && bytes[2] == b':' && bytes[5] == b':' {
        let pair = |i: usize| -> Option<Time> {
            let (tens, ones) = (bytes[i], bytes[i + 1]);
            (tens.is_ascii_digit() && ones.is_ascii_digit())
                .then(|| Time::from(tens - b'0') * 10 + Time::from(ones - b'0'))
        };
        let (hours, minutes, seconds) = (pair(0)?, pair(3)?, pair(6)?);
        return (minutes < 60 && seconds < 60).then(|| hours * 3600 + minutes * 60 + seconds);
    }

    parse_time_fallback(time_str)
}

fn parse_time_fallback(time_str: &str) -> Option<Time> {
    let mut parts = time_str.split(':').map(|p| p.parse::<Time>().ok());
    let (Some(Some(hours)), Some(Some(minutes)), Some(Some(seconds)), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    (minutes < 60 && seconds < 60).then(|| hours * 3600 + minutes * 60 + seconds)
}

pub(super) fn deserialize_gtfs_date<'de, D>(
    deserializer: D,
) -> Result<Option<chrono::NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let date_str = String::deserialize(deserializer)?;
    if date_str.is_empty() {
        Ok(None)
    } else {
        chrono::NaiveDate::parse_from_str(&date_str, "%Y%m%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// Empty stop times are allowed by GTFS for untimed stops and become `None`
pub(super) fn deserialize_gtfs_time<'de, D>(deserializer: D) -> Result<Option<Time>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let time_str = String::deserialize(deserializer)?;
    if time_str.is_empty() {
        return Ok(None);
    }
    parse_time(&time_str)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid GTFS time '{time_str}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gtfs_times() {
        assert_eq!(parse_time("08:00:00"), Some(28800));
        assert_eq!(parse_time("25:30:15"), Some(91815));
        assert_eq!(parse_time("8:05:00"), Some(29100));
        assert_eq!(parse_time("08:75:00"), None);
        assert_eq!(parse_time("garbage"), None);
        assert_eq!(parse_time("0a:00:00"), None);
    }
}
