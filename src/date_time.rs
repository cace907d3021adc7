const MS_PER_DAY: i64 = 86_400_000;

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, with expanded years outside 0..=9999.
pub(crate) fn format_iso_8601_utc(timestamp_ms: i64) -> String {
    let (year, month, day, hour, minute, second, millisecond) = date_components_utc(timestamp_ms);
    let year_str = if (0..=9999).contains(&year) {
        format!("{year:04}")
    } else if year < 0 {
        format!("-{:06}", -(year as i128))
    } else {
        format!("+{year:06}")
    };
    format!("{year_str}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{millisecond:03}Z")
}

fn date_components_utc(timestamp_ms: i64) -> (i64, u32, u32, u32, u32, u32, u32) {
    let days = timestamp_ms.div_euclid(MS_PER_DAY);
    let rem = timestamp_ms.rem_euclid(MS_PER_DAY);
    let hour = (rem / 3_600_000) as u32;
    let minute = ((rem % 3_600_000) / 60_000) as u32;
    let second = ((rem % 60_000) / 1_000) as u32;
    let millisecond = (rem % 1_000) as u32;
    let (year, month, day) = civil_from_days(days);
    (year, month, day, hour, minute, second, millisecond)
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096).div_euclid(365);
    let mut year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2).div_euclid(153);
    let day = (doy - (153 * mp + 2).div_euclid(5) + 1) as u32;
    let month = (mp + if mp < 10 { 3 } else { -9 }) as u32;
    if month <= 2 {
        year += 1;
    }
    (year, month, day)
}

/// Milliseconds since the Unix epoch from the host clock; 0 if the clock is
/// before the epoch.
pub(crate) fn system_now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
