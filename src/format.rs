// Display formatters: magnitude-scaled strings for bytes, hashrate, difficulty,
// satoshi counts, elapsed time and durations, plus price strings.
//
// Magnitude tiers round to a fixed number of decimals with ties going away
// from zero; time units truncate with integer division.

/// Fixed-decimal rendering where exact ties round away from zero.
///
/// `format!("{:.N}")` rounds exact ties to even (`1.25` -> `"1.2"`), the
/// dashboard expects `"1.3"`. Values that only look like ties after scaling
/// (e.g. `1.45`, stored as 1.4499..) keep the exact-decimal result.
pub fn to_fixed(value: f64, digits: usize) -> String {
    // Adding +0.0 turns -0.0 into 0.0.
    let value = value + 0.0;
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    let is_exact_tie =
        (scaled - scaled.trunc()).abs() == 0.5 && value.mul_add(factor, -scaled) == 0.0;
    if is_exact_tie {
        let rounded = scaled.trunc() + scaled.signum();
        return format!("{:.*}", digits, rounded / factor);
    }
    format!("{value:.digits$}")
}

/// Shortest round-trip decimal, without a negative zero.
fn plain_number(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    format!("{value}")
}

/// Insert `,` every three digits of the integer part of a decimal string.
fn group_digits(decimal: &str) -> String {
    let (sign, rest) = match decimal.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", decimal),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `"1.2 MB"`, `"3.4 KB"`, `"999 B"`.
pub fn format_bytes(bytes: f64) -> String {
    if bytes >= 1e6 {
        format!("{} MB", to_fixed(bytes / 1e6, 1))
    } else if bytes >= 1e3 {
        format!("{} KB", to_fixed(bytes / 1e3, 1))
    } else {
        format!("{} B", plain_number(bytes))
    }
}

/// `"650 EH/s"`; no decimals in any tier.
pub fn format_hashrate(hashrate: f64) -> String {
    if hashrate >= 1e18 {
        format!("{} EH/s", to_fixed(hashrate / 1e18, 0))
    } else if hashrate >= 1e15 {
        format!("{} PH/s", to_fixed(hashrate / 1e15, 0))
    } else if hashrate >= 1e12 {
        format!("{} TH/s", to_fixed(hashrate / 1e12, 0))
    } else {
        format!("{} H/s", to_fixed(hashrate, 0))
    }
}

/// `"83.15T"`; below a million the raw number is returned.
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e12 {
        format!("{}T", to_fixed(difficulty / 1e12, 2))
    } else if difficulty >= 1e9 {
        format!("{}B", to_fixed(difficulty / 1e9, 2))
    } else if difficulty >= 1e6 {
        format!("{}M", to_fixed(difficulty / 1e6, 2))
    } else {
        plain_number(difficulty)
    }
}

/// Compact satoshi count: `"1.5K"`, `"2.1M"`; below a thousand a grouped integer.
pub fn format_sats_number(sats: f64) -> String {
    if sats >= 1e12 {
        format!("{}T", to_fixed(sats / 1e12, 1))
    } else if sats >= 1e9 {
        format!("{}B", to_fixed(sats / 1e9, 1))
    } else if sats >= 1e6 {
        format!("{}M", to_fixed(sats / 1e6, 1))
    } else if sats >= 1e3 {
        format!("{}K", to_fixed(sats / 1e3, 1))
    } else {
        group_digits(&to_fixed(sats, 0))
    }
}

/// Seconds elapsed rendered as `"42s ago"`, `"5m ago"`, `"2h 3m ago"`, `"3d ago"`.
pub fn format_elapsed(diff_secs: f64) -> String {
    if diff_secs < 60.0 {
        format!("{}s ago", diff_secs.floor() as i64)
    } else if diff_secs < 3600.0 {
        format!("{}m ago", (diff_secs / 60.0).floor() as i64)
    } else if diff_secs < 86400.0 {
        let hours = (diff_secs / 3600.0).floor() as i64;
        let minutes = ((diff_secs % 3600.0) / 60.0).floor() as i64;
        format!("{hours}h {minutes}m ago")
    } else {
        format!("{}d ago", (diff_secs / 86400.0).floor() as i64)
    }
}

/// Time since a unix-seconds timestamp, relative to `now_secs`.
pub fn format_time_ago(timestamp_secs: u64, now_secs: f64) -> String {
    format_elapsed(now_secs - timestamp_secs as f64)
}

/// `"2d 3h 4m"`, `"1h 30m"`, `"0m"`.
pub fn format_duration(millis: u64) -> String {
    let minutes = millis / 1000 / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{days}d {}h {}m", hours % 24, minutes % 60)
    } else if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

/// `"$67,432.10"`.
pub fn format_usd(usd: f64) -> String {
    format!("${}", group_digits(&to_fixed(usd, 2)))
}

/// Short-scale compact notation: `"25B"`, `"1.2K"`, `"345M"`.
///
/// Below 10 of a unit one decimal is kept, trailing `.0` dropped; from 10 up
/// the value is rounded to an integer. A value that would round to 1000 of a
/// unit moves up to the next one (`999_950` -> `"1M"`).
pub fn format_compact(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];
    let mut unit = (1.0, "");
    for (size, suffix) in UNITS {
        if value.abs() / unit.0 >= 999.5 {
            unit = (size, suffix);
        }
    }
    let scaled = value / unit.0;
    let digits = if to_fixed(scaled.abs(), 1).parse::<f64>().is_ok_and(|v| v < 10.0) {
        1
    } else {
        0
    };
    let rendered = to_fixed(scaled, digits);
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{rendered}{}", unit.1)
}

/// 24h trading volume in dollars: `"$25B"`.
pub fn format_usd_volume(usd: f64) -> String {
    format!("${}", format_compact(usd))
}

/// `"+1.2%"` / `"-0.4%"`.
pub fn format_percent_change(change: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{sign}{}%", to_fixed(change, 1))
}

/// USD value of one satoshi: `"1 sat = $0.00067432"`.
pub fn format_sat_price(usd: f64) -> String {
    format!("1 sat = ${}", to_fixed(usd / 100_000_000.0, 8))
}

/// Satoshis bought by one dollar: `"1.5K sats"`.
pub fn format_sats_per_usd(usd: f64) -> String {
    format!("{} sats", format_sats_number(100_000_000.0 / usd))
}
