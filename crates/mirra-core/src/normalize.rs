/// Convert displayed count text (`"1,234"`, `"1.5K"`, `"2M"`) to an integer.
///
/// - Empty text, `"0"` and `"-"` are zero.
/// - Thousands separators (`,`) are ignored.
/// - A trailing `K` multiplies by 1 000, a trailing `M` by 1 000 000.
/// - Fractional results round half away from zero (`"1.0625K"` → 1063).
/// - Anything unparsable, negative, or non-finite is zero.
pub fn normalize_count(raw: &str) -> u64 {
    let text = raw.trim();
    if text.is_empty() || text == "0" || text == "-" {
        return 0;
    }

    let (number, multiplier) = if let Some(rest) = text.strip_suffix('K') {
        (rest, 1_000.0)
    } else if let Some(rest) = text.strip_suffix('M') {
        (rest, 1_000_000.0)
    } else {
        (text, 1.0)
    };

    let cleaned: String = number.chars().filter(|c| *c != ',').collect();
    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => (value * multiplier).round() as u64,
        _ => 0,
    }
}
