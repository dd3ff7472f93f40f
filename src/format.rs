//! Display formatting for metric cards and tables.

/// `3810000` → `"3,810,000"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `2_465_000.0, 1` → `"2.5M"`.
pub fn millions(value: f64, decimals: usize) -> String {
    format!("{:.*}M", decimals, value / 1_000_000.0)
}

/// `6.6412, 2` → `"6.64%"`.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// Undefined values render as a dash.
pub fn optional<T>(value: Option<T>, f: impl FnOnce(T) -> String) -> String {
    value.map(f).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits_by_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(3_810_000), "3,810,000");
        assert_eq!(thousands(120_000_000_000), "120,000,000,000");
    }

    #[test]
    fn formats_cards() {
        assert_eq!(millions(2_465_000.0, 1), "2.5M");
        assert_eq!(millions(416_369.5, 2), "0.42M");
        assert_eq!(percent(6.6412, 2), "6.64%");
        assert_eq!(percent(16.59, 1), "16.6%");
        assert_eq!(optional(None::<f64>, |v| percent(v, 1)), "-");
        assert_eq!(optional(Some(3.0), |v| percent(v, 1)), "3.0%");
    }
}
