//! Display formatting shared by cards, tables and chart labels.

/// Group the integer part with commas: `8650` → `8,650`
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a float, grouping the integer part and keeping up to
/// `max_decimals` significant decimals (trailing zeros trimmed).
pub fn number(value: f64, max_decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.*}", max_decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let grouped = int_part
        .parse::<u64>()
        .map(thousands)
        .unwrap_or_else(|_| int_part.to_string());

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Dollar amount: `85000.0` → `$85,000`
pub fn currency(value: f64) -> String {
    format!("${}", number(value, 2))
}

/// Escape HTML/XML special characters
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(920), "920");
        assert_eq!(thousands(4250), "4,250");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_number() {
        assert_eq!(number(12.0, 2), "12");
        assert_eq!(number(12.5, 2), "12.5");
        assert_eq!(number(85000.0, 2), "85,000");
        assert_eq!(number(-1500.25, 2), "-1,500.25");
        assert_eq!(number(f64::NAN, 2), "-");
    }

    #[test]
    fn test_currency_and_escape() {
        assert_eq!(currency(15000.0), "$15,000");
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
