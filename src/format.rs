use serde::{Deserialize, Serialize};

/// How a percentage value is stored at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentScale {
    /// 0.0 to 1.0, multiplied by 100 for display (dashboard ratios).
    Fraction,
    /// 0 to 100, displayed as-is (progress entries).
    Whole,
}

/// Two fixed decimals with `,` thousands separators and no currency symbol.
/// Missing or non-finite values render as `"0.00"`.
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => group_thousands(v),
        _ => "0.00".to_string(),
    }
}

pub fn format_currency(value: Option<f64>) -> String {
    let formatted = format_amount(value);
    match formatted.strip_prefix('-') {
        Some(unsigned) => format!("-${}", unsigned),
        None => format!("${}", formatted),
    }
}

pub fn format_percentage(value: Option<f64>, scale: PercentScale) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return "0.00%".to_string(),
    };

    let shown = match scale {
        PercentScale::Fraction => value * 100.0,
        PercentScale::Whole => value,
    };

    format!("{:.2}%", shown)
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Values that round to zero never carry a sign
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("{}{}.{}", sign, grouped, frac_part)
}
