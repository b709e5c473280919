//! Dollar amounts travel as `f64` (that is what the backend stores), but any
//! sum that must balance is done in whole cents.

pub fn to_cents(amount: f64) -> i64 {
    if amount.is_finite() {
        (amount * 100.0).round() as i64
    } else {
        0
    }
}

pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Round to the nearest cent.
pub fn round_cents(amount: f64) -> f64 {
    from_cents(to_cents(amount))
}

/// Nearest integer, never NaN. Halves round away from zero.
pub fn round_percent(numerator: f64, denominator: f64) -> i64 {
    if denominator == 0.0 || !numerator.is_finite() || !denominator.is_finite() {
        return 0;
    }
    (numerator / denominator * 100.0).round() as i64
}

/// US-dollar formatting with thousands separators: `$12,000` or `$1,234.50`.
pub fn format_usd(amount: f64, decimals: usize) -> String {
    let cents = to_cents(amount);
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let (whole, frac) = if decimals == 0 {
        // Round half up on the absolute value, as currency formatters do.
        ((cents + 50) / 100, 0)
    } else {
        (cents / 100, cents % 100)
    };

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if decimals == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{frac:02}")
    }
}
