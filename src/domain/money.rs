use serde_json::Value;

/// Amounts are plain floating-point values, mirroring the persisted JSON schema.
/// Every amount that reaches a ledger is finite.
pub type Amount = f64;

/// Default currency symbol used when rendering amounts.
pub const DEFAULT_CURRENCY: &str = "₱";

/// Format an amount with a currency symbol and two decimals.
/// Example: ("₱", 12.5) -> "₱12.50", ("$", -3.0) -> "-$3.00"
pub fn format_amount(symbol: &str, amount: Amount) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}{:.2}", sign, symbol, amount.abs())
}

/// Coerce free-form text into a number.
///
/// Parses the longest leading numeric prefix ("12.5kg" -> 12.5, " -3" -> -3).
/// Input without digits, or whose value is not finite, yields 0.
pub fn safe_number(input: &str) -> Amount {
    parse_float_prefix(input)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Coerce an arbitrary JSON value into a number.
/// Numbers pass through, strings go through [`safe_number`], anything else is 0.
pub fn coerce_value(value: &Value) -> Amount {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
        Value::String(s) => safe_number(s),
        _ => 0.0,
    }
}

fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
