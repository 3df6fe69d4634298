/// Formats an amount in minor units for display, e.g. `format_price(1234, "usd")` is `$12.34`.
///
/// Dollar, euro and pound get their symbol; any other currency is prefixed
/// with its upper-cased code (`CHF 12.00`). Thousands are grouped with commas.
pub fn format_price(amount_cents: i64, currency: &str) -> String {
    let negative = amount_cents < 0;
    let cents = amount_cents.unsigned_abs();
    let whole = group_thousands(cents / 100);
    let number = format!("{}.{:02}", whole, cents % 100);

    let code = currency.to_ascii_uppercase();
    let formatted = match code.as_str() {
        "USD" => format!("${number}"),
        "EUR" => format!("€{number}"),
        "GBP" => format!("£{number}"),
        _ => format!("{code} {number}"),
    };

    if negative {
        format!("-{formatted}")
    } else {
        formatted
    }
}

fn group_thousands(value: u64) -> String {
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
