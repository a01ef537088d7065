//! Phone number normalization for the payment provider's addressing format.

/// Kenya country calling code expected by the push-payment API.
pub const COUNTRY_CODE: &str = "254";

/// Normalizes a subscriber number to `254XXXXXXXXX` form.
///
/// Total over any input string: strips a leading `+`, replaces a leading
/// trunk `0` with the country code, and prepends the country code when it is
/// missing. Idempotent on already-normalized numbers.
pub fn normalize_msisdn(raw: &str) -> String {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if let Some(rest) = digits.strip_prefix('0') {
        return format!("{COUNTRY_CODE}{rest}");
    }
    if !digits.starts_with(COUNTRY_CODE) {
        return format!("{COUNTRY_CODE}{digits}");
    }
    digits.to_string()
}
