//! Display formatting for whole-KES amounts.

/// Formats an amount with thousands separators, e.g. `25000` -> `"25,000"`.
pub fn format_kes(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::format_kes;

    #[test]
    fn groups_digits_in_threes() {
        assert_eq!(format_kes(0), "0");
        assert_eq!(format_kes(5), "5");
        assert_eq!(format_kes(999), "999");
        assert_eq!(format_kes(1_000), "1,000");
        assert_eq!(format_kes(25_000), "25,000");
        assert_eq!(format_kes(30_000), "30,000");
        assert_eq!(format_kes(1_234_567), "1,234,567");
    }
}
