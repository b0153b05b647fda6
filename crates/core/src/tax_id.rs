//! Brazilian individual taxpayer number (CPF) checksum.

/// Number of digits in a CPF.
pub const CPF_LEN: usize = 11;

/// Returns true when `value` is exactly eleven ASCII digits, not all the same
/// digit, and both trailing check digits match the mod-11 checksum.
pub fn is_valid_cpf(value: &str) -> bool {
    if value.len() != CPF_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = value.bytes().map(|b| u32::from(b - b'0')).collect();
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Computes the next check digit for a 9- or 10-digit prefix.
fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    let rem = sum % 11;
    if rem < 2 { 0 } else { 11 - rem }
}
