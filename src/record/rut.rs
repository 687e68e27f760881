//! Chilean national id (RUT) normalization, check digit and formatting.

/// Splits a RUT into its numeric body and check digit.
///
/// Dots, dashes and spaces are ignored; the check digit is upper-cased.
/// Returns `None` when the input cannot be a RUT at all.
pub fn normalize(rut: &str) -> Option<(String, char)> {
    let cleaned: String = rut
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let mut chars = cleaned.chars();
    let check = chars.next_back()?;
    let body: String = chars.collect();

    if body.is_empty() || body.len() > 9 || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(check.is_ascii_digit() || check == 'K') {
        return None;
    }
    Some((body, check))
}

/// Modulo-11 check digit for a numeric body: `K` for 10, `0` for 11.
pub fn check_digit(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .zip([2u32, 3, 4, 5, 6, 7].iter().cycle())
        .map(|(digit, factor)| digit * factor)
        .sum();

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        d => char::from_digit(d, 10),
    }
}

/// Whether `rut` carries the correct check digit.
pub fn is_valid(rut: &str) -> bool {
    match normalize(rut) {
        Some((body, check)) => check_digit(&body) == Some(check),
        None => false,
    }
}

/// Formats as `12.345.678-9`. Returns `None` for malformed input.
pub fn format(rut: &str) -> Option<String> {
    let (body, check) = normalize(rut)?;
    let body = body.trim_start_matches('0');
    let body = if body.is_empty() { "0" } else { body };

    let mut grouped = String::new();
    for (i, c) in body.chars().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    Some(format!("{grouped}-{check}"))
}
