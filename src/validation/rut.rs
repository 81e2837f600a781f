//! Chilean RUT (Rol Único Tributario) handling

/// Strip dots and spaces and upper-case the check digit: `12.345.678-k` -> `12345678-K`
pub fn normalize_rut(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | ' '))
        .collect::<String>()
        .to_ascii_uppercase();

    if cleaned.contains('-') {
        return cleaned;
    }
    match cleaned.char_indices().last() {
        Some((split, _)) if split > 0 => format!("{}-{}", &cleaned[..split], &cleaned[split..]),
        _ => cleaned,
    }
}

/// Modulo-11 check digit for the numeric body
fn check_digit(body: &str) -> Option<char> {
    let mut sum = 0u32;
    let mut factor = 2u32;
    for c in body.chars().rev() {
        sum += c.to_digit(10)? * factor;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }
    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        n => char::from_digit(n, 10),
    }
}

/// True when the (normalized) RUT has a numeric body and a matching check digit
pub fn validate_rut(raw: &str) -> bool {
    let rut = normalize_rut(raw);
    let Some((body, dv)) = rut.split_once('-') else {
        return false;
    };
    if body.is_empty() || body.len() > 9 || dv.len() != 1 {
        return false;
    }
    check_digit(body).map(|c| dv.starts_with(c)).unwrap_or(false)
}
