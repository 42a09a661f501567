//! Input validation shared by the action flows.
//!
//! Failures return the user-facing error line so steps can re-prompt without
//! touching the error taxonomy; step validation never propagates.

/// Normalize and validate a phone number: digits only after stripping
/// separators, at least 10 digits (country code included), no leading zero.
pub fn parse_phone(input: &str) -> Result<String, String> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err("El teléfono debe contener solo números.".to_string());
    }
    if cleaned.len() < 10 {
        return Err(
            "El teléfono debe incluir el código de país (mínimo 10 dígitos, ej. 59171234567)."
                .to_string(),
        );
    }
    if cleaned.starts_with('0') {
        return Err("El teléfono debe empezar con el código de país, no con 0.".to_string());
    }
    Ok(cleaned)
}

/// Parse a positive integer, stripping grouping characters first
/// ("150.000" and "150,000" both read as 150000).
pub fn parse_positive_int(input: &str) -> Result<u64, String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err("Ingresa un número válido.".to_string());
    }
    match digits.parse::<u64>() {
        Ok(0) => Err("El valor debe ser mayor a cero.".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err("Ingresa un número válido.".to_string()),
    }
}

/// Minimal email shape check. "no" / "ninguno" mean the client has none.
pub fn parse_email(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();
    if lowered == "no" || lowered == "ninguno" {
        return Ok(String::new());
    }
    if trimmed.contains('@') && trimmed.contains('.') && !trimmed.contains(' ') {
        Ok(trimmed.to_string())
    } else {
        Err("Email inválido. Ingresa un email válido o 'no' si no tiene.".to_string())
    }
}

/// Non-empty free text.
pub fn parse_text(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err("El texto no puede estar vacío.".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}
