use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;

pub const MAX_SYMBOL_LENGTH: usize = 12;
pub const MAX_NAME_LENGTH: usize = 100;

type CompiledPattern = OnceLock<Result<Regex, regex::Error>>;

static SYMBOL_PATTERN: CompiledPattern = OnceLock::new();
static SLUG_PATTERN: CompiledPattern = OnceLock::new();

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, Error> {
    if input.len() > max_len {
        return Err(Error::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(Error::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Matches `input` against `pattern`, compiled once into `compiled`.
fn is_match(compiled: &CompiledPattern, pattern: &str, input: &str) -> Result<bool, Error> {
    match compiled.get_or_init(|| Regex::new(pattern)) {
        Ok(re) => Ok(re.is_match(input)),
        Err(e) => Err(Error::Scraping(format!("regex compile error: {}", e))),
    }
}

/// Validate a ticker symbol (e.g. `AAPL`, `BRK.B`, `^GSPC`) and uppercase it.
pub fn validate_symbol(input: &str) -> Result<String, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_SYMBOL_LENGTH {
        return Err(Error::InvalidInput(format!(
            "symbol must be 1 to {} characters",
            MAX_SYMBOL_LENGTH
        )));
    }
    if !is_match(&SYMBOL_PATTERN, r"^[A-Za-z0-9.^\-]+$", trimmed)? {
        return Err(Error::InvalidInput(format!(
            "invalid symbol '{}'. Allowed characters: letters, digits, '.', '^', '-'",
            trimmed
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Validate page number (must be >= 1).
pub fn validate_page(page: i64) -> Result<i64, Error> {
    if page < 1 {
        return Err(Error::InvalidInput("page must be >= 1".to_string()));
    }
    Ok(page)
}

/// Validate a country name before it is looked up (length, control chars).
pub fn validate_country(input: &str) -> Result<String, Error> {
    sanitize_text(input, MAX_NAME_LENGTH)
}

/// File slug for a country name: lowercased, spaces become dashes
/// (`United States` -> `united-states`).
pub fn country_slug(input: &str) -> Result<String, Error> {
    let name = validate_country(input)?;
    let slug = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    if !is_match(&SLUG_PATTERN, r"^[a-z0-9]+(?:-[a-z0-9]+)*$", &slug)? {
        return Err(Error::InvalidInput(format!(
            "invalid country '{}'",
            name
        )));
    }
    Ok(slug)
}
