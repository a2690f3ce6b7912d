use rand::RngExt;
use subtle::ConstantTimeEq;

/// Uniformly random 6-digit code in `100000..=999999`.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000u32..=999_999).to_string()
}

/// Exact match of trimmed strings, compared in constant time.
pub fn codes_match(stored: &str, submitted: &str) -> bool {
    stored
        .trim()
        .as_bytes()
        .ct_eq(submitted.trim().as_bytes())
        .into()
}
