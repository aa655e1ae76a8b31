use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid hex address format: {0}")]
    InvalidHexAddress(String),

    #[error("Invalid integer: {0}")]
    InvalidInteger(String),
}

/// `0x`-prefixed (optional) 20-byte hex address.
pub fn is_hex_address(address: &str) -> bool {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);

    digits.len() == 40 && hex::decode(digits).is_ok()
}

pub fn validate_hex_address(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    if !is_hex_address(address) {
        return Err(ValidationError::InvalidHexAddress(address.to_string()));
    }

    Ok(())
}

/// Check a decimal or `0x`-prefixed hex unsigned integer of any width, as
/// chain ids are written in route configs.
pub fn validate_big_uint(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingParameter("integer".to_string()));
    }

    let valid = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex_digits) => {
            !hex_digits.is_empty() && hex_digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => value.chars().all(|c| c.is_ascii_digit()),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidInteger(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_and_bare_addresses() {
        assert!(is_hex_address("0x1111111111111111111111111111111111111111"));
        assert!(is_hex_address("0XABCDEFabcdef0000000000000000000000000000"));
        assert!(is_hex_address("abcdefabcdef0000000000000000000000000000"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_hex_address(""));
        assert!(!is_hex_address("0x"));
        assert!(!is_hex_address("0x11111111111111111111111111111111111111"));
        assert!(!is_hex_address("0x111111111111111111111111111111111111111g"));
        assert_eq!(
            validate_hex_address(" "),
            Err(ValidationError::MissingParameter("address".to_string()))
        );
    }

    #[test]
    fn checks_decimal_and_hex_integers() {
        assert_eq!(validate_big_uint("56"), Ok(()));
        assert_eq!(validate_big_uint("0x38"), Ok(()));
        assert!(validate_big_uint("bsc").is_err());
        assert!(validate_big_uint("-1").is_err());
        assert!(validate_big_uint("0x").is_err());
        assert!(validate_big_uint("0x3g").is_err());
        assert!(validate_big_uint("").is_err());
    }

    #[test]
    fn integers_have_no_width_limit() {
        let wide = "1".repeat(40);
        assert_eq!(validate_big_uint(&wide), Ok(()));
        assert_eq!(validate_big_uint(&format!("0x{}", "f".repeat(64))), Ok(()));
    }
}
