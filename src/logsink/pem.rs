//! PEM text normalization

/// Trim surrounding whitespace from PEM material, leaving inner lines untouched
pub fn normalize(text: &str) -> String {
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let pem = "-----BEGIN CERTIFICATE-----\ntest\n-----END CERTIFICATE-----";
        assert_eq!(normalize(pem), pem);
        assert_eq!(
            normalize("  \n-----BEGIN CERTIFICATE-----\ntest\n-----END CERTIFICATE-----\n  "),
            pem
        );
        assert_eq!(normalize("  \n X \n  "), "X");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n   "), "");
        assert_eq!(normalize("  hello world  "), "hello world");
    }
}
