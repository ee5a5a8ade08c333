use rand::Rng;

/// Redemption code alphabet: uppercase alphanumerics without the easily
/// confused 0/O and 1/I, so staff can read a code over the counter.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Symbols per code, displayed in groups of four (XXXX-XXXX-XXXX).
const CODE_LEN: usize = 12;
const GROUP_LEN: usize = 4;

/// Generate one candidate redemption code in canonical grouped form.
/// Uniqueness is the caller's responsibility (checked against storage).
pub fn generate_claim_code() -> String {
    let mut rng = rand::thread_rng();
    let raw: Vec<u8> = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect();
    group(&raw)
}

/// Normalize user input (any casing, with or without separators) into the
/// canonical grouped form, or `None` if it cannot be a valid code.
pub fn normalize_claim_code(input: &str) -> Option<String> {
    let compact: Vec<u8> = input
        .bytes()
        .filter(|b| !matches!(b, b'-' | b' ' | b'\t'))
        .map(|b| b.to_ascii_uppercase())
        .collect();

    if compact.len() != CODE_LEN || !compact.iter().all(|b| ALPHABET.contains(b)) {
        return None;
    }
    Some(group(&compact))
}

fn group(raw: &[u8]) -> String {
    raw.chunks(GROUP_LEN)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_shape() {
        let code = generate_claim_code();
        assert_eq!(code.len(), CODE_LEN + 2); // two hyphens
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            assert_eq!(part.len(), GROUP_LEN);
            assert!(part.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_generated_code_avoids_ambiguous_symbols() {
        for _ in 0..50 {
            let code = generate_claim_code();
            assert!(!code.contains('0'));
            assert!(!code.contains('O'));
            assert!(!code.contains('1'));
            assert!(!code.contains('I'));
        }
    }

    #[test]
    fn test_normalize_accepts_messy_input() {
        assert_eq!(
            normalize_claim_code("abcd-efgh-jklm"),
            Some("ABCD-EFGH-JKLM".to_string())
        );
        assert_eq!(
            normalize_claim_code("ABCDEFGHJKLM"),
            Some("ABCD-EFGH-JKLM".to_string())
        );
        assert_eq!(
            normalize_claim_code(" abcd efgh jklm "),
            Some("ABCD-EFGH-JKLM".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_invalid_input() {
        assert_eq!(normalize_claim_code(""), None);
        assert_eq!(normalize_claim_code("ABCD-EFGH"), None); // too short
        assert_eq!(normalize_claim_code("ABCD-EFGH-JKL0"), None); // excluded symbol
        assert_eq!(normalize_claim_code("ABCD-EFGH-JKLM-NPQR"), None); // too long
    }

    #[test]
    fn test_generated_code_normalizes_to_itself() {
        let code = generate_claim_code();
        assert_eq!(normalize_claim_code(&code), Some(code.clone()));
        assert_eq!(normalize_claim_code(&code.to_lowercase()), Some(code));
    }
}
