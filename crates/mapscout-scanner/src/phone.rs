//! Phone number recovery from raw page text.

use crate::error::{Result, ScanError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Ordered phone patterns tried against a detail page's body text when
/// structured extraction fails.
///
/// Patterns are tried most specific first: a parenthesized area code, a bare
/// area code, then any five-plus-four digit group. The first pattern with a
/// match wins and its first match is returned as digits only.
#[derive(Debug, Clone)]
pub struct PhonePatterns {
    patterns: Vec<Regex>,
}

impl PhonePatterns {
    /// Build the pattern list for a regional area code such as `"71"`.
    pub fn for_area_code(area_code: &str) -> Result<Self> {
        if area_code.is_empty() || !area_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ScanError::InvalidConfig(format!(
                "area code must be digits, got '{area_code}'"
            )));
        }

        let code = regex::escape(area_code);
        let sources = [
            format!(r"\({code}\)\s*9?[0-9]{{4}}[-\s]?[0-9]{{4}}"),
            format!(r"{code}\s*9?[0-9]{{4}}[-\s]?[0-9]{{4}}"),
            r"[0-9]{5}[-\s]?[0-9]{4}".to_string(),
        ];

        let patterns = sources
            .iter()
            .map(|src| {
                Regex::new(src)
                    .map_err(|e| ScanError::InvalidConfig(format!("phone pattern '{src}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// First phone number found in `text`, normalized to its digits.
    pub fn first_match(&self, text: &str) -> Option<String> {
        self.patterns
            .iter()
            .find_map(|re| re.find(text))
            .map(|m| digits_only(m.as_str()))
    }
}

fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn contact_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:\+55|55)?(?:\s|-)?\(?[1-9]{2}\)?(?:\s|-)?(?:9\s?)?[0-9]{4}(?:\s|-)?[0-9]{4}",
        )
        .expect("valid contact number regex")
    })
}

/// Every distinct Brazilian-format phone number in `text`, as written (minus
/// surrounding whitespace) and in order of first appearance.
pub fn find_contact_numbers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    contact_number_regex()
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> PhonePatterns {
        PhonePatterns::for_area_code("71").expect("valid area code")
    }

    #[test]
    fn test_parenthesized_area_code() {
        assert_eq!(
            patterns().first_match("Ligue (71) 98888-7777 agora"),
            Some("71988887777".to_string())
        );
    }

    #[test]
    fn test_bare_area_code() {
        assert_eq!(
            patterns().first_match("Contato: 71 3333 4444"),
            Some("7133334444".to_string())
        );
    }

    #[test]
    fn test_generic_five_four_group() {
        assert_eq!(
            patterns().first_match("WhatsApp 98765-4321"),
            Some("987654321".to_string())
        );
    }

    #[test]
    fn test_pattern_priority_beats_position() {
        // The generic group appears first, but the area-code pattern is tried first.
        let text = "Pedidos 91234-5678 ou (71) 3222-1111";
        assert_eq!(patterns().first_match(text), Some("7132221111".to_string()));
    }

    #[test]
    fn test_loose_area_code_beats_earlier_generic_group() {
        let text = "Pedidos 91234-5678 ou 71 3222-1111";
        assert_eq!(patterns().first_match(text), Some("7132221111".to_string()));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(patterns().first_match("Sem telefone"), None);
        assert_eq!(patterns().first_match(""), None);
    }

    #[test]
    fn test_other_area_code() {
        let p = PhonePatterns::for_area_code("11").expect("valid area code");
        assert_eq!(
            p.first_match("Tel (11) 2345-6789"),
            Some("1123456789".to_string())
        );
    }

    #[test]
    fn test_invalid_area_code() {
        assert!(PhonePatterns::for_area_code("7a").is_err());
        assert!(PhonePatterns::for_area_code("").is_err());
    }

    #[test]
    fn test_find_contact_numbers_distinct_in_order() {
        let text = "Fale (71) 99999-0000 ou +55 71 3333-2222. Repito: (71) 99999-0000";
        assert_eq!(
            find_contact_numbers(text),
            vec!["(71) 99999-0000".to_string(), "+55 71 3333-2222".to_string()]
        );
    }

    #[test]
    fn test_find_contact_numbers_none() {
        assert!(find_contact_numbers("nada aqui").is_empty());
    }
}
