//! Phone number normalization and placeholder contact names.
//!
//! Contacts are correlated on the digits of their phone number only, so
//! `+52 55 1234-5678` and `525512345678` are the same contact. WhatsApp
//! itself reports senders as bare digit strings.

/// Prefix used for contacts created before their real name is known.
pub const PLACEHOLDER_PREFIX: &str = "Usuario";

/// Strip everything but ASCII digits.
pub fn normalize(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Placeholder name carrying the full phone, e.g. `Usuario 5215512345678`.
pub fn default_contact_name(phone: &str) -> String {
    format!("{} {}", PLACEHOLDER_PREFIX, phone)
}

/// Placeholder name carrying the last four characters of the phone.
///
/// Phones shorter than four characters are used whole.
pub fn short_contact_name(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let start = chars.len().saturating_sub(4);
    let tail: String = chars[start..].iter().collect();
    format!("{} {}", PLACEHOLDER_PREFIX, tail)
}
