//! Email canonicalization.
//!
//! Only the domain is rewritten. It goes through UTS-46 processing, so case,
//! compatibility forms and internationalized labels all collapse to one ASCII
//! (punycode) spelling. The local part is left exactly as typed.

use std::borrow::Cow;

/// Convert the domain part of `email` to its ASCII form.
///
/// Input without an `@`, or whose domain is rejected by IDNA processing, is
/// returned trimmed but otherwise unchanged so the form validator can report
/// it as invalid.
pub fn email_to_punycode(email: &str) -> Cow<'_, str> {
    let trimmed = email.trim();
    let Some((local, domain)) = trimmed.rsplit_once('@') else {
        return Cow::Borrowed(trimmed);
    };

    match idna::domain_to_ascii(domain) {
        Ok(ascii) if ascii == domain => Cow::Borrowed(trimmed),
        Ok(ascii) => Cow::Owned(format!("{local}@{ascii}")),
        Err(e) => {
            tracing::debug!(error = ?e, "Email domain rejected by IDNA processing");
            Cow::Borrowed(trimmed)
        }
    }
}
