//! Chemical-element symbols as exposed by grade schemas.
//!
//! Identity is case-insensitive. The canonical form is Titlecase (`Fe`,
//! `Mn`) and form-field keys use the lower-case form (`fe_raw`).

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementSymbol(String);

impl ElementSymbol {
    /// Normalize a raw symbol. Returns `None` for blank input and for
    /// anything that is not ASCII letters and digits, since the lower-case
    /// form is spliced into `_`-separated field keys.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        let mut chars = trimmed.chars();
        let first = chars.next()?;
        let mut canonical: String = first.to_uppercase().collect();
        canonical.extend(chars.flat_map(char::to_lowercase));
        Some(Self(canonical))
    }

    /// Canonical Titlecase form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form used inside form-field keys.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl TryFrom<String> for ElementSymbol {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or(CoreError::InvalidElement { raw })
    }
}

impl From<ElementSymbol> for String {
    fn from(symbol: ElementSymbol) -> Self {
        symbol.0
    }
}

impl fmt::Debug for ElementSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementSymbol({})", self.0)
    }
}

impl fmt::Display for ElementSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_form_is_titlecase() {
        assert_eq!(ElementSymbol::parse(" fe ").unwrap().as_str(), "Fe");
        assert_eq!(ElementSymbol::parse("MN").unwrap().as_str(), "Mn");
        assert_eq!(ElementSymbol::parse("c").unwrap().as_str(), "C");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(ElementSymbol::parse("").is_none());
        assert!(ElementSymbol::parse("   ").is_none());
        assert!(ElementSymbol::try_from(" ".to_string()).is_err());
    }

    #[test]
    fn separators_are_rejected() {
        assert!(ElementSymbol::parse("X_y").is_none());
        assert!(ElementSymbol::parse("F e").is_none());
        assert!(ElementSymbol::parse("Fe-2").is_none());
        assert_eq!(
            ElementSymbol::try_from("x_y".to_string()),
            Err(CoreError::InvalidElement { raw: "x_y".into() })
        );
    }

    #[test]
    fn key_is_lower_case() {
        assert_eq!(ElementSymbol::parse("Cr").unwrap().key(), "cr");
    }

    proptest! {
        #[test]
        fn identity_ignores_case(sym in "[A-Za-z]{1,3}") {
            let upper = ElementSymbol::parse(&sym.to_uppercase());
            let lower = ElementSymbol::parse(&sym.to_lowercase());
            prop_assert_eq!(upper, lower);
        }
    }
}
