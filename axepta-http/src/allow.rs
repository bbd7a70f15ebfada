//! Customer email allow-list.
//!
//! Restricts the payment method to a handful of customers, typically while
//! testing a live merchant account.

use axepta::GatewayConfig;

/// Emails allowed to pay. An empty list allows everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailAllowList {
    emails: Vec<String>,
}

impl EmailAllowList {
    /// Builds a list from individual emails; blank entries are dropped.
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|email| email.as_ref().trim().to_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    /// Builds a list from a comma separated string.
    #[must_use]
    pub fn from_csv(emails: &str) -> Self {
        Self::new(emails.split(','))
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn allows_everyone(&self) -> bool {
        self.emails.is_empty()
    }

    /// Checks `email` case-insensitively. A blank email is refused unless
    /// the list is empty.
    #[must_use]
    pub fn is_allowed(&self, email: &str) -> bool {
        if self.allows_everyone() {
            return true;
        }
        let email = email.trim().to_lowercase();
        !email.is_empty() && self.emails.contains(&email)
    }
}

impl From<&GatewayConfig> for EmailAllowList {
    fn from(config: &GatewayConfig) -> Self {
        Self::new(&config.allowed_emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_allows_everyone() {
        let list = EmailAllowList::from_csv("");
        assert!(list.allows_everyone());
        assert!(list.is_allowed(""));
        assert!(list.is_allowed("anyone@example.com"));
    }

    #[test]
    fn test_match_is_trimmed_and_case_insensitive() {
        let list = EmailAllowList::from_csv(" QA@Shop.example , dev@shop.example,");
        assert!(list.is_allowed("qa@shop.example"));
        assert!(list.is_allowed("Dev@Shop.Example"));
        assert!(!list.is_allowed("other@shop.example"));
        assert!(!list.is_allowed(""));
    }

    #[test]
    fn test_from_config() {
        let config = GatewayConfig {
            allowed_emails: vec!["a@b.c".to_owned()],
            ..GatewayConfig::default()
        };
        let list = EmailAllowList::from(&config);
        assert!(list.is_allowed("A@B.C"));
        assert!(!list.is_allowed("d@e.f"));
    }
}
