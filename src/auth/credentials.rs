/// Decides whether a submitted admin password is acceptable.
pub trait CredentialCheck: Send + Sync {
    fn verify(&self, password: &str) -> bool;
}

/// Single shared password taken from configuration.
pub struct StaticPasswordCheck {
    password: String,
}

impl StaticPasswordCheck {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl CredentialCheck for StaticPasswordCheck {
    fn verify(&self, password: &str) -> bool {
        !self.password.is_empty() && self.password == password
    }
}

impl std::fmt::Debug for StaticPasswordCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPasswordCheck").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_password() {
        let check = StaticPasswordCheck::new("s3cret");
        assert!(check.verify("s3cret"));
        assert!(!check.verify("S3cret"));
        assert!(!check.verify(""));
    }

    #[test]
    fn test_empty_configured_password_rejects_everything() {
        assert!(!StaticPasswordCheck::new("").verify(""));
    }
}
