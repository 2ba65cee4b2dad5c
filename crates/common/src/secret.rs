//! Redacting holder for the OAuth client secret and the user's password.
//!
//! Both end up inside `ClientCredentials`, which is logged and debug-printed
//! freely, so the wrapper renders as a fixed mask and scrubs its buffer when
//! the last copy is dropped.

use std::fmt;
use zeroize::Zeroize;

const MASK: &str = "[REDACTED]";

pub struct Secret<T: Zeroize> {
    inner: T,
}

impl<T: Zeroize> Secret<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the plaintext. Only the token request body and the Basic header
    /// should need this.
    pub fn expose(&self) -> &T {
        &self.inner
    }
}

impl Secret<String> {
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for Secret<String> {
    fn from(inner: String) -> Self {
        Self::new(inner)
    }
}

impl From<&str> for Secret<String> {
    fn from(inner: &str) -> Self {
        Self::new(inner.to_owned())
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Login {
        username: String,
        password: Secret<String>,
    }

    #[test]
    fn password_never_shows_up_in_derived_debug() {
        let login = Login {
            username: "user@example.com".into(),
            password: Secret::from("hunter2"),
        };
        let rendered = format!("{login:?}");
        assert!(rendered.contains("user@example.com"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(login.password.to_string(), "[REDACTED]");
    }

    #[test]
    fn clones_expose_the_same_plaintext() {
        let secret = Secret::from(String::from("client-secret"));
        let copy = secret.clone();
        drop(secret);
        assert_eq!(copy.expose(), "client-secret");
        assert!(!copy.is_empty());
        assert!(Secret::from("").is_empty());
    }
}
