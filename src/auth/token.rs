/// CircleCI personal API token, presented as the `circle-token` query credential.
#[derive(Clone)]
pub struct Token(String);

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.trim().to_owned())
    }
}

impl From<Option<String>> for Token {
    fn from(value: Option<String>) -> Self {
        Self::from(value.as_deref().unwrap_or_default())
    }
}

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty token means the credential was never configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_str_creates_token() {
        let token = Token::from("0123456789abcdef0123456789abcdef01234567");

        assert_eq!(token.as_str(), "0123456789abcdef0123456789abcdef01234567");
        assert!(!token.is_empty());
    }

    #[test]
    fn test_token_from_empty_string_is_empty() {
        let token = Token::from("");

        assert!(token.is_empty());
    }

    #[test]
    fn test_token_from_whitespace_is_empty() {
        let token = Token::from("  \n");

        assert!(token.is_empty());
    }

    #[test]
    fn test_token_from_unset_env_is_empty() {
        let token = Token::from(None::<String>);

        assert!(token.is_empty());
    }

    #[test]
    fn test_token_from_set_env() {
        let token = Token::from(Some("circle_secret".to_string()));

        assert_eq!(token.as_str(), "circle_secret");
    }

    #[test]
    fn test_token_debug_redacts_value() {
        let token = Token::from("circle_very_secret_token");
        let debug_output = format!("{token:?}");

        assert_eq!(debug_output, "<redacted>");
        assert!(!debug_output.contains("secret"));
    }

    #[test]
    fn test_token_debug_in_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Client {
            token: Token,
            endpoint: String,
        }

        let client = Client {
            token: Token::from("super_secret_token"),
            endpoint: String::from("https://circleci.com/api/v1.1/"),
        };

        let debug_output = format!("{client:?}");

        assert!(debug_output.contains("<redacted>"));
        assert!(!debug_output.contains("super_secret_token"));
        assert!(debug_output.contains("https://circleci.com/api/v1.1/"));
    }
}
