use serde::{Deserialize, Serialize};

/// A minted payment token. Immutable once minted; tokens never expire in
/// this engine.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Caller-facing handle, unique within the vault's lifetime.
    pub subscription_id: String,
    /// Opaque secret-like string, unique; the vault's lookup key.
    pub token: String,
    /// Fixed status code: "0" means minted ok.
    pub tokenizer_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_wire_field_names() {
        let token = Token {
            subscription_id: "1672567200000-0".into(),
            token: "abc123".into(),
            tokenizer_code: "0".into(),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["subscriptionId"], "1672567200000-0");
        assert_eq!(json["token"], "abc123");
        assert_eq!(json["tokenizerCode"], "0");
    }
}
