use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::{
    AccessClaims, AccessToken, RefreshClaims, RefreshToken, TokenKind, TypedClaims,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// HS256 codec over one process-wide secret.
pub struct JwtHs256Codec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(signing_key: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        // no clock skew tolerated
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        JwtHs256Codec {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        }
    }

    fn encode_claims<C: Serialize>(&self, claims: &C) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    fn decode_claims<C>(&self, token: &str, expected: TokenKind) -> Result<C, AuthError>
    where
        C: DeserializeOwned + TypedClaims,
    {
        let data = decode::<C>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(kind = %expected, error = %e, "token rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            }
        })?;

        let actual = data.claims.kind();
        if actual != expected {
            debug!(%expected, %actual, "token kind mismatch");
            return Err(AuthError::TokenInvalid);
        }
        Ok(data.claims)
    }
}

impl TokenCodec for JwtHs256Codec {
    fn encode_access(&self, claims: &AccessClaims) -> Result<AccessToken, AuthError> {
        self.encode_claims(claims).map(AccessToken)
    }

    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<RefreshToken, AuthError> {
        self.encode_claims(claims).map(RefreshToken)
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.decode_claims(token, TokenKind::Access)
    }

    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.decode_claims(token, TokenKind::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::Identity;
    use chrono::{Duration, Utc};

    const SECRET: &[u8] = b"unit-test-secret";

    fn alice() -> Identity {
        Identity::new("42", "alice")
            .with_name("Alice Liddell")
            .with_avatar_url("https://avatars.example/u/42")
    }

    fn access_claims(lifetime: Duration) -> AccessClaims {
        let now = Utc::now();
        AccessClaims::new(&alice(), now, now + lifetime)
    }

    fn refresh_claims(lifetime: Duration) -> RefreshClaims {
        let now = Utc::now();
        RefreshClaims::new("42", "jti-1", now, now + lifetime)
    }

    #[test]
    fn access_claims_survive_encoding() {
        let codec = JwtHs256Codec::new(SECRET);
        let claims = access_claims(Duration::minutes(15));

        let token = codec.encode_access(&claims).unwrap();
        let decoded = codec.decode_access(token.as_str()).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.identity(), alice());
    }

    #[test]
    fn refresh_claims_survive_encoding() {
        let codec = JwtHs256Codec::new(SECRET);
        let claims = refresh_claims(Duration::days(7));

        let token = codec.encode_refresh(&claims).unwrap();

        assert_eq!(codec.decode_refresh(token.as_str()).unwrap(), claims);
    }

    #[test]
    fn access_token_is_not_accepted_as_refresh_token() {
        let codec = JwtHs256Codec::new(SECRET);
        let token = codec.encode_access(&access_claims(Duration::minutes(15))).unwrap();

        assert!(matches!(
            codec.decode_refresh(token.as_str()),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access_token() {
        let codec = JwtHs256Codec::new(SECRET);
        let token = codec.encode_refresh(&refresh_claims(Duration::days(7))).unwrap();

        assert!(matches!(
            codec.decode_access(token.as_str()),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let issuer = JwtHs256Codec::new(b"some-other-secret");
        let verifier = JwtHs256Codec::new(SECRET);
        let token = issuer.encode_access(&access_claims(Duration::minutes(15))).unwrap();

        assert!(matches!(
            verifier.decode_access(token.as_str()),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn expired_token_is_rejected_without_leeway() {
        let codec = JwtHs256Codec::new(SECRET);
        let now = Utc::now();
        // within the library's default 60s leeway, so this only fails with leeway = 0
        let claims = AccessClaims::new(&alice(), now - Duration::minutes(16), now - Duration::seconds(5));
        let token = codec.encode_access(&claims).unwrap();

        assert!(matches!(
            codec.decode_access(token.as_str()),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn malformed_and_tampered_tokens_are_rejected() {
        let codec = JwtHs256Codec::new(SECRET);
        assert!(matches!(codec.decode_access(""), Err(AuthError::TokenInvalid)));
        assert!(matches!(
            codec.decode_access("not.a.jwt"),
            Err(AuthError::TokenInvalid)
        ));

        let token = codec.encode_access(&access_claims(Duration::minutes(15))).unwrap();
        let mut tampered = token.0.clone();
        tampered.push('x');
        assert!(matches!(
            codec.decode_access(&tampered),
            Err(AuthError::TokenInvalid)
        ));
    }
}
