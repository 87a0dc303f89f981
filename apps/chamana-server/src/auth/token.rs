// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token codec and verifier.
//!
//! Tokens are HS256 JWTs: `header.claims.signature`, each segment unpadded
//! base64url. Segments are only transport-encoded: anyone holding a token
//! can read its claims.
//!
//! Expiry is checked here against the caller's `now` rather than by
//! `jsonwebtoken`, so verification stays a pure function of
//! `(token, secret, now)`. There is no revocation list and no replay
//! protection.

use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::Claims;
use super::error::{TokenError, TtlError};

/// Lifetime used when a TTL string cannot be parsed.
pub const DEFAULT_TTL_SECS: i64 = 7 * 24 * 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Parse a TTL of the form `<integer><unit>`, unit one of `s`, `m`, `h`, `d`.
///
/// Returns the lifetime in seconds.
pub fn parse_ttl(ttl: &str) -> Result<i64, TtlError> {
    let ttl = ttl.trim();
    let Some(unit) = ttl.chars().last() else {
        return Err(TtlError::Empty);
    };

    let multiplier: i64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        other => return Err(TtlError::UnknownUnit(other)),
    };

    let digits = &ttl[..ttl.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TtlError::InvalidAmount(ttl.to_string()));
    }

    digits
        .parse::<i64>()
        .ok()
        .and_then(|amount| amount.checked_mul(multiplier))
        .ok_or_else(|| TtlError::InvalidAmount(ttl.to_string()))
}

/// Like [`parse_ttl`], but substitutes [`DEFAULT_TTL_SECS`] for input it
/// cannot parse.
pub fn ttl_secs_or_default(ttl: &str) -> i64 {
    match parse_ttl(ttl) {
        Ok(secs) => secs,
        Err(e) => {
            tracing::warn!(ttl = %ttl, error = %e, "Unparseable token TTL, using 7d");
            DEFAULT_TTL_SECS
        }
    }
}

/// Encode `claims` with `exp = iat + ttl` and sign with `secret`.
pub fn encode(claims: &Claims, secret: &[u8], ttl: &str) -> Result<String, TokenError> {
    let exp = claims
        .iat
        .checked_add(ttl_secs_or_default(ttl))
        .ok_or(TokenError::InvalidClaims("expiry overflows"))?;
    sign(&claims.clone().with_expiry(exp), secret)
}

/// Sign `claims` exactly as given.
pub fn sign(claims: &Claims, secret: &[u8]) -> Result<String, TokenError> {
    if !claims.is_consistent() {
        return Err(TokenError::InvalidClaims("exp precedes iat"));
    }

    jsonwebtoken::encode(
        &Header::new(ALGORITHM),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| TokenError::Encoding(e.to_string()))
}

/// Read the claims of a token without checking its signature or expiry.
pub fn decode(token: &str) -> Result<Claims, TokenError> {
    let mut validation = validation();
    validation.insecure_disable_signature_validation();

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|_| TokenError::Malformed)
}

/// Verify `token` against `secret` at time `now` (Unix seconds).
///
/// Returns `None` on any failure.
pub fn verify(token: &str, secret: &[u8], now: i64) -> Option<Claims> {
    verify_detailed(token, secret, now).ok()
}

/// Verify `token`, reporting why it was rejected.
pub fn verify_detailed(token: &str, secret: &[u8], now: i64) -> Result<Claims, TokenError> {
    let claims = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
        _ => TokenError::Malformed,
    })?;

    if !claims.is_consistent() {
        return Err(TokenError::Malformed);
    }
    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// HS256 only; `exp` is optional and checked by the caller against its clock.
fn validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    const SECRET: &[u8] = b"chamana-test-secret";
    const IAT: i64 = 1_700_000_000;

    fn claims(role: Role) -> Claims {
        Claims::new("usr_42", "rosa@chamana.pe", role, IAT)
    }

    #[test]
    fn parse_ttl_accepts_all_units() {
        assert_eq!(parse_ttl("45s"), Ok(45));
        assert_eq!(parse_ttl("15m"), Ok(900));
        assert_eq!(parse_ttl("2h"), Ok(7_200));
        assert_eq!(parse_ttl("7d"), Ok(604_800));
        assert_eq!(parse_ttl("0s"), Ok(0));
    }

    #[test]
    fn parse_ttl_rejects_bad_input() {
        assert_eq!(parse_ttl(""), Err(TtlError::Empty));
        assert_eq!(parse_ttl("10w"), Err(TtlError::UnknownUnit('w')));
        assert!(matches!(parse_ttl("h"), Err(TtlError::InvalidAmount(_))));
        assert!(matches!(parse_ttl("-5m"), Err(TtlError::InvalidAmount(_))));
        assert!(matches!(parse_ttl("1.5h"), Err(TtlError::InvalidAmount(_))));
        assert!(matches!(
            parse_ttl("99999999999999999999d"),
            Err(TtlError::InvalidAmount(_))
        ));
    }

    #[test]
    fn unparseable_ttl_falls_back_to_seven_days() {
        assert_eq!(ttl_secs_or_default("soon"), DEFAULT_TTL_SECS);

        let token = encode(&claims(Role::Customer), SECRET, "forever").unwrap();
        assert_eq!(decode(&token).unwrap().exp, Some(IAT + DEFAULT_TTL_SECS));
    }

    #[test]
    fn token_has_three_base64url_segments() {
        let token = encode(&claims(Role::Admin), SECRET, "1h").unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            assert!(part
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
        }
    }

    #[test]
    fn verify_round_trips_claims() {
        let original = claims(Role::Artisan);
        let token = encode(&original, SECRET, "1h").unwrap();

        let verified = verify(&token, SECRET, IAT + 10).unwrap();
        assert_eq!(verified, original.with_expiry(IAT + 3_600));
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = encode(&claims(Role::Admin), SECRET, "1h").unwrap();
        assert_eq!(verify(&token, b"another-secret", IAT), None);
        assert_eq!(
            verify_detailed(&token, b"another-secret", IAT),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn expiry_boundary_is_exact() {
        let token = encode(&claims(Role::Customer), SECRET, "60s").unwrap();
        assert!(verify(&token, SECRET, IAT + 59).is_some());
        assert_eq!(
            verify_detailed(&token, SECRET, IAT + 60),
            Err(TokenError::Expired)
        );
        assert!(verify(&token, SECRET, IAT + 61).is_none());
    }

    #[test]
    fn signed_token_without_expiry_never_expires() {
        let token = sign(&claims(Role::Guest), SECRET).unwrap();
        let verified = verify(&token, SECRET, i64::MAX).unwrap();
        assert_eq!(verified.exp, None);
    }

    #[test]
    fn sign_rejects_expiry_before_issue() {
        let bad = claims(Role::Guest).with_expiry(IAT - 1);
        assert!(matches!(sign(&bad, SECRET), Err(TokenError::InvalidClaims(_))));
    }

    /// Sign an arbitrary payload with `header`, bypassing claim checks.
    fn sign_raw(header: Header, payload: serde_json::Value) -> String {
        jsonwebtoken::encode(&header, &payload, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let token = encode(&claims(Role::Customer), SECRET, "1h").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        // Admin claims minted under another key, spliced onto the customer token.
        let admin = encode(&claims(Role::Admin), b"attacker-key", "1h").unwrap();
        let forged_payload = admin.split('.').nth(1).unwrap();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            verify_detailed(&forged, SECRET, IAT),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let token = encode(&claims(Role::Customer), SECRET, "1h").unwrap();
        let truncated = &token[..token.len() / 2];

        let cases = [
            "",
            "abc",
            "a.b",
            "a.b.c.d",
            "..",
            "!!!.???.***",
            truncated,
        ];
        for case in cases {
            assert!(verify(case, SECRET, IAT).is_none(), "accepted {case:?}");
        }
        assert_eq!(verify_detailed("a.b", SECRET, IAT), Err(TokenError::Malformed));
        assert_eq!(decode("a.b"), Err(TokenError::Malformed));
    }

    #[test]
    fn signed_garbage_payload_is_malformed() {
        let token = sign_raw(
            Header::new(Algorithm::HS256),
            serde_json::json!({ "sub": "x", "role": "root" }),
        );
        assert_eq!(verify_detailed(&token, SECRET, IAT), Err(TokenError::Malformed));
    }

    #[test]
    fn signed_expiry_before_issue_is_malformed() {
        let token = sign_raw(
            Header::new(Algorithm::HS256),
            serde_json::json!({
                "sub": "usr_42",
                "email": "rosa@chamana.pe",
                "role": "customer",
                "iat": IAT,
                "exp": IAT - 1,
            }),
        );
        assert_eq!(verify_detailed(&token, SECRET, IAT - 10), Err(TokenError::Malformed));
    }

    #[test]
    fn other_hmac_algorithm_is_malformed() {
        let token = sign_raw(
            Header::new(Algorithm::HS512),
            serde_json::to_value(claims(Role::Admin)).unwrap(),
        );
        assert_eq!(verify_detailed(&token, SECRET, IAT), Err(TokenError::Malformed));
    }

    #[test]
    fn unsigned_algorithm_is_malformed() {
        let token = encode(&claims(Role::Admin), SECRET, "1h").unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        // {"alg":"none","typ":"JWT"}
        let forged = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{rest}");

        assert_eq!(verify_detailed(&forged, SECRET, IAT), Err(TokenError::Malformed));
    }

    #[test]
    fn decode_reads_claims_without_secret() {
        let original = claims(Role::Artisan);
        let token = encode(&original, SECRET, "2h").unwrap();
        let decoded = decode(&token).unwrap();
        assert_eq!(decoded.sub, "usr_42");
        assert_eq!(decoded.exp, Some(IAT + 7_200));
    }
}
