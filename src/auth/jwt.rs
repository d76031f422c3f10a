use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode, errors::Error};

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Tokens are minted by the identity service; this one only backs tests.
#[cfg(test)]
pub fn generate_access_token(
    user_id: u64,
    username: &str,
    role: crate::model::role::Role,
    employee_id: Option<u64>,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, Error> {
    use crate::models::TokenType;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    let claims = Claims {
        user_id,
        sub: username.to_string(),
        role: role.id(),
        exp: (chrono::Utc::now().timestamp() + ttl_secs) as usize,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
        employee_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
