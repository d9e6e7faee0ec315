// src/auth.rs
use crate::app_log;
use crate::core::repos::UserRepository;
use crate::core::Database;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_BYTES: usize = 16;
const HASH_SEPARATOR: char = ':';

// ===== Passwords =====

/// Salted SHA-256, stored as `salt_hex:digest_hex`.
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_BYTES] = rand::random();
    let salt = hex::encode(salt);
    let digest = salted_digest(&salt, password);
    format!("{}{}{}", salt, HASH_SEPARATOR, digest)
}

/// Fails closed on values that are not `salt:digest`.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Some((salt, expected)) = stored_hash.split_once(HASH_SEPARATOR) else {
        return false;
    };
    let computed = salted_digest(salt, password);
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

// ===== Tokens =====

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,
    pub iat: usize,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    pub fn issue_token(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_token_with_lifetime(user_id, self.lifetime)
    }

    pub fn issue_token_with_lifetime(
        &self,
        user_id: i64,
        lifetime: Duration,
    ) -> anyhow::Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| anyhow::anyhow!("Token lifetime out of range: {}", lifetime))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: expires.timestamp().max(0) as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Signature, expiry and an integer subject are all required.
    pub fn resolve_token(&self, token: &str) -> Result<i64, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            app_log!(debug, "Token rejected: {}", e);
            AuthError::InvalidCredentials
        })?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

// ===== Request guard =====

/// Caller resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
}

/// Reason the guard rejected the request, kept for the 401 catcher.
#[derive(Debug, Clone, Copy)]
pub struct AuthFailure(pub Option<AuthError>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let outcome = authenticate(req).await;
        if let Outcome::Error((_, error)) = &outcome {
            req.local_cache(|| AuthFailure(Some(*error)));
        }
        outcome
    }
}

async fn authenticate(req: &Request<'_>) -> Outcome<AuthenticatedUser, AuthError> {
    let tokens = match req.guard::<&State<TokenService>>().await {
        Outcome::Success(tokens) => tokens,
        Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
        Outcome::Forward(f) => return Outcome::Forward(f),
    };

    let db = match req.guard::<&State<Database>>().await {
        Outcome::Success(db) => db,
        Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
        Outcome::Forward(f) => return Outcome::Forward(f),
    };

    let token = match req.headers().get_one("Authorization") {
        Some(header) => match bearer_token(header) {
            Some(token) => token,
            None => {
                app_log!(warn, "Invalid Authorization header format");
                return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
            }
        },
        None => {
            app_log!(warn, "Missing Authorization header");
            return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
        }
    };

    let user_id = match tokens.resolve_token(token) {
        Ok(id) => id,
        Err(e) => {
            app_log!(warn, "Token verification failed: {}", e.message());
            return Outcome::Error((Status::Unauthorized, e));
        }
    };

    match UserRepository::new(db).find_by_id(user_id).await {
        Ok(Some(user)) => Outcome::Success(AuthenticatedUser {
            id: user.id,
            email: user.email,
        }),
        Ok(None) => {
            app_log!(warn, "Token subject {} has no matching user", user_id);
            Outcome::Error((Status::Unauthorized, AuthError::InvalidCredentials))
        }
        Err(e) => {
            app_log!(error, "User lookup failed: {:#}", e);
            Outcome::Error((Status::InternalServerError, AuthError::DatabaseError))
        }
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    InvalidCredentials,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Not authenticated",
            AuthError::InvalidToken => "Invalid authorization header format",
            AuthError::InvalidCredentials => "Could not validate credentials",
            AuthError::DatabaseError => "Database error occurred",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::DatabaseError => "DATABASE_ERROR",
        }
    }
}
