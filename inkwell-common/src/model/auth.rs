use crate::{
    model::{Id, user::UserMarker},
    util::PositiveDuration,
};
use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;
use time::UtcDateTime;

pub const TOKEN_SECRET_LEN: usize = 32;
pub const TOKEN_SALT_LEN: usize = 16;
pub const TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;
pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AccessTokenMarker;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing access token failed: {0}")]
pub struct TokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AccessTokenDecodeError {
    #[error("Missing '|' between token id and secret")]
    MissingSeparator,
    #[error("Invalid token id: {0}")]
    InvalidTokenId(ParseIntError),
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the secret part is incorrect")]
    InvalidSecretLength,
}

/// The plain text bearer token, `{id}|{base64 secret}`.
///
/// Only the client ever holds the secret; storage keeps a salted argon2 hash of it.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AccessToken {
    pub id: Id<AccessTokenMarker>,
    pub secret: [u8; TOKEN_SECRET_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TokenHash(pub Box<[u8; TOKEN_HASH_LEN]>);

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TokenSalt(pub [u8; TOKEN_SALT_LEN]);

/// A freshly generated token that has not been stored yet.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewAccessToken {
    pub user: Id<UserMarker>,
    pub name: String,
    pub secret: TokenSecret,
    pub salt: TokenSalt,
    pub hash: TokenHash,
    pub expires_after: Option<PositiveDuration>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TokenSecret([u8; TOKEN_SECRET_LEN]);

/// A stored token as read back for authentication.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Authentication {
    pub id: Id<AccessTokenMarker>,
    pub user: Id<UserMarker>,
    pub token_hash: TokenHash,
    pub salt: TokenSalt,
    pub created_at: UtcDateTime,
    pub expires_after: Option<PositiveDuration>,
}

fn hash_secret(secret: &[u8], salt: &TokenSalt) -> Result<TokenHash, TokenHashError> {
    let mut hash = Box::new([0; TOKEN_HASH_LEN]);
    Argon2::default()
        .hash_password_into(secret, &salt.0, &mut *hash)
        .map_err(TokenHashError)?;

    Ok(TokenHash(hash))
}

impl NewAccessToken {
    pub fn generate(
        user: Id<UserMarker>,
        name: String,
        expires_after: Option<PositiveDuration>,
    ) -> Result<Self, TokenHashError> {
        let secret = TokenSecret(rand::random());
        let salt = TokenSalt(rand::random());
        let hash = hash_secret(&secret.0, &salt)?;

        Ok(Self {
            user,
            name,
            secret,
            salt,
            hash,
            expires_after,
        })
    }

    /// Pairs the secret with the id storage assigned to it.
    #[must_use]
    pub fn into_token(self, id: Id<AccessTokenMarker>) -> AccessToken {
        AccessToken {
            id,
            secret: self.secret.0,
        }
    }
}

impl AccessToken {
    #[must_use]
    pub fn as_token_str(&self) -> String {
        let id = self.id;
        let encoded_secret = Base64Display::new(&self.secret, &BASE64_STANDARD);

        format!("{id}|{encoded_secret}")
    }
}

impl Authentication {
    #[must_use]
    pub fn is_expired(&self, now: UtcDateTime) -> bool {
        self.expires_after
            .is_some_and(|expires_after| self.created_at + expires_after.get() < now)
    }

    /// Whether `token` is the one this row was issued for and is still usable at `now`.
    pub fn accepts(&self, token: &AccessToken, now: UtcDateTime) -> Result<bool, TokenHashError> {
        if token.id != self.id || self.is_expired(now) {
            return Ok(false);
        }

        Ok(hash_secret(&token.secret, &self.salt)? == self.token_hash)
    }
}

impl FromStr for AccessToken {
    type Err = AccessTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id_part, secret_part) = s.split_once('|').ok_or(Self::Err::MissingSeparator)?;

        let id = i64::from_str(id_part)
            .map_err(Self::Err::InvalidTokenId)?
            .into();
        let secret = BASE64_STANDARD
            .decode(secret_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSecretLength)?;

        Ok(Self { id, secret })
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("id", &self.id)
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl Debug for TokenSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenSecret").field(&"[redacted]").finish()
    }
}

impl Debug for TokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenHash").field(&"[redacted]").finish()
    }
}

impl Debug for TokenSalt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenSalt").field(&"[redacted]").finish()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The access token hash had an invalid length")]
pub struct InvalidTokenHashError;

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The access token salt had an invalid length")]
pub struct InvalidTokenSaltError;

impl TryFrom<Vec<u8>> for TokenHash {
    type Error = InvalidTokenHashError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let bytes: [u8; TOKEN_HASH_LEN] = value.try_into().map_err(|_| InvalidTokenHashError)?;
        Ok(Self(Box::new(bytes)))
    }
}

impl TryFrom<Vec<u8>> for TokenSalt {
    type Error = InvalidTokenSaltError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Ok(Self(value.try_into().map_err(|_| InvalidTokenSaltError)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            Id,
            auth::{AccessToken, AccessTokenDecodeError, Authentication, NewAccessToken, TokenHash},
        },
        util::PositiveDuration,
    };
    use time::{Duration, macros::utc_datetime};

    fn stored(new_token: &NewAccessToken, id: i64) -> Authentication {
        Authentication {
            id: Id::new(id),
            user: new_token.user,
            token_hash: new_token.hash.clone(),
            salt: new_token.salt,
            created_at: utc_datetime!(2025-06-01 12:00),
            expires_after: new_token.expires_after,
        }
    }

    #[test]
    fn token_str_round_trip() {
        let new_token = NewAccessToken::generate(Id::new(7), "ada-AuthToken".to_owned(), None)
            .unwrap();
        let token = new_token.into_token(Id::new(42));

        let token_str = token.as_token_str();
        assert!(token_str.starts_with("42|"));
        assert_eq!(token_str.parse::<AccessToken>(), Ok(token));
    }

    #[test]
    fn malformed_tokens() {
        assert_eq!(
            "no-separator".parse::<AccessToken>(),
            Err(AccessTokenDecodeError::MissingSeparator)
        );
        assert!(matches!(
            "abc|AAAA".parse::<AccessToken>(),
            Err(AccessTokenDecodeError::InvalidTokenId(_))
        ));
        assert!(matches!(
            "1|not base64!".parse::<AccessToken>(),
            Err(AccessTokenDecodeError::Decode(_))
        ));
        assert_eq!(
            "1|AAAA".parse::<AccessToken>(),
            Err(AccessTokenDecodeError::InvalidSecretLength)
        );
    }

    #[test]
    fn stored_token_accepts_only_its_secret() {
        let new_token = NewAccessToken::generate(Id::new(7), "t".to_owned(), None).unwrap();
        let authentication = stored(&new_token, 3);
        let now = utc_datetime!(2030-01-01 00:00);

        let token = new_token.into_token(Id::new(3));
        assert_eq!(authentication.accepts(&token, now), Ok(true));

        let mut forged = token.clone();
        forged.secret[0] ^= 0xFF;
        assert_eq!(authentication.accepts(&forged, now), Ok(false));

        let other_id = AccessToken {
            id: Id::new(4),
            ..token
        };
        assert_eq!(authentication.accepts(&other_id, now), Ok(false));
    }

    #[test]
    fn expiry() {
        let ttl = PositiveDuration::new(Duration::hours(1));
        let new_token = NewAccessToken::generate(Id::new(1), "t".to_owned(), ttl).unwrap();
        let authentication = stored(&new_token, 9);
        let token = new_token.into_token(Id::new(9));

        let within = utc_datetime!(2025-06-01 12:59);
        let after = utc_datetime!(2025-06-01 13:01);

        assert!(!authentication.is_expired(within));
        assert!(authentication.is_expired(after));
        assert_eq!(authentication.accepts(&token, after), Ok(false));
    }

    #[test]
    fn token_hash_length_is_checked() {
        assert!(TokenHash::try_from(vec![0; 31]).is_err());
        assert!(TokenHash::try_from(vec![0; 32]).is_ok());
    }
}
