use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::auth::{Claims, LoginResponse},
    entity::{customers, employees},
    error::{AppError, AppResult},
    middleware::auth::{Identity, Role},
    response::ApiResponse,
};

/// Where a strategy looks identities up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    Employees,
    Customers,
}

impl Directory {
    pub fn role(self) -> Role {
        match self {
            Directory::Employees => Role::Employee,
            Directory::Customers => Role::Customer,
        }
    }
}

/// Credentials record shared by both directories.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl From<employees::Model> for Account {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
        }
    }
}

impl From<customers::Model> for Account {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
        }
    }
}

pub async fn find_account_by_id<C: ConnectionTrait>(
    conn: &C,
    directory: Directory,
    id: Uuid,
) -> AppResult<Option<Account>> {
    let account = match directory {
        Directory::Employees => employees::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Account::from),
        Directory::Customers => customers::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Account::from),
    };
    Ok(account)
}

/// Emails are stored trimmed and lowercased; lookups and writes go through this.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_account_by_email<C: ConnectionTrait>(
    conn: &C,
    directory: Directory,
    email: &str,
) -> AppResult<Option<Account>> {
    let email = normalize_email(email);
    let account = match directory {
        Directory::Employees => employees::Entity::find()
            .filter(employees::Column::Email.eq(email.as_str()))
            .one(conn)
            .await?
            .map(Account::from),
        Directory::Customers => customers::Entity::find()
            .filter(customers::Column::Email.eq(email.as_str()))
            .one(conn)
            .await?
            .map(Account::from),
    };
    Ok(account)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// False for a wrong password as well as for an unparsable stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash is malformed");
            false
        }
    }
}

pub fn issue_token(config: &AppConfig, identity: &Identity) -> AppResult<LoginResponse> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: identity.id.to_string(),
        role: identity.role,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at: expiration.timestamp(),
        account_id: identity.id,
        role: identity.role,
    })
}

pub fn decode_token(config: &AppConfig, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

/// Issue a session token for an identity the local strategy already verified.
pub fn login(config: &AppConfig, identity: &Identity) -> AppResult<ApiResponse<LoginResponse>> {
    let resp = issue_token(config, identity)?;
    tracing::info!(account_id = %identity.id, role = identity.role.as_str(), "logged in");
    Ok(ApiResponse::ok("Logged in", resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;
    use crate::db::retry::RetryConfig;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://unused".into(),
            host: "127.0.0.1".into(),
            port: 0,
            env: AppEnv::Development,
            jwt_secret: "unit-test-secret".into(),
            jwt_ttl_hours: 1,
            db_retry: RetryConfig::default(),
            db_health_interval_secs: 30,
        }
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("s3cret!").expect("hash");
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret!", "not-a-phc-string"));
    }

    #[test]
    fn token_carries_subject_and_role() {
        let config = config();
        let identity = Identity {
            id: Uuid::new_v4(),
            email: "clerk@shop.com".into(),
            role: Role::Employee,
        };
        let issued = issue_token(&config, &identity).expect("token");
        let claims = decode_token(&config, &issued.token).expect("claims");
        assert_eq!(claims.sub, identity.id.to_string());
        assert_eq!(claims.role, Role::Employee);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: "c@shop.com".into(),
            role: Role::Customer,
        };
        let issued = issue_token(&config(), &identity).expect("token");
        let mut other = config();
        other.jwt_secret = "different".into();
        assert!(matches!(
            decode_token(&other, &issued.token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn email_lookup_uses_the_stored_form() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<employees::Model>::new()])
            .into_connection();

        let found = find_account_by_email(&db, Directory::Employees, "  Clerk@Shop.COM ")
            .await
            .expect("lookup");
        assert!(found.is_none());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("\"clerk@shop.com\""), "{log}");
        assert!(!log.contains("Clerk@Shop.COM"));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Shop.com "), "alice@shop.com");
        assert_eq!(normalize_email("bob@shop.com"), "bob@shop.com");
    }
}
