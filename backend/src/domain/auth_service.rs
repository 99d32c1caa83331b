//! Registration and password login.
//!
//! Tokens are minted by the injected [`TokenIssuer`]; this service only
//! decides whether a caller deserves one.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{TokenClaims, TokenIssuer, UserRepository};
use crate::domain::user_service::{CreateUserRequest, UserService};
use crate::domain::{DomainError, EmailAddress, User};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INACTIVE_USER: &str = "User is not active";

/// Access token paired with the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

/// Authentication service over the user repository.
#[derive(Clone)]
pub struct AuthService<R, T> {
    users: UserService<R>,
    repository: Arc<R>,
    tokens: Arc<T>,
}

impl<R, T> AuthService<R, T> {
    pub fn new(users: UserService<R>, repository: Arc<R>, tokens: Arc<T>) -> Self {
        Self {
            users,
            repository,
            tokens,
        }
    }
}

impl<R: UserRepository, T: TokenIssuer> AuthService<R, T> {
    /// Create the user and sign them in.
    pub async fn register(&self, request: CreateUserRequest) -> Result<AuthResponse, DomainError> {
        let user = self.users.create(request).await?;
        self.respond(user)
    }

    /// Exchange email and password for a token.
    ///
    /// Unknown emails and wrong passwords both yield `Invalid credentials`;
    /// a matching but deactivated user yields `User is not active`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, DomainError> {
        let Ok(address) = EmailAddress::new(email) else {
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };
        let Some(user) = self
            .repository
            .find_by_email(&address)
            .await?
            .into_iter()
            .next()
        else {
            warn!("login attempt for unknown email");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };
        if !user.is_active() {
            warn!(user_id = %user.id(), "login attempt for inactive user");
            return Err(DomainError::unauthorized(INACTIVE_USER));
        }
        if !user.password().verify(password) {
            warn!(user_id = %user.id(), "login attempt with wrong password");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %user.id(), "user logged in");
        self.respond(user)
    }

    fn respond(&self, user: User) -> Result<AuthResponse, DomainError> {
        let access_token = self.tokens.issue(&TokenClaims::from(&user))?;
        Ok(AuthResponse { access_token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureTokenIssuer, MockTokenIssuer, MockUserRepository};
    use crate::domain::{DisplayName, ErrorKind, PasswordDigest, UserId, UserPreferences};
    use crate::test_support::clock::SettableClock;
    use mockable::Clock;
    use rstest::{fixture, rstest};

    fn stored_user(active: bool) -> User {
        let clock = SettableClock::at_midnight(2024, 1, 1);
        let mut user = User::register(
            UserId::new("42").expect("id"),
            EmailAddress::new("ada@example.com").expect("email"),
            DisplayName::new("Ada").expect("name"),
            PasswordDigest::derive_with_salt("correct horse", "salt").expect("digest"),
            UserPreferences::default(),
            clock.utc(),
        );
        if !active {
            user.deactivate(clock.utc());
        }
        user
    }

    fn service_with(
        repository: MockUserRepository,
    ) -> AuthService<MockUserRepository, FixtureTokenIssuer> {
        let repository = Arc::new(repository);
        let clock = Arc::new(SettableClock::at_midnight(2024, 1, 1));
        AuthService::new(
            UserService::new(Arc::clone(&repository), clock),
            repository,
            Arc::new(FixtureTokenIssuer),
        )
    }

    #[fixture]
    fn repository_with_user() -> MockUserRepository {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Ok(vec![stored_user(true)]));
        repository
    }

    #[rstest]
    #[tokio::test]
    async fn login_issues_a_token_for_valid_credentials(repository_with_user: MockUserRepository) {
        let service = service_with(repository_with_user);

        let response = service
            .login("ada@example.com", "correct horse")
            .await
            .expect("login succeeds");
        assert_eq!(response.access_token, "fixture.42");
        assert_eq!(response.user.id().to_string(), "42");
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_is_invalid_credentials(repository_with_user: MockUserRepository) {
        let service = service_with(repository_with_user);

        let err = service
            .login("ada@example.com", "battery staple")
            .await
            .expect_err("wrong password");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn inactive_users_cannot_log_in() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Ok(vec![stored_user(false)]));
        let service = service_with(repository);

        let err = service
            .login("ada@example.com", "correct horse")
            .await
            .expect_err("inactive");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), INACTIVE_USER);
    }

    #[rstest]
    #[case("nobody@example.com")]
    #[case("not-an-email")]
    #[tokio::test]
    async fn unknown_emails_are_invalid_credentials(#[case] email: &str) {
        let mut repository = MockUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(Vec::new()));
        let service = service_with(repository);

        let err = service.login(email, "anything").await.expect_err("unknown");
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[rstest]
    #[tokio::test]
    async fn register_returns_token_for_created_user() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_save()
            .times(1)
            .returning(|user| Ok(user.clone()));
        let repository = Arc::new(repository);
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .withf(|claims| claims.email == "new@example.com" && claims.name == "New")
            .times(1)
            .returning(|claims| Ok(format!("signed.{}", claims.sub)));
        let service = AuthService::new(
            UserService::new(
                Arc::clone(&repository),
                Arc::new(SettableClock::at_midnight(2024, 1, 1)),
            ),
            repository,
            Arc::new(tokens),
        );

        let response = service
            .register(CreateUserRequest {
                email: "new@example.com".into(),
                name: "New".into(),
                password: "pw".into(),
                preferences: None,
            })
            .await
            .expect("registered");
        assert_eq!(response.access_token, format!("signed.{}", response.user.id()));
        assert!(response.user.is_active());
    }
}
