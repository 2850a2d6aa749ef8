pub mod auth;
pub mod password;
pub mod repo;

use auth::{Authenticate, Session, Token};
use password::CleartextPassword;

use crate::error::{PfError, PfResult};
use crate::identity::Identity;
use crate::UserId;

use entrait::entrait_export as entrait;

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct SignedUser {
    pub email: Identity,
    pub token: String,
    pub username: String,
    pub image: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: CleartextPassword,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: CleartextPassword,
}

#[derive(serde::Deserialize, Default)]
#[serde(default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<CleartextPassword>,
    pub image: Option<String>,
}

#[entrait(pub Create, mock_api=CreateMock)]
async fn create(
    deps: &(impl password::HashPassword + repo::UserRepo + auth::SignSession),
    new_user: NewUser,
) -> PfResult<SignedUser> {
    let email: Identity = new_user.email.parse()?;
    let username = new_user.username.trim();
    if username.is_empty() {
        return Err(PfError::unprocessable_entity([("username", "can't be blank")]));
    }

    let password_hash = deps.hash_password(new_user.password).await?;

    let (db_user, credentials) = deps.insert_user(username, &email, password_hash).await?;

    tracing::info!(user_id = %db_user.user_id.0, "registered user");

    Ok(sign(deps, db_user, credentials.email))
}

#[entrait(pub Login, mock_api=LoginMock)]
async fn login(
    deps: &(impl repo::UserRepo + password::VerifyPassword + auth::SignSession),
    login_user: LoginUser,
) -> PfResult<SignedUser> {
    let (db_user, credentials) = deps
        .find_user_credentials_by_email(&Identity::new(&login_user.email))
        .await?
        .ok_or(PfError::EmailDoesNotExist)?;

    deps.verify_password(login_user.password, credentials.password_hash)
        .await?;

    Ok(sign(deps, db_user, credentials.email))
}

#[entrait(pub FetchCurrent, mock_api=FetchCurrentMock)]
async fn fetch_current(
    deps: &(impl Authenticate + repo::UserRepo + auth::SignSession),
    token: Token,
) -> PfResult<SignedUser> {
    let session = deps.authenticate(token)?;
    let (db_user, credentials) = deps
        .find_user_credentials_by_id(session.user_id)
        .await?
        .ok_or(PfError::CurrentUserDoesNotExist)?;

    Ok(sign(deps, db_user, credentials.email))
}

#[entrait(pub Update, mock_api=UpdateMock)]
async fn update(
    deps: &(impl Authenticate + password::HashPassword + repo::UserRepo + auth::SignSession),
    token: Token,
    user_update: UserUpdate,
) -> PfResult<SignedUser> {
    let session = deps.authenticate(token)?;
    let email = user_update
        .email
        .as_deref()
        .map(str::parse::<Identity>)
        .transpose()?;
    let password_hash = match user_update.password {
        Some(password) => Some(deps.hash_password(password).await?),
        None => None,
    };

    let (user, credentials) = deps
        .update_user(
            session.user_id,
            repo::UserUpdate {
                email: email.as_ref(),
                username: user_update.username.as_deref(),
                password_hash,
                image: user_update.image.as_deref(),
            },
        )
        .await?;

    Ok(sign(deps, user, credentials.email))
}

fn sign(deps: &impl auth::SignSession, db_user: repo::User, email: Identity) -> SignedUser {
    let session = Session {
        user_id: db_user.user_id,
        identity: email,
    };
    SignedUser {
        token: deps.sign_session(&session),
        email: session.identity,
        username: db_user.username,
        image: db_user.image,
    }
}

#[cfg(test)]
mod tests {
    use super::auth::SignSessionMock;
    use super::password::{HashPasswordMock, PasswordHash, VerifyPasswordMock};
    use super::repo::UserRepoMock;
    use super::*;

    use assert_matches::*;
    use unimock::*;

    fn test_token() -> String {
        String::from("t3stt0k1")
    }

    fn test_user_id() -> UserId {
        UserId(uuid::Uuid::parse_str("20a626ba-c7d3-44c7-981a-e880f81c126f").unwrap())
    }

    fn test_user(username: &str) -> repo::User {
        repo::User {
            user_id: test_user_id(),
            username: username.to_string(),
            image: None,
        }
    }

    fn mock_hash_password() -> impl unimock::Clause {
        HashPasswordMock
            .next_call(matching!(_))
            .returns(Ok(PasswordHash("h4sh".to_string())))
    }

    fn mock_sign_session() -> impl unimock::Clause {
        SignSessionMock
            .next_call(matching!(_))
            .returns(test_token())
    }

    #[tokio::test]
    async fn test_create_user() {
        let new_user = NewUser {
            username: "Name".to_string(),
            email: "Name@Email.com".to_string(),
            password: "password".into(),
        };
        let deps = Unimock::new((
            mock_hash_password(),
            UserRepoMock::insert_user
                .next_call(matching!(
                    ("Name", email, PasswordHash(hash)) if email.as_str() == "name@email.com" && hash == "h4sh"
                ))
                .returns(Ok((
                    test_user("Name"),
                    repo::Credentials {
                        email: Identity::new("name@email.com"),
                        password_hash: PasswordHash("h4sh".to_string()),
                    },
                ))),
            mock_sign_session(),
        ));

        let signed_user = create(&deps, new_user).await.unwrap();

        assert_eq!(signed_user.token, test_token());
        assert_eq!(signed_user.email.as_str(), "name@email.com");
    }

    #[tokio::test]
    async fn create_user_should_reject_invalid_email_before_hashing() {
        let deps = Unimock::new(());
        let result = create(
            &deps,
            NewUser {
                username: "Name".to_string(),
                email: "not-an-email".to_string(),
                password: "password".into(),
            },
        )
        .await;

        assert_matches!(result, Err(PfError::UnprocessableEntity { .. }));
    }

    #[tokio::test]
    async fn test_login() {
        let login_user = LoginUser {
            email: "NAME@email.com".to_string(),
            password: "password".into(),
        };
        let deps = Unimock::new((
            UserRepoMock::find_user_credentials_by_email
                .next_call(matching!((email) if email.as_str() == "name@email.com"))
                .returns(Ok(Some((
                    test_user("Name"),
                    repo::Credentials {
                        email: Identity::new("name@email.com"),
                        password_hash: PasswordHash("h4sh".into()),
                    },
                )))),
            VerifyPasswordMock
                .next_call(matching!(_, _))
                .returns(Ok(())),
            mock_sign_session(),
        ));

        let signed_user = login(&deps, login_user).await.unwrap();

        assert_eq!(signed_user.token, test_token());
    }

    #[tokio::test]
    async fn login_with_unknown_email_should_fail() {
        let deps = Unimock::new(
            UserRepoMock::find_user_credentials_by_email
                .next_call(matching!(_))
                .returns(Ok(None)),
        );

        assert_matches!(
            login(
                &deps,
                LoginUser {
                    email: "nobody@email.com".to_string(),
                    password: "password".into(),
                }
            )
            .await,
            Err(PfError::EmailDoesNotExist)
        );
    }
}
