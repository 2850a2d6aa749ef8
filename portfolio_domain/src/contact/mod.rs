pub mod repo;

use crate::access::site_owner_or_deny;
use crate::error::*;
use crate::identity::Identity;
use crate::user::auth::*;
use crate::GetConfig;
use repo::ContactRepo;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: Identity,
    pub subject: String,
    pub message: String,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<repo::Message> for ContactMessage {
    fn from(message: repo::Message) -> Self {
        Self {
            id: message.message_id,
            name: message.name,
            email: message.email,
            subject: message.subject,
            message: message.message,
            read: message.read,
            created_at: message.created_at,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(default)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct MarkRead {
    pub read: bool,
}

#[entrait(pub ContactApi, mock_api=ContactApiMock)]
pub mod api {
    use super::*;

    pub async fn submit_message(
        deps: &impl ContactRepo,
        new_message: NewMessage,
    ) -> PfResult<ContactMessage> {
        let email = validate(&new_message)?;
        let message = deps
            .insert_message(
                new_message.name.trim(),
                &email,
                new_message.subject.trim(),
                new_message.message.trim(),
            )
            .await?;

        tracing::info!(message_id = message.message_id, "received contact message");
        Ok(message.into())
    }

    pub async fn list_messages(
        deps: &(impl Authenticate + GetConfig + ContactRepo),
        token: Token,
    ) -> PfResult<Vec<ContactMessage>> {
        let session = deps.authenticate(token)?;
        site_owner_or_deny(&session.identity, deps.get_site_owner())?;

        Ok(deps
            .select_messages()
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub async fn mark_read(
        deps: &(impl Authenticate + GetConfig + ContactRepo),
        token: Token,
        message_id: i64,
        mark: MarkRead,
    ) -> PfResult<ContactMessage> {
        let session = deps.authenticate(token)?;
        site_owner_or_deny(&session.identity, deps.get_site_owner())?;

        deps.set_message_read(message_id, mark.read)
            .await?
            .map(Into::into)
            .ok_or(PfError::MessageNotFound)
    }

    pub async fn delete_message(
        deps: &(impl Authenticate + GetConfig + ContactRepo),
        token: Token,
        message_id: i64,
    ) -> PfResult<()> {
        let session = deps.authenticate(token)?;
        site_owner_or_deny(&session.identity, deps.get_site_owner())?;

        if deps.remove_message(message_id).await? {
            Ok(())
        } else {
            Err(PfError::MessageNotFound)
        }
    }
}

fn validate(new_message: &NewMessage) -> PfResult<Identity> {
    let mut errors = vec![];
    for (field, value) in [
        ("name", &new_message.name),
        ("email", &new_message.email),
        ("subject", &new_message.subject),
        ("message", &new_message.message),
    ] {
        if value.trim().is_empty() {
            errors.push((field, "can't be blank"));
        }
    }
    if !new_message.email.trim().is_empty() && !new_message.email.contains('@') {
        errors.push(("email", "is invalid"));
    }

    if errors.is_empty() {
        Ok(Identity::new(&new_message.email))
    } else {
        Err(PfError::unprocessable_entity(errors))
    }
}
