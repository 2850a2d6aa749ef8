use crate::config::Config;

use portfolio_db::{Db, GetDb};
use portfolio_domain::identity::Identity;
use portfolio_domain::{blog, comment, contact, diary, gallery, user};
use portfolio_domain::{GetConfig, System};

use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone)]
pub struct App {
    pub config: Arc<Config>,
    pub db: Db,
}

impl System for App {
    fn get_current_time(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

impl GetConfig for App {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384> {
        &self.config.jwt_signing_key.0
    }

    fn get_site_owner(&self) -> &Identity {
        &self.config.site_owner_email
    }
}

impl GetDb for App {
    fn get_db(&self) -> &Db {
        &self.db
    }
}

impl user::repo::DelegateUserRepo<Self> for App {
    type Target = portfolio_db::user::PgUserRepo;
}

impl blog::repo::DelegateBlogRepo<Self> for App {
    type Target = portfolio_db::blog::PgBlogRepo;
}

impl comment::repo::DelegateCommentRepo<Self> for App {
    type Target = portfolio_db::comment::PgCommentRepo;
}

impl diary::repo::DelegateDiaryRepo<Self> for App {
    type Target = portfolio_db::diary::PgDiaryRepo;
}

impl contact::repo::DelegateContactRepo<Self> for App {
    type Target = portfolio_db::contact::PgContactRepo;
}

impl gallery::repo::DelegateGalleryRepo<Self> for App {
    type Target = portfolio_db::gallery::PgGalleryRepo;
}
