pub mod repo;

use crate::access::can_access;
use crate::error::*;
use crate::identity::Identity;
use crate::iter_util::Single;
use crate::user::auth::*;
use repo::BlogRepo;

use entrait::entrait_export as entrait;
use time::OffsetDateTime;

const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Private => "private",
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = PfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "private" => Ok(Self::Private),
            other => Err(anyhow::anyhow!("unknown post status: {other}").into()),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub status: PostStatus,
    pub owner: Identity,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<repo::Post> for BlogPost {
    fn from(post: repo::Post) -> Self {
        Self {
            slug: post.slug,
            title: post.title,
            summary: post.summary,
            body: post.body,
            tag_list: post.tag_list,
            status: post.status,
            owner: post.owner,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostCreate {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub status: PostStatus,
}

#[derive(serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub status: Option<PostStatus>,
}

#[derive(serde::Deserialize, Default, Debug, Eq, PartialEq)]
#[serde(default)]
pub struct ListPostsQuery {
    pub tag: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[entrait(pub BlogApi, mock_api=BlogApiMock)]
pub mod api {
    use super::*;

    pub async fn list_posts(
        deps: &(impl Authenticate + BlogRepo),
        token: Option<Token>,
        query: ListPostsQuery,
    ) -> PfResult<Vec<BlogPost>> {
        let session = deps.opt_authenticate(token)?;
        let requester = Session::identity(session.as_ref());
        let admin = blog_admin(deps, requester).await?;

        Ok(deps
            .select_posts(repo::Filter {
                slug: None,
                tag: query.tag.as_deref(),
            })
            .await?
            .into_iter()
            .filter(|post| can_access(post, requester, admin).can_read)
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(DEFAULT_PAGE_SIZE))
            .map(Into::into)
            .collect())
    }

    pub async fn fetch_post(
        deps: &(impl Authenticate + BlogRepo),
        token: Option<Token>,
        slug: &str,
    ) -> PfResult<BlogPost> {
        let session = deps.opt_authenticate(token)?;
        readable_post(deps, session.as_ref(), slug)
            .await
            .map(Into::into)
    }

    pub async fn create_post(
        deps: &(impl Authenticate + BlogRepo),
        token: Token,
        post: PostCreate,
    ) -> PfResult<BlogPost> {
        let session = deps.authenticate(token)?;
        let slug = slugify(&post.title);
        if slug.is_empty() {
            return Err(PfError::unprocessable_entity([("title", "can't be blank")]));
        }
        let tag_list: Vec<String> = post
            .tag_list
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        let inserted = deps
            .insert_post(
                &session.identity,
                &slug,
                post.title.trim(),
                &post.summary,
                &post.body,
                &tag_list,
                post.status,
            )
            .await?;

        tracing::info!(slug = %inserted.slug, status = inserted.status.as_str(), "created post");

        Ok(inserted.into())
    }

    pub async fn update_post(
        deps: &(impl Authenticate + BlogRepo),
        token: Token,
        slug: &str,
        post_update: PostUpdate,
    ) -> PfResult<BlogPost> {
        let session = deps.authenticate(token)?;
        let post = writable_post(deps, &session, slug).await?;
        let new_slug = post_update.title.as_deref().map(slugify);
        if new_slug.as_deref() == Some("") {
            return Err(PfError::unprocessable_entity([("title", "can't be blank")]));
        }

        deps.patch_post(
            post.post_id,
            repo::PostUpdate {
                slug: new_slug.as_deref(),
                title: post_update.title.as_deref().map(str::trim),
                summary: post_update.summary.as_deref(),
                body: post_update.body.as_deref(),
                status: post_update.status,
            },
        )
        .await?;

        find_post(deps, new_slug.as_deref().unwrap_or(slug))
            .await?
            .map(Into::into)
            .ok_or(PfError::PostNotFound)
    }

    pub async fn delete_post(
        deps: &(impl Authenticate + BlogRepo),
        token: Token,
        slug: &str,
    ) -> PfResult<()> {
        let session = deps.authenticate(token)?;
        let post = writable_post(deps, &session, slug).await?;
        deps.remove_post(post.post_id).await?;

        tracing::info!(slug, "deleted post");
        Ok(())
    }

    async fn writable_post(
        deps: &impl BlogRepo,
        session: &Session,
        slug: &str,
    ) -> PfResult<repo::Post> {
        let post = find_post(deps, slug).await?.ok_or(PfError::PostNotFound)?;
        let requester = Some(&session.identity);
        let admin = blog_admin(deps, requester).await?;
        can_access(&post, requester, admin).write_or_deny(requester)?;
        Ok(post)
    }
}

pub(crate) async fn find_post(deps: &impl BlogRepo, slug: &str) -> PfResult<Option<repo::Post>> {
    deps.select_posts(repo::Filter {
        slug: Some(slug),
        ..Default::default()
    })
    .await?
    .into_iter()
    .single_or_none()
}

fn slugify(string: &str) -> String {
    use itertools::Itertools;

    const QUOTE_CHARS: &[char] = &['\'', '"'];

    string
        // Keep contractions and possessives together by splitting on everything
        // that's neither a word character nor a quote.
        .split(|c: char| !(QUOTE_CHARS.contains(&c) || c.is_alphanumeric()))
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut s = s.replace(QUOTE_CHARS, "");
            s.make_ascii_lowercase();
            s
        })
        .filter(|s| !s.is_empty())
        .join("-")
}

/// Fetch a post and check that the session may read it.
pub(crate) async fn readable_post(
    deps: &impl BlogRepo,
    session: Option<&Session>,
    slug: &str,
) -> PfResult<repo::Post> {
    let post = find_post(deps, slug).await?.ok_or(PfError::PostNotFound)?;
    let requester = Session::identity(session);
    let admin = blog_admin(deps, requester).await?;
    can_access(&post, requester, admin).read_or_deny(requester)?;
    Ok(post)
}

/// The blog's site-owner override: the requester itself, if it is a blog admin.
async fn blog_admin<'i>(
    deps: &impl BlogRepo,
    requester: Option<&'i Identity>,
) -> PfResult<Option<&'i Identity>> {
    match requester {
        Some(identity) if deps.is_admin(identity).await? => Ok(Some(identity)),
        _ => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::repo::BlogRepoMock;
    use super::*;
    use crate::user::auth::authenticate::AuthenticateMock;
    use crate::UserId;

    use assert_matches::*;
    use unimock::*;
    use uuid::Uuid;

    pub fn test_timestamp() -> OffsetDateTime {
        OffsetDateTime::parse(
            "2019-10-12T07:20:50.52Z",
            &time::format_description::well_known::Rfc3339,
        )
        .unwrap()
    }

    pub fn test_post(slug: &str, status: PostStatus, owner: &str) -> repo::Post {
        repo::Post {
            post_id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: "title".to_string(),
            summary: "summary".to_string(),
            body: "body".to_string(),
            tag_list: vec!["tag".to_string()],
            status,
            owner: Identity::new(owner),
            created_at: test_timestamp(),
            updated_at: test_timestamp(),
        }
    }

    pub fn session(email: &str) -> Session {
        Session {
            user_id: UserId(Uuid::new_v4()),
            identity: Identity::new(email),
        }
    }

    pub fn mock_authenticate(email: &'static str) -> impl unimock::Clause {
        AuthenticateMock::authenticate
            .next_call(matching!(_))
            .returns(Ok(session(email)))
    }

    pub fn mock_opt_authenticate(email: Option<&'static str>) -> impl unimock::Clause {
        AuthenticateMock::opt_authenticate
            .next_call(matching!(_))
            .returns(Ok(email.map(session)))
    }

    fn mock_is_admin(admin: bool) -> impl unimock::Clause {
        BlogRepoMock::is_admin
            .next_call(matching!(_))
            .returns(Ok(admin))
    }

    fn mock_select_by_slug(posts: Vec<repo::Post>) -> impl unimock::Clause {
        BlogRepoMock::select_posts
            .next_call(matching!(repo::Filter {
                slug: Some(_),
                ..
            }))
            .returns(Ok(posts))
    }

    #[test]
    fn slugify_should_keep_contractions() {
        assert_eq!("dont-panic", slugify("Don't-Panic!"));
        assert_eq!("dont-panic", slugify("Don't  panic"));
        assert_eq!("", slugify("  ?! "));
    }

    #[tokio::test]
    async fn anonymous_listing_shows_only_published_posts() {
        let deps = Unimock::new((
            mock_opt_authenticate(None),
            BlogRepoMock::select_posts
                .next_call(matching!(repo::Filter {
                    slug: None,
                    tag: None
                }))
                .returns(Ok(vec![
                    test_post("a", PostStatus::Published, "author@example.com"),
                    test_post("b", PostStatus::Draft, "author@example.com"),
                    test_post("c", PostStatus::Private, "author@example.com"),
                    test_post("d", PostStatus::Published, "other@example.com"),
                ])),
        ));

        let posts = api::list_posts(&deps, Token::none(), ListPostsQuery::default())
            .await
            .unwrap();

        let slugs: Vec<_> = posts.iter().map(|post| post.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "d"]);
    }

    #[tokio::test]
    async fn owner_listing_includes_own_drafts_and_paginates() {
        let deps = Unimock::new((
            mock_opt_authenticate(Some("author@example.com")),
            mock_is_admin(false),
            BlogRepoMock::select_posts
                .next_call(matching!(repo::Filter {
                    tag: Some("rust"),
                    ..
                }))
                .returns(Ok(vec![
                    test_post("a", PostStatus::Published, "author@example.com"),
                    test_post("b", PostStatus::Draft, "AUTHOR@example.com"),
                    test_post("c", PostStatus::Private, "other@example.com"),
                    test_post("d", PostStatus::Published, "other@example.com"),
                ])),
        ));

        let posts = api::list_posts(
            &deps,
            Some(Token::from_token("token")),
            ListPostsQuery {
                tag: Some("rust".to_string()),
                limit: Some(2),
                offset: Some(1),
            },
        )
        .await
        .unwrap();

        let slugs: Vec<_> = posts.iter().map(|post| post.slug.as_str()).collect();
        assert_eq!(slugs, ["b", "d"]);
    }

    #[tokio::test]
    async fn fetching_missing_post_should_produce_not_found_before_access_check() {
        let deps = Unimock::new((mock_opt_authenticate(None), mock_select_by_slug(vec![])));
        assert_matches!(
            api::fetch_post(&deps, Token::none(), "slug").await,
            Err(PfError::PostNotFound)
        );
    }

    #[tokio::test]
    async fn fetching_draft_anonymously_is_unauthorized() {
        let deps = Unimock::new((
            mock_opt_authenticate(None),
            mock_select_by_slug(vec![test_post("slug", PostStatus::Draft, "author@example.com")]),
        ));
        assert_matches!(
            api::fetch_post(&deps, Token::none(), "slug").await,
            Err(PfError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn fetching_private_post_as_stranger_is_forbidden() {
        let deps = Unimock::new((
            mock_opt_authenticate(Some("stranger@example.com")),
            mock_select_by_slug(vec![test_post(
                "slug",
                PostStatus::Private,
                "author@example.com",
            )]),
            mock_is_admin(false),
        ));
        assert_matches!(
            api::fetch_post(&deps, Some(Token::from_token("t")), "slug").await,
            Err(PfError::Forbidden)
        );
    }

    #[tokio::test]
    async fn blog_admin_may_read_private_posts() {
        let deps = Unimock::new((
            mock_opt_authenticate(Some("admin@example.com")),
            mock_select_by_slug(vec![test_post(
                "slug",
                PostStatus::Private,
                "author@example.com",
            )]),
            mock_is_admin(true),
        ));
        let post = api::fetch_post(&deps, Some(Token::from_token("t")), "slug")
            .await
            .unwrap();
        assert_eq!(post.status, PostStatus::Private);
    }

    #[tokio::test]
    async fn create_post_should_slugify_and_own() {
        let deps = Unimock::new((
            mock_authenticate("Author@Example.com"),
            BlogRepoMock::insert_post
                .next_call(matching!(
                    (owner, "my-title", "My Title", _, _, tags, PostStatus::Draft)
                        if owner.as_str() == "author@example.com" && tags.len() == 1 && tags[0] == "tag"
                ))
                .returns(Ok(test_post("my-title", PostStatus::Draft, "author@example.com"))),
        ));
        let post = api::create_post(
            &deps,
            Token::from_token("token"),
            PostCreate {
                title: "My Title".to_string(),
                summary: "Summary".to_string(),
                body: "Body".to_string(),
                tag_list: vec![" tag ".to_string(), "".to_string()],
                status: PostStatus::default(),
            },
        )
        .await
        .unwrap();

        assert_eq!(post.slug, "my-title");
    }

    #[tokio::test]
    async fn update_post_should_update_slug() {
        let deps = Unimock::new((
            mock_authenticate("author@example.com"),
            mock_select_by_slug(vec![test_post("slug", PostStatus::Draft, "author@example.com")]),
            mock_is_admin(false),
            BlogRepoMock::patch_post
                .next_call(matching!(
                    _,
                    repo::PostUpdate {
                        slug: Some("new-title"),
                        title: Some("New Title"),
                        summary: None,
                        body: Some("New body"),
                        status: Some(PostStatus::Published),
                    }
                ))
                .returns(Ok(())),
            BlogRepoMock::select_posts
                .next_call(matching!(repo::Filter {
                    slug: Some("new-title"),
                    ..
                }))
                .returns(Ok(vec![test_post(
                    "new-title",
                    PostStatus::Published,
                    "author@example.com",
                )])),
        ));
        let post = api::update_post(
            &deps,
            Token::from_token("token"),
            "slug",
            PostUpdate {
                title: Some("New Title".to_string()),
                body: Some("New body".to_string()),
                status: Some(PostStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(post.slug, "new-title");
    }

    #[tokio::test]
    async fn retitling_post_to_punctuation_should_be_rejected() {
        let deps = Unimock::new((
            mock_authenticate("author@example.com"),
            mock_select_by_slug(vec![test_post("slug", PostStatus::Draft, "author@example.com")]),
            mock_is_admin(false),
        ));
        let result = api::update_post(
            &deps,
            Token::from_token("token"),
            "slug",
            PostUpdate {
                title: Some("?!".to_string()),
                ..Default::default()
            },
        )
        .await;

        assert_matches!(result, Err(PfError::UnprocessableEntity { .. }));
    }

    #[tokio::test]
    async fn deleting_someone_elses_published_post_is_forbidden() {
        let deps = Unimock::new((
            mock_authenticate("stranger@example.com"),
            mock_select_by_slug(vec![test_post(
                "slug",
                PostStatus::Published,
                "author@example.com",
            )]),
            mock_is_admin(false),
        ));
        assert_matches!(
            api::delete_post(&deps, Token::from_token("token"), "slug").await,
            Err(PfError::Forbidden)
        );
    }

    #[tokio::test]
    async fn blog_admin_may_delete_any_post() {
        let deps = Unimock::new((
            mock_authenticate("admin@example.com"),
            mock_select_by_slug(vec![test_post(
                "slug",
                PostStatus::Published,
                "author@example.com",
            )]),
            mock_is_admin(true),
            BlogRepoMock::remove_post
                .next_call(matching!(_))
                .returns(Ok(())),
        ));
        api::delete_post(&deps, Token::from_token("token"), "slug")
            .await
            .unwrap();
    }
}
