use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use crate::data::post_repository::PostRepository;
use crate::data::taxonomy_repository::TaxonomyRepository;
use crate::domain::category::{Category, is_valid_slug};
use crate::domain::error::{DomainError, FormErrors};
use crate::domain::location::Location;
use crate::domain::page::{Page, Paginator};
use crate::domain::post::{Post, PostDraft, PostScope};
use crate::presentation::forms::{INVALID_CHOICE, PostForm};

/// The options a post form offers for its category and location selects.
#[derive(Debug, Clone, Serialize)]
pub struct PostFormChoices {
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    taxonomy: Arc<dyn TaxonomyRepository>,
    paginator: Paginator,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, taxonomy: Arc<dyn TaxonomyRepository>) -> Self {
        Self {
            posts,
            taxonomy,
            paginator: Paginator::default(),
        }
    }

    pub(crate) async fn page(
        &self,
        scope: PostScope,
        requested: Option<&str>,
    ) -> Result<Page<Post>, DomainError> {
        let count = self.posts.count(&scope).await?;
        let window = self.paginator.window(requested, count);
        let items = self
            .posts
            .list(&scope, window.limit, window.offset)
            .await?;
        Ok(Page::new(items, window))
    }

    pub async fn index(&self, page: Option<&str>) -> Result<Page<Post>, DomainError> {
        self.page(PostScope::Visible { now: Utc::now() }, page).await
    }

    pub async fn category_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Category, Page<Post>), DomainError> {
        let not_found = || DomainError::CategoryNotFound(slug.to_string());
        if !is_valid_slug(slug) {
            return Err(not_found());
        }
        let category = self
            .taxonomy
            .find_category_by_slug(slug)
            .await?
            .filter(|category| category.is_published)
            .ok_or_else(not_found)?;

        let scope = PostScope::Category {
            category_id: category.id,
            now: Utc::now(),
        };
        let posts = self.page(scope, page).await?;
        Ok((category, posts))
    }

    /// Any post, regardless of visibility.
    pub async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    /// A post as a reader sees it: hidden and scheduled posts exist only for their author.
    pub async fn post_detail(&self, id: i64, viewer: Option<i64>) -> Result<Post, DomainError> {
        let post = self.get_post(id).await?;
        let own = viewer.is_some_and(|viewer| post.is_authored_by(viewer));
        if own || post.is_visible(Utc::now()) {
            Ok(post)
        } else {
            Err(DomainError::PostNotFound(id))
        }
    }

    pub async fn form_choices(&self) -> Result<PostFormChoices, DomainError> {
        Ok(PostFormChoices {
            categories: self.taxonomy.list_categories().await?,
            locations: self.taxonomy.list_locations().await?,
        })
    }

    async fn clean(&self, form: PostForm) -> Result<PostDraft, DomainError> {
        let draft = form.clean().map_err(DomainError::Validation)?;

        let mut errors = FormErrors::default();
        if let Some(id) = draft.category_id {
            if self.taxonomy.find_category(id).await?.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
        }
        if let Some(id) = draft.location_id {
            if self.taxonomy.find_location(id).await?.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
        }
        errors.into_result()?;
        Ok(draft)
    }

    #[instrument(skip(self, form))]
    pub async fn create_post(&self, author_id: i64, form: PostForm) -> Result<Post, DomainError> {
        let draft = self.clean(form).await?;
        self.posts.create(author_id, draft).await
    }

    /// The post an editor may change. Anyone but the author is sent back to the post itself.
    pub async fn post_for_edit(&self, post_id: i64, editor_id: i64) -> Result<Post, DomainError> {
        let post = self.get_post(post_id).await?;
        if !post.is_authored_by(editor_id) {
            return Err(DomainError::NotAuthor { post_id });
        }
        Ok(post)
    }

    #[instrument(skip(self, form))]
    pub async fn edit_post(
        &self,
        post_id: i64,
        editor_id: i64,
        form: PostForm,
    ) -> Result<Post, DomainError> {
        self.post_for_edit(post_id, editor_id).await?;
        let draft = self.clean(form).await?;
        self.posts
            .update(post_id, draft)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    /// Scoped to the author: for anyone else the post does not exist.
    pub async fn post_for_deletion(
        &self,
        post_id: i64,
        author_id: i64,
    ) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .filter(|post| post.is_authored_by(author_id))
            .ok_or(DomainError::PostNotFound(post_id))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: i64, author_id: i64) -> Result<(), DomainError> {
        if self.posts.delete(post_id, author_id).await? {
            Ok(())
        } else {
            Err(DomainError::PostNotFound(post_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{InMemoryStore, PostSeed};
    use chrono::Duration;

    fn service(store: &InMemoryStore) -> PostService {
        PostService::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    fn form(title: &str) -> PostForm {
        PostForm {
            title: title.into(),
            text: "body".into(),
            pub_date: "2024-01-01T12:00".into(),
            ..PostForm::default()
        }
    }

    #[tokio::test]
    async fn index_shows_only_visible_posts() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let now = Utc::now();
        store
            .add_post(author.id, PostSeed::new("future", now + Duration::days(1)))
            .await;
        store
            .add_post(
                author.id,
                PostSeed::new("hidden", now - Duration::days(1)).unpublished(),
            )
            .await;
        let valid = store
            .add_post(author.id, PostSeed::new("valid", now - Duration::days(1)))
            .await;

        let page = service(&store).index(None).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.items[0].id, valid.id);
    }

    #[tokio::test]
    async fn index_hides_posts_in_unpublished_categories() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let hidden = store.add_category("hidden", false).await;
        let shown = store.add_category("shown", true).await;
        let past = Utc::now() - Duration::hours(2);
        store
            .add_post(author.id, PostSeed::new("a", past).in_category(hidden.id))
            .await;
        store
            .add_post(author.id, PostSeed::new("b", past).in_category(shown.id))
            .await;
        store.add_post(author.id, PostSeed::new("c", past)).await;

        let page = service(&store).index(None).await.unwrap();
        let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(page.count, 2);
        assert!(!titles.contains(&"a"));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_clamped() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let start = Utc::now() - Duration::days(30);
        for day in 0..23 {
            store
                .add_post(
                    author.id,
                    PostSeed::new(&format!("day {day}"), start + Duration::days(day)),
                )
                .await;
        }
        let service = service(&store);

        let first = service.index(None).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.num_pages, 3);
        assert_eq!(first.items[0].title, "day 22");
        assert!(
            first
                .items
                .windows(2)
                .all(|pair| pair[0].pub_date >= pair[1].pub_date)
        );

        let beyond = service.index(Some("40")).await.unwrap();
        assert_eq!(beyond.number, 3);
        assert_eq!(beyond.items.len(), 3);
        assert_eq!(beyond.items[2].title, "day 0");
    }

    #[tokio::test]
    async fn category_listing_requires_published_category() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let travel = store.add_category("travel", true).await;
        let drafts = store.add_category("drafts", false).await;
        let past = Utc::now() - Duration::hours(1);
        store
            .add_post(author.id, PostSeed::new("trip", past).in_category(travel.id))
            .await;
        store
            .add_post(author.id, PostSeed::new("other", past))
            .await;
        let service = service(&store);

        let (category, page) = service.category_posts("travel", None).await.unwrap();
        assert_eq!(category.id, travel.id);
        assert_eq!(page.count, 1);
        assert_eq!(page.items[0].title, "trip");

        assert!(matches!(
            service.category_posts(&drafts.slug, None).await,
            Err(DomainError::CategoryNotFound(_))
        ));
        assert!(matches!(
            service.category_posts("no such", None).await,
            Err(DomainError::CategoryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn detail_hides_scheduled_posts_except_from_author() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let reader = store.add_user("reader").await;
        let scheduled = store
            .add_post(
                author.id,
                PostSeed::new("soon", Utc::now() + Duration::days(3)),
            )
            .await;
        let service = service(&store);

        assert!(matches!(
            service.post_detail(scheduled.id, None).await,
            Err(DomainError::PostNotFound(_))
        ));
        assert!(service.post_detail(scheduled.id, Some(reader.id)).await.is_err());
        assert!(service.post_detail(scheduled.id, Some(author.id)).await.is_ok());
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let mut bad = form("title");
        bad.category = Some("999".into());

        let error = service(&store).create_post(author.id, bad).await.unwrap_err();
        let DomainError::Validation(errors) = error else {
            panic!("expected validation error, got {error:?}");
        };
        assert_eq!(errors.field("category").unwrap(), [INVALID_CHOICE]);
        assert_eq!(store.post_count().await, 0);
    }

    #[tokio::test]
    async fn create_sets_author_and_category() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let category = store.add_category("travel", true).await;
        let location = store.add_location("Kazan").await;
        let mut input = form("Trip");
        input.category = Some(category.id.to_string());
        input.location = Some(location.id.to_string());

        let post = service(&store).create_post(author.id, input).await.unwrap();
        assert_eq!(post.author_id, author.id);
        assert_eq!(post.author_username, "author");
        assert_eq!(post.category_slug.as_deref(), Some("travel"));
        assert_eq!(post.location_name.as_deref(), Some("Kazan"));
        assert_eq!(post.comment_count, 0);
    }

    #[tokio::test]
    async fn only_author_edits() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let other = store.add_user("other").await;
        let service = service(&store);
        let post = service.create_post(author.id, form("before")).await.unwrap();

        let error = service
            .edit_post(post.id, other.id, form("hijacked"))
            .await
            .unwrap_err();
        assert!(matches!(error, DomainError::NotAuthor { post_id } if post_id == post.id));
        assert_eq!(service.get_post(post.id).await.unwrap().title, "before");

        let edited = service
            .edit_post(post.id, author.id, form("after"))
            .await
            .unwrap();
        assert_eq!(edited.title, "after");
    }

    #[tokio::test]
    async fn delete_is_scoped_to_author() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let other = store.add_user("other").await;
        let service = service(&store);
        let post = service.create_post(author.id, form("mine")).await.unwrap();

        assert!(matches!(
            service.post_for_deletion(post.id, other.id).await,
            Err(DomainError::PostNotFound(_))
        ));
        assert!(matches!(
            service.delete_post(post.id, other.id).await,
            Err(DomainError::PostNotFound(_))
        ));
        assert_eq!(store.post_count().await, 1);

        service.delete_post(post.id, author.id).await.unwrap();
        assert_eq!(store.post_count().await, 0);
    }

    #[tokio::test]
    async fn deleting_a_category_keeps_its_posts() {
        let store = InMemoryStore::new();
        let author = store.add_user("author").await;
        let category = store.add_category("gone", true).await;
        let post = store
            .add_post(
                author.id,
                PostSeed::new("orphan", Utc::now() - Duration::hours(1)).in_category(category.id),
            )
            .await;

        store.remove_category(category.id).await;

        let reloaded = service(&store).post_detail(post.id, None).await.unwrap();
        assert_eq!(reloaded.category_id, None);
    }
}
