//! In-memory repositories backing the service and route tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::taxonomy_repository::TaxonomyRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::category::Category;
use crate::domain::comment::{Comment, OwnedComment};
use crate::domain::error::DomainError;
use crate::domain::location::Location;
use crate::domain::post::{Post, PostDraft, PostScope};
use crate::domain::user::{NewUser, ProfileChanges, User};

#[derive(Debug, Clone)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    image: Option<String>,
    comment_count: i32,
    is_published: bool,
    created_at: DateTime<Utc>,
    author_id: i64,
    category_id: Option<i64>,
    location_id: Option<i64>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    post_id: i64,
    author_id: i64,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    categories: Vec<Category>,
    locations: Vec<Location>,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate_post(&self, row: &PostRow) -> Post {
        let author = self.users.iter().find(|u| u.id == row.author_id);
        let category = row
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id));
        let location = row
            .location_id
            .and_then(|id| self.locations.iter().find(|l| l.id == id));
        Post {
            id: row.id,
            title: row.title.clone(),
            text: row.text.clone(),
            pub_date: row.pub_date,
            image: row.image.clone(),
            comment_count: row.comment_count,
            is_published: row.is_published,
            created_at: row.created_at,
            author_id: row.author_id,
            author_username: author.map(|u| u.username.clone()).unwrap_or_default(),
            category_id: category.map(|c| c.id),
            category_title: category.map(|c| c.title.clone()),
            category_slug: category.map(|c| c.slug.clone()),
            category_is_published: category.map(|c| c.is_published),
            location_id: location.map(|l| l.id),
            location_name: location.map(|l| l.name.clone()),
            location_is_published: location.map(|l| l.is_published),
        }
    }

    fn hydrate_comment(&self, row: &CommentRow) -> Comment {
        Comment {
            id: row.id,
            text: row.text.clone(),
            pub_date: row.pub_date,
            post_id: row.post_id,
            author_id: row.author_id,
            author_username: self
                .users
                .iter()
                .find(|u| u.id == row.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
        }
    }

    fn scoped(&self, scope: &PostScope) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .map(|row| self.hydrate_post(row))
            .filter(|post| scope.admits(post))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    fn recount_comments(&mut self, post_id: i64) {
        let count = self.comments.iter().filter(|c| c.post_id == post_id).count() as i32;
        if let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) {
            post.comment_count = count;
        }
    }

    fn owned_comment(&self, key: OwnedComment) -> Option<&CommentRow> {
        self.comments
            .iter()
            .find(|c| c.id == key.id && c.post_id == key.post_id && c.author_id == key.author_id)
    }
}

/// Everything the Postgres repositories store, kept in one lock-guarded state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

/// Seed data for a post inserted directly, bypassing form validation.
#[derive(Debug, Clone)]
pub struct PostSeed {
    pub title: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<i64>,
}

impl PostSeed {
    pub fn new(title: &str, pub_date: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            pub_date,
            is_published: true,
            category_id: None,
        }
    }

    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, username: &str) -> User {
        UserRepository::create(
            self,
            NewUser {
                username: username.to_string(),
                password_hash: String::new(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn add_category(&self, slug: &str, is_published: bool) -> Category {
        let mut state = self.state.write().await;
        let category = Category {
            id: state.next_id(),
            title: slug.to_uppercase(),
            description: format!("about {slug}"),
            slug: slug.to_string(),
            is_published,
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        category
    }

    pub async fn add_location(&self, name: &str) -> Location {
        let mut state = self.state.write().await;
        let location = Location {
            id: state.next_id(),
            name: name.to_string(),
            is_published: true,
            created_at: Utc::now(),
        };
        state.locations.push(location.clone());
        location
    }

    pub async fn add_post(&self, author_id: i64, seed: PostSeed) -> Post {
        let mut state = self.state.write().await;
        let row = PostRow {
            id: state.next_id(),
            title: seed.title,
            text: "text".into(),
            pub_date: seed.pub_date,
            image: None,
            comment_count: 0,
            is_published: seed.is_published,
            created_at: Utc::now(),
            author_id,
            category_id: seed.category_id,
            location_id: None,
        };
        state.posts.push(row.clone());
        state.hydrate_post(&row)
    }

    /// Removes a category the way `ON DELETE SET NULL` would.
    pub async fn remove_category(&self, id: i64) {
        let mut state = self.state.write().await;
        state.categories.retain(|c| c.id != id);
        for post in state.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
    }

    pub async fn post_count(&self) -> usize {
        self.state.read().await.posts.len()
    }

    pub async fn comment_count(&self, post_id: i64) -> usize {
        let state = self.state.read().await;
        state.comments.iter().filter(|c| c.post_id == post_id).count()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(user.username));
        }
        let created = User {
            id: state.next_id(),
            username: user.username,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: i64,
        changes: ProfileChanges,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.id != id && u.username == changes.username)
        {
            return Err(DomainError::UserAlreadyExists(changes.username));
        }
        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.username = changes.username;
        user.first_name = changes.first_name;
        user.last_name = changes.last_name;
        user.email = changes.email;
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl TaxonomyRepository for InMemoryStore {
    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_location(&self, id: i64) -> Result<Option<Location>, DomainError> {
        let state = self.state.read().await;
        Ok(state.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.state.read().await.categories.clone())
    }

    async fn list_locations(&self) -> Result<Vec<Location>, DomainError> {
        Ok(self.state.read().await.locations.clone())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let mut state = self.state.write().await;
        let row = PostRow {
            id: state.next_id(),
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date,
            image: draft.image,
            comment_count: 0,
            is_published: true,
            created_at: Utc::now(),
            author_id,
            category_id: draft.category_id,
            location_id: draft.location_id,
        };
        state.posts.push(row.clone());
        Ok(state.hydrate_post(&row))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|row| state.hydrate_post(row)))
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Option<Post>, DomainError> {
        let mut state = self.state.write().await;
        let Some(row) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        row.title = draft.title;
        row.text = draft.text;
        row.pub_date = draft.pub_date;
        row.category_id = draft.category_id;
        row.location_id = draft.location_id;
        if draft.clear_image {
            row.image = None;
        } else if draft.image.is_some() {
            row.image = draft.image;
        }
        let row = row.clone();
        Ok(Some(state.hydrate_post(&row)))
    }

    async fn delete(&self, id: i64, author_id: i64) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let before = state.posts.len();
        state
            .posts
            .retain(|p| !(p.id == id && p.author_id == author_id));
        let removed = state.posts.len() < before;
        if removed {
            state.comments.retain(|c| c.post_id != id);
        }
        Ok(removed)
    }

    async fn count(&self, scope: &PostScope) -> Result<u64, DomainError> {
        Ok(self.state.read().await.scoped(scope).len() as u64)
    }

    async fn list(
        &self,
        scope: &PostScope,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .scoped(scope)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        text: String,
    ) -> Result<Comment, DomainError> {
        let mut state = self.state.write().await;
        let row = CommentRow {
            id: state.next_id(),
            text,
            pub_date: Utc::now(),
            post_id,
            author_id,
        };
        state.comments.push(row.clone());
        state.recount_comments(post_id);
        Ok(state.hydrate_comment(&row))
    }

    async fn find_owned(&self, key: OwnedComment) -> Result<Option<Comment>, DomainError> {
        let state = self.state.read().await;
        Ok(state.owned_comment(key).map(|row| state.hydrate_comment(row)))
    }

    async fn update(
        &self,
        key: OwnedComment,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let mut state = self.state.write().await;
        let Some(row) = state
            .comments
            .iter_mut()
            .find(|c| c.id == key.id && c.post_id == key.post_id && c.author_id == key.author_id)
        else {
            return Ok(None);
        };
        row.text = text;
        let row = row.clone();
        Ok(Some(state.hydrate_comment(&row)))
    }

    async fn delete(&self, key: OwnedComment) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        if state.owned_comment(key).is_none() {
            return Ok(false);
        }
        state.comments.retain(|c| c.id != key.id);
        state.recount_comments(key.post_id);
        Ok(true)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|row| state.hydrate_comment(row))
            .collect();
        comments.sort_by(|a, b| a.pub_date.cmp(&b.pub_date).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}
