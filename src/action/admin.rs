//! Admin login/logout and blog post management

use serde::Serialize;

use super::{Payload, ViewState};
use crate::blog::{BlogPost, NewBlogPost};
use crate::context::AppContext;
use crate::form::{form_error, FieldCheck, FieldErrors, FormData, FromForm, TextField};
use crate::i18n::MessageId;
use crate::session::{clear_cookie_header, post_login_redirect, LOGIN_PATH};

const TITLE_MIN: usize = 5;
const TITLE_MAX: usize = 150;
const CONTENT_MIN: usize = 20;
const EXCERPT_MAX: usize = 300;

const POST_ID_FIELD: &str = "postId";

// ============================================================================
// OUTPUTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    /// Session token (cookie value)
    pub token: String,
    /// Full `Set-Cookie` value
    pub cookie: String,
    pub redirect_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutOutcome {
    pub cookie: String,
    pub redirect_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedPost {
    pub id: String,
}

impl Payload for LoginOutcome {}
impl Payload for LogoutOutcome {}
impl Payload for DeletedPost {}

// ============================================================================
// FORMS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Page that sent the user to the login form
    pub from: Option<String>,
}

impl FromForm for LoginForm {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors> {
        let mut check = FieldCheck::new(form, &["username", "password", "from"]);
        let username = check.required_text(
            &TextField::required("username").missing_message("adminUsernameRequired"),
        );
        // passwords are compared as typed
        let password = match form.get("password").filter(|p| !p.is_empty()) {
            Some(p) => p.to_string(),
            None => {
                check.push("password", MessageId::new("adminPasswordRequired"));
                String::new()
            }
        };
        let from = check.text(&TextField::optional("from"));
        check.finish(|| Self {
            username,
            password,
            from,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub excerpt: Option<String>,
}

const POST_FIELDS: &[&str] = &["title", "content", "author", "excerpt"];

impl PostForm {
    fn check(check: &mut FieldCheck<'_>) -> Self {
        Self {
            title: check.required_text(
                &TextField::required("title").min(TITLE_MIN).max(TITLE_MAX),
            ),
            content: check.required_text(&TextField::required("content").min(CONTENT_MIN)),
            author: check.text(&TextField::optional("author")),
            excerpt: check.text(&TextField::optional("excerpt").max(EXCERPT_MAX)),
        }
    }

    pub fn into_new_post(self) -> NewBlogPost {
        NewBlogPost {
            title: self.title,
            content: self.content,
            author: self.author,
            excerpt: self.excerpt,
        }
    }
}

impl FromForm for PostForm {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors> {
        let mut check = FieldCheck::new(form, POST_FIELDS);
        let post = PostForm::check(&mut check);
        check.finish(|| post)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePostForm {
    pub post_id: String,
    pub post: PostForm,
}

impl FromForm for UpdatePostForm {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors> {
        let mut allowed = POST_FIELDS.to_vec();
        allowed.push(POST_ID_FIELD);
        let mut check = FieldCheck::new(form, &allowed);
        let post_id = check.required_text(
            &TextField::required(POST_ID_FIELD).missing_message("blogPostErrorIdMissing"),
        );
        let post = PostForm::check(&mut check);
        check.finish(|| Self { post_id, post })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletePostForm {
    pub post_id: String,
}

impl FromForm for DeletePostForm {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors> {
        let mut check = FieldCheck::new(form, &[POST_ID_FIELD]);
        let post_id = check.required_text(
            &TextField::required(POST_ID_FIELD).missing_message("blogPostErrorIdMissing"),
        );
        check.finish(|| Self { post_id })
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn handle_admin_login(
    ctx: &AppContext,
    _prev: &ViewState<LoginOutcome>,
    form: &FormData,
) -> ViewState<LoginOutcome> {
    let login = match LoginForm::from_form(form) {
        Ok(login) => login,
        Err(errors) => return rejected(ctx, "admin_login", errors),
    };

    let admin = &ctx.config().admin;
    let expected_password = match admin.login_password() {
        Ok(password) => password,
        Err(e) => {
            tracing::error!(error = %e, "Admin login attempted but admin access is not configured");
            let message = MessageId::new("adminNotConfigured");
            return ViewState::failure(message.clone(), form_error(message), ctx.now());
        }
    };

    if login.username != admin.username || login.password != expected_password {
        tracing::warn!(username = %login.username, "Admin login rejected");
        return ViewState::failure(
            MessageId::new("adminLoginFailed"),
            form_error(MessageId::new("adminInvalidCredentials")),
            ctx.now(),
        );
    }

    let token = ctx.signer().issue();
    let outcome = LoginOutcome {
        cookie: ctx.signer().cookie_header(&token),
        token,
        redirect_to: post_login_redirect(login.from.as_deref()),
    };
    tracing::info!(username = %login.username, redirect_to = %outcome.redirect_to, "Admin logged in");
    ViewState::success(MessageId::new("adminLoginSuccess"), outcome, ctx.now())
}

pub async fn handle_admin_logout(
    ctx: &AppContext,
    _prev: &ViewState<LogoutOutcome>,
    _form: &FormData,
) -> ViewState<LogoutOutcome> {
    tracing::info!("Admin logged out");
    ViewState::success(
        MessageId::new("adminLogoutSuccess"),
        LogoutOutcome {
            cookie: clear_cookie_header(),
            redirect_to: LOGIN_PATH.to_string(),
        },
        ctx.now(),
    )
}

pub async fn handle_create_post(
    ctx: &AppContext,
    _prev: &ViewState<BlogPost>,
    form: &FormData,
) -> ViewState<BlogPost> {
    let post = match PostForm::from_form(form) {
        Ok(post) => post,
        Err(errors) => return rejected(ctx, "create_post", errors),
    };

    match ctx.blog().await.create(post.into_new_post()).await {
        Ok(created) => ViewState::success(MessageId::new("blogPostCreatedSuccess"), created, ctx.now()),
        Err(e) => {
            tracing::error!(error = %e, "Blog post creation failed");
            ViewState::failure(
                MessageId::new("blogPostCreationError"),
                form_error(MessageId::new("blogPostCreationFailed").with_param("error", e.to_string())),
                ctx.now(),
            )
        }
    }
}

pub async fn handle_update_post(
    ctx: &AppContext,
    _prev: &ViewState<BlogPost>,
    form: &FormData,
) -> ViewState<BlogPost> {
    if form.get_trimmed(POST_ID_FIELD).is_none() {
        return id_missing(ctx);
    }
    let update = match UpdatePostForm::from_form(form) {
        Ok(update) => update,
        Err(errors) => return rejected(ctx, "update_post", errors),
    };

    let store = ctx.blog().await;
    match store.update(&update.post_id, update.post.into_new_post()).await {
        Ok(Some(updated)) => {
            ViewState::success(MessageId::new("blogPostUpdatedSuccess"), updated, ctx.now())
        }
        Ok(None) => {
            let message = MessageId::new("blogPostUpdateErrorNotFound");
            ViewState::failure(message.clone(), form_error(message), ctx.now())
        }
        Err(e) => {
            tracing::error!(post_id = %update.post_id, error = %e, "Blog post update failed");
            ViewState::failure(
                MessageId::new("blogPostUpdateError"),
                form_error(MessageId::new("blogPostUpdateFailed").with_param("error", e.to_string())),
                ctx.now(),
            )
        }
    }
}

pub async fn handle_delete_post(
    ctx: &AppContext,
    _prev: &ViewState<DeletedPost>,
    form: &FormData,
) -> ViewState<DeletedPost> {
    if form.get_trimmed(POST_ID_FIELD).is_none() {
        return id_missing(ctx);
    }
    let delete = match DeletePostForm::from_form(form) {
        Ok(delete) => delete,
        Err(errors) => return rejected(ctx, "delete_post", errors),
    };

    match ctx.blog().await.delete(&delete.post_id).await {
        Ok(true) => ViewState::success(
            MessageId::new("blogPostDeletedSuccess"),
            DeletedPost { id: delete.post_id },
            ctx.now(),
        ),
        Ok(false) => {
            let message = MessageId::new("blogPostDeletionErrorNotFound");
            ViewState::failure(message.clone(), form_error(message), ctx.now())
        }
        Err(e) => {
            tracing::error!(post_id = %delete.post_id, error = %e, "Blog post deletion failed");
            ViewState::failure(
                MessageId::new("blogPostDeletionError"),
                form_error(MessageId::new("blogPostDeletionFailed").with_param("error", e.to_string())),
                ctx.now(),
            )
        }
    }
}

fn id_missing<T>(ctx: &AppContext) -> ViewState<T> {
    let message = MessageId::new("blogPostErrorIdMissing");
    ViewState::failure(message.clone(), form_error(message), ctx.now())
}

fn rejected<T>(ctx: &AppContext, action: &'static str, errors: FieldErrors) -> ViewState<T> {
    tracing::debug!(
        action,
        fields = ?errors.keys().collect::<Vec<_>>(),
        "Submission rejected by validation"
    );
    ViewState::invalid(errors, ctx.now())
}
