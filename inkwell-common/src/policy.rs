//! Authorization rules for posts and comments.
//!
//! Every rule is a pure function of the acting user and the target. Admins are
//! allowed everything before any other rule is looked at.

use crate::model::{comment::Comment, post::Post, user::User};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(value: bool) -> Self {
        if value { Decision::Allow } else { Decision::Deny }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum PostAction<'a> {
    ViewAny,
    View(&'a Post),
    Create,
    Update(&'a Post),
    Delete(&'a Post),
}

impl PostAction<'_> {
    #[must_use]
    pub fn denial_message(self) -> &'static str {
        match self {
            PostAction::ViewAny | PostAction::View(_) => {
                "You do not have permission to view posts."
            }
            PostAction::Create => "You do not have permission to create posts.",
            PostAction::Update(_) => "You do not have permission to update this post.",
            PostAction::Delete(_) => "You do not have permission to delete this post.",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum CommentAction {
    Update,
    Delete,
}

impl CommentAction {
    #[must_use]
    pub fn denial_message(self) -> &'static str {
        match self {
            CommentAction::Update => "You do not have permission to update this comment.",
            CommentAction::Delete => "You do not have permission to delete this comment.",
        }
    }
}

#[must_use]
pub fn authorize_post(actor: &User, action: PostAction<'_>) -> Decision {
    if actor.is_admin() {
        return Decision::Allow;
    }

    let allowed = match action {
        PostAction::ViewAny | PostAction::View(_) => true,
        PostAction::Create => actor.is_editor(),
        PostAction::Update(post) => actor.is_editor() && post.created_by == actor.id,
        PostAction::Delete(_) => false,
    };

    allowed.into()
}

/// Update and delete share one rule: the author or an admin.
#[must_use]
pub fn authorize_comment(actor: &User, action: CommentAction, comment: &Comment) -> Decision {
    if actor.is_admin() {
        return Decision::Allow;
    }

    match action {
        CommentAction::Update | CommentAction::Delete => (comment.user_id == actor.id).into(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            Id,
            comment::{Comment, CommentText},
            post::{Post, PostContent, PostStatus, PostTitle},
            user::{Email, Role, User, UserName},
        },
        policy::{CommentAction, Decision, PostAction, authorize_comment, authorize_post},
    };
    use time::macros::utc_datetime;

    const ROLES: [Role; 3] = [Role::Admin, Role::Editor, Role::Viewer];

    fn user(id: i64, role: Role) -> User {
        User {
            id: Id::new(id),
            name: UserName::new(format!("user {id}")).unwrap(),
            email: Email::new(format!("user{id}@example.com")).unwrap(),
            role,
            created_at: utc_datetime!(2025-01-01 00:00),
            updated_at: utc_datetime!(2025-01-01 00:00),
        }
    }

    fn post_by(author: i64, status: PostStatus) -> Post {
        Post {
            id: Id::new(100),
            title: PostTitle::new("Title".to_owned()).unwrap(),
            content: PostContent::new("Content".to_owned()).unwrap(),
            status,
            created_by: Id::new(author),
            created_at: utc_datetime!(2025-01-02 00:00),
            updated_at: utc_datetime!(2025-01-02 00:00),
        }
    }

    fn comment_by(author: i64) -> Comment {
        Comment {
            id: Id::new(200),
            post_id: Id::new(100),
            user_id: Id::new(author),
            comment: CommentText::new("Nice".to_owned()).unwrap(),
            created_at: utc_datetime!(2025-01-03 00:00),
            updated_at: utc_datetime!(2025-01-03 00:00),
        }
    }

    #[test]
    fn everyone_may_list_and_view() {
        let draft = post_by(1, PostStatus::Draft);
        for role in ROLES {
            let actor = user(2, role);
            assert!(authorize_post(&actor, PostAction::ViewAny).is_allowed());
            assert!(authorize_post(&actor, PostAction::View(&draft)).is_allowed());
        }
    }

    #[test]
    fn only_admins_and_editors_create() {
        assert_eq!(authorize_post(&user(1, Role::Admin), PostAction::Create), Decision::Allow);
        assert_eq!(authorize_post(&user(1, Role::Editor), PostAction::Create), Decision::Allow);
        assert_eq!(authorize_post(&user(1, Role::Viewer), PostAction::Create), Decision::Deny);
    }

    #[test]
    fn editors_update_only_their_own_posts() {
        let own = post_by(5, PostStatus::Published);
        let foreign = post_by(6, PostStatus::Published);
        let editor = user(5, Role::Editor);

        assert!(authorize_post(&editor, PostAction::Update(&own)).is_allowed());
        assert!(!authorize_post(&editor, PostAction::Update(&foreign)).is_allowed());
        assert!(authorize_post(&user(9, Role::Admin), PostAction::Update(&foreign)).is_allowed());
    }

    #[test]
    fn viewers_never_update_even_their_own_posts() {
        let viewer = user(5, Role::Viewer);
        let post = post_by(5, PostStatus::Draft);
        assert!(!authorize_post(&viewer, PostAction::Update(&post)).is_allowed());
    }

    #[test]
    fn only_admins_delete_regardless_of_ownership() {
        for role in ROLES {
            let actor = user(5, role);
            for post in [post_by(5, PostStatus::Draft), post_by(6, PostStatus::Published)] {
                assert_eq!(
                    authorize_post(&actor, PostAction::Delete(&post)).is_allowed(),
                    role == Role::Admin,
                    "{role:?} deleting post of {}",
                    post.created_by
                );
            }
        }
    }

    #[test]
    fn comments_belong_to_author_or_admin() {
        let comment = comment_by(5);
        for action in [CommentAction::Update, CommentAction::Delete] {
            for role in ROLES {
                assert!(authorize_comment(&user(5, role), action, &comment).is_allowed());
                assert_eq!(
                    authorize_comment(&user(6, role), action, &comment).is_allowed(),
                    role == Role::Admin
                );
            }
        }
    }

    #[test]
    fn denial_messages() {
        let post = post_by(1, PostStatus::Draft);
        assert_eq!(
            PostAction::ViewAny.denial_message(),
            "You do not have permission to view posts."
        );
        assert_eq!(
            PostAction::Delete(&post).denial_message(),
            "You do not have permission to delete this post."
        );
        assert_eq!(
            CommentAction::Update.denial_message(),
            "You do not have permission to update this comment."
        );
    }
}
