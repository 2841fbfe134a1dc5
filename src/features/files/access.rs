//! Access evaluation for file operations.
//!
//! Pure decision logic over a file record and its share list. Callers map
//! `Hidden` to a not-found error and `Denied` to a permission error: a file
//! outside the requester's visibility must be indistinguishable from a
//! missing id, while a file reached through a share entry may reject an
//! operation explicitly.

use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::models::{File, FileShare, SharePermission};

/// Operation a requester wants to perform on a file record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Read content or metadata
    View,
    /// Replace or rewrite content
    Edit,
    /// Add or update a share entry
    Share,
    /// Remove the record and its content
    Delete,
}

/// Outcome of evaluating an operation against a file's access-control data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    /// Visible to the requester, but the operation exceeds the granted permission
    Denied,
    /// Outside the requester's visibility scope
    Hidden,
}

/// Find the share entry matching the requester's normalized email, if any
pub fn share_for<'a>(shares: &'a [FileShare], user: &AuthenticatedUser) -> Option<&'a FileShare> {
    let email = user.normalized_email();
    shares.iter().find(|s| s.email == email)
}

/// Decide whether `user` may perform `operation` on `file`.
///
/// Owners may do anything. Admins may view and edit any file, but sharing is
/// not delegable and admin deletion goes through its own unconditional path,
/// so neither grants `Share` or `Delete` here.
pub fn evaluate(
    file: &File,
    shares: &[FileShare],
    user: &AuthenticatedUser,
    operation: FileOperation,
) -> AccessDecision {
    if file.owner_id == user.id {
        return AccessDecision::Allowed;
    }

    let share = share_for(shares, user);

    match operation {
        FileOperation::View => {
            if share.is_some() || user.is_admin() {
                AccessDecision::Allowed
            } else {
                AccessDecision::Hidden
            }
        }
        FileOperation::Edit => {
            if user.is_admin() {
                return AccessDecision::Allowed;
            }
            match share {
                Some(s) if s.permission == SharePermission::Edit => AccessDecision::Allowed,
                Some(_) => AccessDecision::Denied,
                None => AccessDecision::Hidden,
            }
        }
        FileOperation::Share | FileOperation::Delete => AccessDecision::Hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn owner() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "owner-1".to_string(),
            email: "owner@example.com".to_string(),
            role: Role::Member,
        }
    }

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "admin-1".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    fn stranger() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "stranger-1".to_string(),
            email: "stranger@example.com".to_string(),
            role: Role::Member,
        }
    }

    fn bob() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "bob-1".to_string(),
            email: "bob@x.com".to_string(),
            role: Role::Member,
        }
    }

    fn file() -> File {
        let now = Utc::now();
        File {
            id: Uuid::new_v4(),
            storage_key: "owner-1/blob.pdf".to_string(),
            original_filename: "report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            file_size: 500_000,
            owner_id: "owner-1".to_string(),
            owner_email: "owner@example.com".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn share(file: &File, email: &str, permission: SharePermission) -> FileShare {
        let now = Utc::now();
        FileShare {
            file_id: file.id,
            email: email.to_string(),
            permission,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_is_allowed_everything() {
        let f = file();
        for op in [
            FileOperation::View,
            FileOperation::Edit,
            FileOperation::Share,
            FileOperation::Delete,
        ] {
            assert_eq!(evaluate(&f, &[], &owner(), op), AccessDecision::Allowed);
        }
    }

    #[test]
    fn view_sharer_can_view_but_not_edit() {
        let f = file();
        let shares = vec![share(&f, "bob@x.com", SharePermission::View)];

        assert_eq!(
            evaluate(&f, &shares, &bob(), FileOperation::View),
            AccessDecision::Allowed
        );
        // the file was located through the sharing path, so the rejection is explicit
        assert_eq!(
            evaluate(&f, &shares, &bob(), FileOperation::Edit),
            AccessDecision::Denied
        );
    }

    #[test]
    fn edit_sharer_can_edit() {
        let f = file();
        let shares = vec![share(&f, "bob@x.com", SharePermission::Edit)];

        assert_eq!(
            evaluate(&f, &shares, &bob(), FileOperation::Edit),
            AccessDecision::Allowed
        );
        assert_eq!(
            evaluate(&f, &shares, &bob(), FileOperation::View),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn share_matching_is_case_insensitive_on_requester_email() {
        let f = file();
        let shares = vec![share(&f, "bob@x.com", SharePermission::Edit)];
        let mixed_case_bob = AuthenticatedUser {
            id: "bob-1".to_string(),
            email: "Bob@X.com".to_string(),
            role: Role::Member,
        };

        assert_eq!(
            evaluate(&f, &shares, &mixed_case_bob, FileOperation::Edit),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn stranger_sees_nothing() {
        let f = file();
        let shares = vec![share(&f, "bob@x.com", SharePermission::Edit)];

        for op in [
            FileOperation::View,
            FileOperation::Edit,
            FileOperation::Share,
            FileOperation::Delete,
        ] {
            assert_eq!(
                evaluate(&f, &shares, &stranger(), op),
                AccessDecision::Hidden
            );
        }
    }

    #[test]
    fn admin_can_view_and_edit_but_not_share_or_delete_via_owner_path() {
        let f = file();

        assert_eq!(
            evaluate(&f, &[], &admin(), FileOperation::View),
            AccessDecision::Allowed
        );
        assert_eq!(
            evaluate(&f, &[], &admin(), FileOperation::Edit),
            AccessDecision::Allowed
        );
        // admin deletion is a separate unconditional path, sharing is owner-only
        assert_eq!(
            evaluate(&f, &[], &admin(), FileOperation::Share),
            AccessDecision::Hidden
        );
        assert_eq!(
            evaluate(&f, &[], &admin(), FileOperation::Delete),
            AccessDecision::Hidden
        );
    }

    #[test]
    fn sharer_cannot_delete_or_reshare() {
        let f = file();
        let shares = vec![share(&f, "bob@x.com", SharePermission::Edit)];

        assert_eq!(
            evaluate(&f, &shares, &bob(), FileOperation::Delete),
            AccessDecision::Hidden
        );
        assert_eq!(
            evaluate(&f, &shares, &bob(), FileOperation::Share),
            AccessDecision::Hidden
        );
    }

    #[test]
    fn share_for_ignores_other_entries() {
        let f = file();
        let shares = vec![
            share(&f, "carol@x.com", SharePermission::Edit),
            share(&f, "bob@x.com", SharePermission::View),
        ];

        let found = share_for(&shares, &bob()).unwrap();
        assert_eq!(found.email, "bob@x.com");
        assert_eq!(found.permission, SharePermission::View);

        assert!(share_for(&shares, &stranger()).is_none());
    }
}
