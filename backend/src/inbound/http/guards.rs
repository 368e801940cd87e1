//! Authorisation guards applied by handlers after authentication.
//!
//! Each guard runs before the handler calls any mutating use-case so a
//! rejected caller never reaches the store.

use crate::domain::{Error, Recipe, Role, UserId};

use super::auth::AuthenticatedUser;

/// Allow only the account owner.
pub fn require_self(caller: &AuthenticatedUser, target: &UserId) -> Result<(), Error> {
    if caller.user_id() == target {
        Ok(())
    } else {
        Err(Error::forbidden("you may only change your own account"))
    }
}

/// Allow only administrators.
pub fn require_admin(caller: &AuthenticatedUser) -> Result<(), Error> {
    if caller.role() == Role::Admin {
        Ok(())
    } else {
        Err(Error::forbidden("administrator role required"))
    }
}

/// Allow the account owner or an administrator.
pub fn require_self_or_admin(caller: &AuthenticatedUser, target: &UserId) -> Result<(), Error> {
    if caller.user_id() == target || caller.role() == Role::Admin {
        Ok(())
    } else {
        Err(Error::forbidden(
            "only the account owner or an administrator may do this",
        ))
    }
}

/// Allow only the caller to act as the declared owner of a new resource.
pub fn require_acting_as(caller: &AuthenticatedUser, owner: &UserId) -> Result<(), Error> {
    if caller.user_id() == owner {
        Ok(())
    } else {
        Err(Error::forbidden("recipes may only be created for yourself"))
    }
}

/// Allow only the recipe's author.
pub fn require_author(caller: &AuthenticatedUser, recipe: &Recipe) -> Result<(), Error> {
    if caller.user_id() == &recipe.user_id {
        Ok(())
    } else {
        Err(Error::forbidden("only the author may change this recipe"))
    }
}
