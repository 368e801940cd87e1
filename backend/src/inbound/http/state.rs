//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{RecipeDirectory, TokenIssuer, UserDirectory};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User account use-cases.
    pub users: Arc<dyn UserDirectory>,
    /// Recipe use-cases.
    pub recipes: Arc<dyn RecipeDirectory>,
    /// Verifies bearer tokens presented by callers.
    pub tokens: Arc<dyn TokenIssuer>,
}

impl HttpState {
    /// Construct state from its ports.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        recipes: Arc<dyn RecipeDirectory>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            users,
            recipes,
            tokens,
        }
    }
}
