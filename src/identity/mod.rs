//! Subscriber identity for the widget API: session tokens, the HMAC check used
//! at session initialization, and the axum extractor that resolves a bearer
//! token into a [`SubscriberSession`].

mod session;
pub mod hmac;
mod extract;

pub use session::{SessionManager, SessionToken, SubscriberSession};
pub use extract::bearer_token;
