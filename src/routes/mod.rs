/// Router Module Index
///
/// Page routes are split by who may reach them. Every page route starts with
/// a `{locale}` segment; locale routing guarantees it is a supported code by
/// the time a request gets here.

/// Pages open to anonymous visitors: landing, sign-in, chat.
pub mod public;

/// The admin console. Gated at the edge by the route guard (session cookie
/// present) and authoritatively by the backend (bearer token valid).
pub mod admin;

/// The portal's own API namespace; bypasses the guard and locale routing.
pub mod api;
