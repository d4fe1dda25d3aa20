/// Middleware modules for the API server
///
/// - `security`: Security response headers
/// - `session`: Session cookie resolution and login gates

pub mod security;
pub mod session;
