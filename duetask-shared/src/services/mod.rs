/// Account and to-do operations
///
/// These are the operations the HTTP layer exposes, expressed over the
/// database pool and already scoped to the calling user:
///
/// - [`accounts`]: register, authenticate, attach a push subscription
/// - [`todos`]: list, get, create, update, complete, delete
///
/// Every operation returns [`ServiceResult`]; [`ServiceError`] is the
/// domain-level error taxonomy the API maps onto pages and status codes.

pub mod accounts;
pub mod error;
pub mod todos;

pub use error::{ServiceError, ServiceResult};
