//! End-to-end scenarios driven through the service layer

mod chat_session;
mod store_failures;
