mod cookie;
mod current_user;
mod gateway;
mod log_in;
mod log_out;

pub use current_user::get_current_user_endpoint;
pub use gateway::{api_auth_guard, page_auth_guard, redirect_if_authenticated};
pub use log_in::{get_log_in_page, log_in_endpoint};
pub use log_out::log_out_endpoint;

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
