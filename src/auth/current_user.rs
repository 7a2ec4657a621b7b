use axum::{Extension, Json};

use crate::user::{User, UserView};

/// A route handler for getting the logged in user.
pub async fn get_current_user_endpoint(Extension(user): Extension<User>) -> Json<UserView> {
    Json(UserView::from(&user))
}
