use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::{Error, html::error_view};

/// The fallback for unknown routes.
///
/// API routes get a JSON error, everything else gets an HTML page.
pub async fn get_404_not_found(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return Error::NotFound.into_response();
    }

    (
        StatusCode::NOT_FOUND,
        error_view(
            "Página não encontrada",
            "404",
            "Página não encontrada.",
            "Confira o endereço e tente novamente.",
        ),
    )
        .into_response()
}

#[cfg(test)]
mod not_found_tests {
    use axum::{Router, http::StatusCode};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_404_not_found;

    fn get_test_server() -> TestServer {
        TestServer::new(Router::new().fallback(get_404_not_found))
            .expect("Could not create test server.")
    }

    #[tokio::test]
    async fn unknown_api_route_gets_json() {
        let response = get_test_server().get("/api/nothing").await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({"error": "The requested resource could not be found"}));
    }

    #[tokio::test]
    async fn unknown_page_gets_html() {
        let response = get_test_server().get("/nothing").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_valid_html(&parse_html_document(&response));
    }
}
