#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod html;

pub(crate) use db::{
    TEST_PASSWORD, get_finance_state, get_test_app_state, get_test_connection,
    insert_test_user,
};
pub(crate) use html::{assert_valid_html, parse_html_document};
