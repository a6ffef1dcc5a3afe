use super::*;
use crate::state::test_helpers;

#[tokio::test]
async fn healthz_returns_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[tokio::test]
async fn app_builds_with_state() {
    let state = test_helpers::test_app_state();
    let _router: Router = app(state);
}
