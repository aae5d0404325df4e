pub mod test_with_server;

use axum_test::TestServer;
use fake::{faker, Fake};
use serde_json::json;
use timebank_server::entities::user_auth::profile_entity::Profile;

/// Seed a profile through the dev register route; the server's cookie jar
/// ends up holding this user's session.
#[allow(dead_code)]
pub async fn create_login_test_user(server: &TestServer, display_name: &str) -> Profile {
    let email: String = faker::internet::en::FreeEmail().fake();
    register_user(server, &email, display_name, false).await
}

#[allow(dead_code)]
pub async fn create_login_test_admin(server: &TestServer, display_name: &str) -> Profile {
    let email: String = faker::internet::en::FreeEmail().fake();
    register_user(server, &email, display_name, true).await
}

#[allow(dead_code)]
pub async fn register_user(
    server: &TestServer,
    email: &str,
    display_name: &str,
    is_admin: bool,
) -> Profile {
    let response = server
        .post("/test/api/register")
        .json(&json!({
            "email": email,
            "display_name": display_name,
            "is_admin": is_admin,
        }))
        .await;
    response.assert_status_success();
    response.json::<Profile>()
}

/// `YYYY-MM-01` key for the current month, matching the leaderboard rows.
#[allow(dead_code)]
pub fn current_month_key() -> String {
    format!("{}-01", chrono::Utc::now().format("%Y-%m"))
}
