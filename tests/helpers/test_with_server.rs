#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        #[serial_test::serial]
        async fn $name() {
            use std::sync::Arc;
            use async_trait::async_trait;
            use axum_test::{TestServer, TestServerConfig};
            use timebank_server::database::client::{Database, DbConfig};
            use timebank_server::interfaces::send_email::SendEmailInterface;
            use timebank_server::middleware::mw_ctx::CtxState;
            use timebank_server::utils::jwt::JWT;

            struct MockEmailSender;

            #[async_trait]
            impl SendEmailInterface for MockEmailSender {
                async fn send(
                    &self,
                    _emails: Vec<String>,
                    _body: &str,
                    _subject: &str,
                ) -> Result<(), String> {
                    Ok(())
                }
            }

            let $ctx_state = {
                let db = Database::connect(DbConfig {
                    url: "mem://",
                    database: "test",
                    namespace: "test",
                    username: None,
                    password: None,
                })
                .await;
                timebank_server::init::run_migrations(&db)
                    .await
                    .expect("migrations run");
                Arc::new(CtxState {
                    db,
                    is_development: true,
                    jwt: JWT::new("secret".to_string(), chrono::Duration::days(1)),
                    login_code_ttl: chrono::Duration::minutes(5),
                    email_sender: Arc::new(MockEmailSender {}),
                    asana: None,
                })
            };

            let routes_all = timebank_server::init::main_router(&$ctx_state);

            let $server = TestServer::new_with_config(
                routes_all,
                TestServerConfig {
                    transport: None,
                    save_cookies: true,
                    expect_success_by_default: false,
                    restrict_requests_with_http_schema: false,
                    default_content_type: None,
                    default_scheme: None,
                },
            )
            .expect("Failed to create test server");

            (|| async $body)().await;
        }
    };
}
