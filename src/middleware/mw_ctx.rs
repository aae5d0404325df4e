use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use chrono::Duration;

use crate::config::{AppConfig, AsanaConfig};
use crate::database::client::Database;
use crate::interfaces::send_email::SendEmailInterface;
use crate::utils::email_sender::EmailSender;
use crate::utils::jwt::JWT;

pub struct CtxState {
    pub db: Database,
    pub is_development: bool,
    pub jwt: JWT,
    pub login_code_ttl: Duration,
    pub email_sender: Arc<dyn SendEmailInterface + Send + Sync>,
    pub asana: Option<AsanaConfig>,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CtxState")
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig) -> Arc<CtxState> {
    let ctx_state = CtxState {
        db,
        is_development: config.is_development,
        jwt: JWT::new(config.jwt_secret.clone(), Duration::days(7)),
        login_code_ttl: Duration::minutes(config.login_code_ttl as i64),
        email_sender: Arc::new(EmailSender::new(
            &config.sendgrid_api_key,
            &config.sendgrid_api_url,
            &config.no_reply_email,
        )),
        asana: config.asana.clone(),
    };
    Arc::new(ctx_state)
}

pub const JWT_KEY: &str = "jwt";
