use dotenvy;

/// Credentials for the third-party project-management API. All three values
/// are required for the integration to be enabled; anything missing leaves
/// the feature disabled instead of failing startup.
#[derive(Debug, Clone)]
pub struct AsanaConfig {
    pub pat: String,
    pub workspace_gid: String,
    pub project_gid: String,
    pub api_url: String,
}

#[derive(Debug)]
pub struct AppConfig {
    pub db_namespace: String,
    pub db_database: String,
    pub db_password: Option<String>,
    pub db_username: Option<String>,
    pub db_url: String,
    pub jwt_secret: String,
    pub login_code_ttl: u8,
    pub is_development: bool,
    pub sendgrid_api_key: String,
    pub sendgrid_api_url: String,
    pub no_reply_email: String,
    pub asana: Option<AsanaConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let db_namespace = std::env::var("DB_NAMESPACE").unwrap_or("namespace".to_string());
        let db_database = std::env::var("DB_DATABASE").unwrap_or("database".to_string());
        let db_password = std::env::var("DB_PASSWORD").ok();
        let db_username = std::env::var("DB_USERNAME").ok();
        let db_url = std::env::var("DB_URL").expect("Missing DB_URL in env");

        let jwt_secret = std::env::var("JWT_SECRET").expect("Missing JWT_SECRET in env");

        let login_code_ttl = std::env::var("LOGIN_CODE_TIME_TO_LIVE")
            .unwrap_or("5".to_string())
            .parse::<u8>()
            .expect("LOGIN_CODE_TIME_TO_LIVE must be number");

        let is_development = std::env::var("DEVELOPMENT")
            .expect("set DEVELOPMENT env var")
            .eq("true");

        let sendgrid_api_key = std::env::var("SENDGRID_API_KEY").unwrap_or_default();
        let no_reply_email = std::env::var("NO_REPLY_EMAIL").unwrap_or_default();
        let sendgrid_api_url = std::env::var("SENDGRID_API_URL")
            .unwrap_or("https://api.sendgrid.com/v3/mail/send".to_string());

        let asana = match (
            std::env::var("ASANA_PAT").ok(),
            std::env::var("ASANA_WORKSPACE_GID").ok(),
            std::env::var("ASANA_PROJECT_GID").ok(),
        ) {
            (Some(pat), Some(workspace_gid), Some(project_gid))
                if !pat.is_empty() && !workspace_gid.is_empty() && !project_gid.is_empty() =>
            {
                Some(AsanaConfig {
                    pat,
                    workspace_gid,
                    project_gid,
                    api_url: std::env::var("ASANA_API_URL")
                        .unwrap_or("https://app.asana.com/api/1.0".to_string()),
                })
            }
            _ => None,
        };

        Self {
            db_namespace,
            db_database,
            db_password,
            db_username,
            db_url,
            jwt_secret,
            login_code_ttl,
            is_development,
            sendgrid_api_key,
            sendgrid_api_url,
            no_reply_email,
            asana,
        }
    }
}
