use chrono::Utc;
use rand::Rng;

use crate::entities::user_auth::login_code_entity::LoginCodeDbService;
use crate::entities::user_auth::profile_entity::{Profile, ProfileDbService};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;

const MAX_FAILED_ATTEMPTS: u8 = 3;

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// Start a passwordless login: look the address up among invited profiles
/// and mail a one-time code. Unknown or deactivated addresses fail the same
/// way a wrong code does, so the endpoint cannot be used to probe emails.
pub async fn start_login(state: &CtxState, ctx: &Ctx, email: &str) -> CtxResult<()> {
    let email = email.trim().to_lowercase();
    let profile_service = ProfileDbService {
        db: &state.db.client,
        ctx,
    };
    let profile = profile_service
        .get_by_email(&email)
        .await
        .map_err(|_| ctx.to_ctx_error(AppError::AuthenticationFail))?;
    if !profile.active {
        return Err(ctx.to_ctx_error(AppError::AuthenticationFail));
    }

    let user = profile
        .id
        .ok_or_else(|| ctx.to_ctx_error(AppError::AuthenticationFail))?;
    let code = generate_code();
    LoginCodeDbService {
        db: &state.db.client,
        ctx,
    }
    .create(user, email.clone(), code.clone())
    .await?;

    let body = format!(
        "Your login code is {code}. It expires in {} minutes.",
        state.login_code_ttl.num_minutes()
    );
    state
        .email_sender
        .send(vec![email], &body, "Your login code")
        .await
        .map_err(|err| {
            ctx.to_ctx_error(AppError::Generic {
                description: format!("sending login code failed: {err}"),
            })
        })?;

    Ok(())
}

/// Exchange a mailed code for a signed JWT. Codes expire after the
/// configured TTL and burn out after [`MAX_FAILED_ATTEMPTS`] wrong guesses.
pub async fn verify_login(
    state: &CtxState,
    ctx: &Ctx,
    email: &str,
    code: &str,
) -> CtxResult<(Profile, String)> {
    let email = email.trim().to_lowercase();
    let code_service = LoginCodeDbService {
        db: &state.db.client,
        ctx,
    };

    let login_code = code_service
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ctx.to_ctx_error(AppError::AuthenticationFail))?;

    if Utc::now() - login_code.r_created > state.login_code_ttl {
        code_service.delete(login_code.id).await?;
        return Err(ctx.to_ctx_error(AppError::AuthenticationFail));
    }

    if login_code.failed_attempts >= MAX_FAILED_ATTEMPTS {
        code_service.delete(login_code.id).await?;
        return Err(ctx.to_ctx_error(AppError::AuthenticationFail));
    }

    if login_code.code != code.trim() {
        code_service.increase_attempts(login_code.id).await?;
        return Err(ctx.to_ctx_error(AppError::AuthenticationFail));
    }

    code_service.delete(login_code.id).await?;

    let profile_service = ProfileDbService {
        db: &state.db.client,
        ctx,
    };
    let profile = profile_service
        .get(crate::middleware::utils::db_utils::IdentIdName::Id(
            login_code.user.clone(),
        ))
        .await?;

    let token = state
        .jwt
        .create_by_login(&login_code.user.to_raw())
        .map_err(|err| {
            ctx.to_ctx_error(AppError::Generic {
                description: format!("token creation failed: {err}"),
            })
        })?;

    Ok((profile, token))
}
