use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{LoginReqDto, RecoverReqDto, ResetPasswordDto, TokenType, UserSql},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// auth end points

/// Minimum accepted on password reset, matching the sign-up rules of the
/// hosted identity provider this service replaced.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

// #[post("/login")]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching user from database");

    // 2️⃣ Fetch user
    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, email, password, role_id, employee_id
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(user.email.trim())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 3️⃣ Verify password
    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified");

    // 4️⃣ Generate access token
    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    // 5️⃣ Generate refresh token
    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    // 6️⃣ Store refresh token
    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 7️⃣ Update last_login_at (non-fatal)
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

// #[post("/refresh")]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // 🔍 find refresh token in DB
    let record = match sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Database error while fetching refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (record_id, record_user_id) = match record {
        Some((id, user_id, revoked)) if !revoked => (id, user_id),
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // 🔥 revoke old refresh token
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 🔄 issue new refresh token
    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record_user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 🎫 new access token
    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

// #[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    // 1️⃣ extract Authorization header
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    // 2️⃣ verify JWT
    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // 3️⃣ only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // 4️⃣ revoke refresh token (idempotent)
    let _ = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = 1
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    // 5️⃣ success (even if token didn't exist)
    HttpResponse::NoContent().finish()
}

// #[post("/recover")]
#[instrument(name = "auth_recover", skip_all)]
pub async fn recover(
    body: web::Json<RecoverReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let email = body.email.trim();
    if email.is_empty() {
        return HttpResponse::BadRequest().body("Email required");
    }

    let user_id = match sqlx::query_as::<_, (u64,)>("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some((id,))) => Some(id),
        Ok(None) => None,
        Err(e) => {
            error!(error = %e, "Database error while looking up recovery email");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Unknown addresses get the same acknowledgement as known ones.
    let Some(user_id) = user_id else {
        info!("Recovery requested for unknown email");
        return HttpResponse::NoContent().finish();
    };

    let token = Uuid::new_v4().to_string();
    let expires_at = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
        + config.recovery_token_ttl as i64;

    // The mailer delivers from this row; the token never travels in the
    // HTTP response.
    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO recovery_tokens (user_id, token, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(user_id)
    .bind(&token)
    .bind(expires_at)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, user_id, "Failed to store recovery token");
        return HttpResponse::InternalServerError().finish();
    }

    info!(user_id, "Recovery token issued");
    HttpResponse::NoContent().finish()
}

// #[post("/reset-password")]
#[instrument(name = "auth_reset_password", skip_all)]
pub async fn reset_password(
    body: web::Json<ResetPasswordDto>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    // 1️⃣ password rules
    if body.new_password.len() < MIN_PASSWORD_LEN {
        return HttpResponse::BadRequest().json(json!({
            "message": "Password must be at least 6 characters"
        }));
    }

    // 2️⃣ redeem the recovery token (single use, TTL-bounded)
    let row = match sqlx::query_as::<_, (u64, u64)>(
        r#"
        SELECT id, user_id
        FROM recovery_tokens
        WHERE token = ?
        AND used = 0
        AND expires_at > NOW()
        "#,
    )
    .bind(&body.token)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Database error while fetching recovery token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let Some((token_id, user_id)) = row else {
        info!("Invalid or expired recovery token presented");
        return HttpResponse::Unauthorized().json(json!({
            "message": "Invalid or expired recovery token"
        }));
    };

    // 3️⃣ rehash and store
    let hashed = hash_password(&body.new_password);

    if let Err(e) = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&hashed)
        .bind(user_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, user_id, "Failed to update password");
        return HttpResponse::InternalServerError().finish();
    }

    // 4️⃣ consume the token
    if let Err(e) = sqlx::query("UPDATE recovery_tokens SET used = 1 WHERE id = ?")
        .bind(token_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, user_id, "Failed to consume recovery token");
        return HttpResponse::InternalServerError().finish();
    }

    // 5️⃣ recovery never leaves a session behind: sign out everywhere
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ?")
        .bind(user_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, user_id, "Failed to revoke sessions after reset");
        return HttpResponse::InternalServerError().finish();
    }

    info!(user_id, "Password reset completed");
    HttpResponse::Ok().json(json!({
        "message": "Password updated, sign in again"
    }))
}
