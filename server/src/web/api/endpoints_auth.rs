use crate::auth_session::SessionToken;
use crate::data_store::StoreError;
use crate::web::api::APIError;
use crate::web::AppState;
use actix_web::{post, web, HttpResponse, Responder};
use log::info;
use roomres_api_types::{Credentials, LoginResponse, RegisterResponse};

#[post("/register")]
async fn register(
    body: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let credentials = body.into_inner();
    let email = credentials.email.trim().to_owned();
    let user_id = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        Ok(store.register_user(&email, &credentials.password)?)
    })
    .await??;
    info!("Registered new user account {}", user_id);

    Ok(HttpResponse::Created().json(RegisterResponse { id: user_id }))
}

#[post("/login")]
async fn login(
    body: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<impl Responder, APIError> {
    let credentials = body.into_inner();
    let store = state.store.clone();
    let user = web::block(move || -> Result<_, APIError> {
        let mut store = store.get_facade()?;
        store
            .authenticate_with_password(credentials.email.trim(), &credentials.password)
            .map_err(|e| match e {
                StoreError::NotExisting => APIError::AuthenticationFailed,
                e => e.into(),
            })
    })
    .await??;

    let session_token = SessionToken::new(user.id);
    Ok(web::Json(LoginResponse {
        token: session_token.as_string(&state.secret),
        user: user.into(),
    }))
}
