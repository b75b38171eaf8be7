use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use application::service::{AuthenticateService, SignInService, SignOutService, SignUpService};

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extract::BearerToken;
use crate::handler::AppModule;

use self::request::{SessionRequest, SignInRequest, SignOutRequest, SignUpRequest, Transformer};
use self::response::Presenter;

mod request;
mod response;

pub trait AuthRouter {
    fn route_auth(self) -> Self;
}

impl AuthRouter for Router<AppModule> {
    fn route_auth(self) -> Self {
        self.route(
            "/auth/sign-up",
            post(
                |State(module): State<AppModule>, Json(req): Json<SignUpRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.sign_up(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/auth/sign-in",
            post(
                |State(module): State<AppModule>, Json(req): Json<SignInRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.sign_in(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/auth/sign-out",
            post(
                |State(module): State<AppModule>, BearerToken(token): BearerToken| async move {
                    Controller::new(Transformer, Presenter)
                        .try_intake(SignOutRequest::new(token))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.sign_out(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/auth/session",
            get(
                |State(module): State<AppModule>, BearerToken(token): BearerToken| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(SessionRequest::new(token))
                        .handle(|token| async move { module.auth_context(token).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
