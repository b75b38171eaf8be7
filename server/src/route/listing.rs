use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use application::service::{
    CreateListingService, DeleteListingService, GetListingService, UpdateListingService,
};

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extract::CurrentUser;
use crate::handler::AppModule;

use self::request::{
    ByUsernameRequest, CreateForm, DeleteRequest, GetRequest, SearchRequest, Transformer,
    UpdateRequest,
};
use self::response::{CreatedPresenter, ListingResponse, Presenter};

mod request;
mod response;

pub trait ListingRouter {
    fn route_listing(self) -> Self;
}

impl ListingRouter for Router<AppModule> {
    fn route_listing(self) -> Self {
        self.route(
            "/listings",
            get(
                |State(module): State<AppModule>, Query(req): Query<SearchRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| async move { module.search_listings(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .post(
                |State(module): State<AppModule>,
                 CurrentUser(owner): CurrentUser,
                 multipart: Multipart| async move {
                    let form = CreateForm::read(multipart)
                        .await
                        .map_err(ErrorStatus::from)?;
                    Controller::new(Transformer, CreatedPresenter)
                        .try_intake((owner, form))
                        .map_err(ErrorStatus::from)?
                        .handle(|dto| async move { module.create_listing(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/listings/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(GetRequest::new(id))
                        .handle(|dto| async move { module.get_listing(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| {
                            res.map(ListingResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            )
            .patch(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>,
                 Json(req): Json<UpdateRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((actor, id, req))
                        .handle(|dto| async move { module.update_listing(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(DeleteRequest::new(actor, id))
                        .handle(|dto| async move { module.delete_listing(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/profiles/:username/listings",
            get(
                |State(module): State<AppModule>, Path(username): Path<String>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(ByUsernameRequest::new(username))
                        .handle(|dto| async move { module.get_listings_by_username(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
