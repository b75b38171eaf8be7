use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use application::service::{
    CreateBookingService, DeletePendingBookingService, GetBookingService,
    UpdateBookingStatusService,
};
use application::transfer::BookingAction;

use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::extract::CurrentUser;
use crate::handler::AppModule;

use self::request::{
    CreateRequest, DeleteRequest, GetRequest, ListingBookingsRequest, OwnBookingsRequest,
    OwnedListingBookingsRequest, PendingRequest, TransitionRequest, Transformer,
    UnavailableDaysRequest,
};
use self::response::{CreatedPresenter, Presenter};

mod request;
mod response;

async fn transition(
    module: AppModule,
    actor: Uuid,
    id: Uuid,
    action: BookingAction,
) -> Result<response::BookingResponse, ErrorStatus> {
    Controller::new(Transformer, Presenter)
        .intake(TransitionRequest::new(actor, id))
        .handle(|dto| async move { module.update_booking_status(dto, action).await })
        .await
        .map_err(ErrorStatus::from)
}

pub trait BookingRouter {
    fn route_booking(self) -> Self;
}

impl BookingRouter for Router<AppModule> {
    fn route_booking(self) -> Self {
        self.route(
            "/bookings",
            post(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Json(req): Json<CreateRequest>| async move {
                    Controller::new(Transformer, CreatedPresenter)
                        .intake((actor, req))
                        .handle(|dto| async move { module.create_booking(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/bookings/:id",
            get(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(GetRequest::new(actor, id))
                        .handle(|dto| async move { module.get_booking(dto).await })
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
                        .handle(|dto| async move { module.delete_pending_booking(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/bookings/:id/approve",
            post(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    transition(module, actor, id, BookingAction::Approve).await
                },
            ),
        )
        .route(
            "/bookings/:id/decline",
            post(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    transition(module, actor, id, BookingAction::Decline).await
                },
            ),
        )
        .route(
            "/bookings/:id/cancel",
            post(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    transition(module, actor, id, BookingAction::Cancel).await
                },
            ),
        )
        .route(
            "/bookings/:id/remove",
            post(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    transition(module, actor, id, BookingAction::Remove).await
                },
            ),
        )
        .route(
            "/listings/:id/bookings",
            get(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(OwnedListingBookingsRequest::new(actor, id))
                        .handle(|dto| async move { module.get_bookings_by_listing(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/listings/:id/bookings/approved",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(ListingBookingsRequest::new(id))
                        .handle(|dto| async move {
                            module.get_approved_bookings_by_listing(dto).await
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/listings/:id/bookings/pending",
            get(
                |State(module): State<AppModule>,
                 CurrentUser(actor): CurrentUser,
                 Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(PendingRequest::new(actor, id))
                        .handle(|dto| async move {
                            module.get_pending_booking_for_listing(dto).await
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/listings/:id/unavailable-days",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(UnavailableDaysRequest::new(id))
                        .handle(|dto| async move { module.get_unavailable_days(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/me/bookings",
            get(
                |State(module): State<AppModule>, CurrentUser(actor): CurrentUser| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(OwnBookingsRequest::new(actor))
                        .handle(|dto| async move { module.get_bookings_as_borrower(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/me/requests",
            get(
                |State(module): State<AppModule>, CurrentUser(actor): CurrentUser| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(OwnBookingsRequest::new(actor))
                        .handle(|dto| async move { module.get_bookings_as_owner(dto).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
