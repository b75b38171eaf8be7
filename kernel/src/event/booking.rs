use time::Date;

use crate::entity::{Booking, BookingParty, BookingStatus, UserId};
use crate::event::Applier;
use crate::{rejected, KernelError};

/// Who is driving a change. The completion sweep acts as `System`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    User(UserId),
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingEvent {
    Approve,
    Decline,
    Cancel,
    Complete,
    Hide { party: BookingParty },
}

impl BookingEvent {
    /// Checks that `actor` may apply this event to `booking` on `today`.
    pub fn check(
        &self,
        booking: &Booking,
        owner: &UserId,
        actor: &Actor,
        today: &Date,
    ) -> error_stack::Result<(), KernelError> {
        let party = match actor {
            Actor::User(user) => booking.party_of(user, owner),
            Actor::System => None,
        };
        let status = booking.status();
        let period = booking.period();
        match self {
            BookingEvent::Approve | BookingEvent::Decline => {
                if party != Some(BookingParty::Owner) {
                    return Err(rejected(
                        KernelError::Forbidden,
                        "Only the listing owner can respond to this request",
                    ));
                }
                if status != &BookingStatus::Pending {
                    return Err(rejected(
                        KernelError::Validation,
                        "Only pending requests can be approved or declined",
                    ));
                }
                if period.has_passed_start(today) {
                    return Err(rejected(
                        KernelError::Validation,
                        "The rental period has already started",
                    ));
                }
            }
            BookingEvent::Cancel => {
                if party.is_none() {
                    return Err(rejected(
                        KernelError::Forbidden,
                        "You are not part of this booking",
                    ));
                }
                if status != &BookingStatus::Approved {
                    return Err(rejected(
                        KernelError::Validation,
                        "Only approved bookings can be cancelled",
                    ));
                }
                if period.has_started(today) {
                    return Err(rejected(
                        KernelError::Validation,
                        "Bookings can only be cancelled before the start date",
                    ));
                }
            }
            BookingEvent::Complete => {
                if actor != &Actor::System {
                    return Err(rejected(
                        KernelError::Forbidden,
                        "Bookings are completed automatically",
                    ));
                }
                if status != &BookingStatus::Approved || !period.has_ended(today) {
                    return Err(rejected(
                        KernelError::Validation,
                        "Only finished approved bookings can be completed",
                    ));
                }
            }
            BookingEvent::Hide { party: target } => {
                if party.as_ref() != Some(target) {
                    return Err(rejected(
                        KernelError::Forbidden,
                        "You are not part of this booking",
                    ));
                }
                if !status.is_removable() {
                    return Err(rejected(
                        KernelError::Validation,
                        "Only declined or cancelled bookings can be removed",
                    ));
                }
            }
        }
        Ok(())
    }

    fn next_status(&self) -> Option<BookingStatus> {
        match self {
            BookingEvent::Approve => Some(BookingStatus::Approved),
            BookingEvent::Decline => Some(BookingStatus::Declined),
            BookingEvent::Cancel => Some(BookingStatus::Cancelled),
            BookingEvent::Complete => Some(BookingStatus::Completed),
            BookingEvent::Hide { .. } => None,
        }
    }
}

/// Checks that `actor` may hard-delete `booking`.
pub fn check_withdrawal(booking: &Booking, actor: &UserId) -> error_stack::Result<(), KernelError> {
    if booking.borrower_id() != actor {
        return Err(rejected(
            KernelError::Forbidden,
            "Only the borrower can withdraw this request",
        ));
    }
    if booking.status() != &BookingStatus::Pending {
        return Err(rejected(
            KernelError::Validation,
            "Only pending requests can be withdrawn",
        ));
    }
    Ok(())
}

impl Applier<BookingEvent> for Booking {
    fn apply(&mut self, event: BookingEvent) {
        let next = event.next_status();
        self.substitute(|booking| {
            let mut changed = false;
            if let Some(next) = next {
                if booking.status.can_transition_to(&next) {
                    *booking.status = next;
                    changed = true;
                }
            }
            if let BookingEvent::Hide { party } = &event {
                let before = *booking.visibility;
                booking.visibility.hide(party);
                changed |= *booking.visibility != before;
            }
            if changed {
                *booking.version = booking.version.next();
            }
        });
    }
}

#[cfg(test)]
mod test {
    use time::macros::date;
    use uuid::Uuid;

    use crate::entity::{
        Booking, BookingId, BookingParty, BookingPeriod, BookingStatus, ListingId, PricePerDay,
        UserId,
    };
    use crate::event::{check_withdrawal, Actor, Applier, BookingEvent};
    use crate::KernelError;

    struct Fixture {
        owner: UserId,
        borrower: UserId,
        stranger: UserId,
        booking: Booking,
    }

    fn fixture() -> Fixture {
        let borrower = UserId::new(Uuid::new_v4());
        let booking = Booking::request(
            BookingId::new(Uuid::new_v4()),
            ListingId::new(Uuid::new_v4()),
            borrower.clone(),
            BookingPeriod::new(date!(2024 - 03 - 10), date!(2024 - 03 - 12)).unwrap(),
            PricePerDay::new(100),
        )
        .unwrap();
        Fixture {
            owner: UserId::new(Uuid::new_v4()),
            borrower,
            stranger: UserId::new(Uuid::new_v4()),
            booking,
        }
    }

    fn forbidden(result: error_stack::Result<(), KernelError>) -> bool {
        matches!(result, Err(report) if matches!(report.current_context(), KernelError::Forbidden))
    }

    fn invalid(result: error_stack::Result<(), KernelError>) -> bool {
        matches!(result, Err(report) if matches!(report.current_context(), KernelError::Validation))
    }

    #[test]
    fn only_owner_approves_pending() {
        let Fixture {
            owner,
            borrower,
            stranger,
            mut booking,
        } = fixture();
        let today = date!(2024 - 03 - 01);
        let approve = BookingEvent::Approve;
        assert!(forbidden(approve.check(&booking, &owner, &Actor::User(borrower), &today)));
        assert!(forbidden(approve.check(&booking, &owner, &Actor::User(stranger), &today)));
        assert!(forbidden(approve.check(&booking, &owner, &Actor::System, &today)));
        assert!(approve
            .check(&booking, &owner, &Actor::User(owner.clone()), &today)
            .is_ok());

        booking.apply(approve.clone());
        assert_eq!(booking.status(), &BookingStatus::Approved);
        assert_eq!(*booking.version().as_ref(), 1);
        assert!(invalid(approve.check(
            &booking,
            &owner,
            &Actor::User(owner.clone()),
            &today
        )));
        assert!(invalid(BookingEvent::Decline.check(
            &booking,
            &owner,
            &Actor::User(owner.clone()),
            &today
        )));
    }

    #[test]
    fn approval_closes_once_start_passed() {
        let Fixture { owner, booking, .. } = fixture();
        let actor = Actor::User(owner.clone());
        assert!(BookingEvent::Approve
            .check(&booking, &owner, &actor, &date!(2024 - 03 - 10))
            .is_ok());
        assert!(invalid(BookingEvent::Approve.check(
            &booking,
            &owner,
            &actor,
            &date!(2024 - 03 - 11)
        )));
    }

    #[test]
    fn either_party_cancels_approved_before_start() {
        let Fixture {
            owner,
            borrower,
            stranger,
            mut booking,
        } = fixture();
        let today = date!(2024 - 03 - 09);
        assert!(invalid(BookingEvent::Cancel.check(
            &booking,
            &owner,
            &Actor::User(borrower.clone()),
            &today
        )));
        booking.apply(BookingEvent::Approve);

        for actor in [owner.clone(), borrower.clone()] {
            assert!(BookingEvent::Cancel
                .check(&booking, &owner, &Actor::User(actor), &today)
                .is_ok());
        }
        assert!(forbidden(BookingEvent::Cancel.check(
            &booking,
            &owner,
            &Actor::User(stranger),
            &today
        )));
        assert!(invalid(BookingEvent::Cancel.check(
            &booking,
            &owner,
            &Actor::User(borrower),
            &date!(2024 - 03 - 10)
        )));
    }

    #[test]
    fn completion_is_system_only_after_end() {
        let Fixture {
            owner, mut booking, ..
        } = fixture();
        booking.apply(BookingEvent::Approve);
        let after = date!(2024 - 03 - 13);
        assert!(forbidden(BookingEvent::Complete.check(
            &booking,
            &owner,
            &Actor::User(owner.clone()),
            &after
        )));
        assert!(invalid(BookingEvent::Complete.check(
            &booking,
            &owner,
            &Actor::System,
            &date!(2024 - 03 - 12)
        )));
        assert!(BookingEvent::Complete
            .check(&booking, &owner, &Actor::System, &after)
            .is_ok());
        booking.apply(BookingEvent::Complete);
        assert_eq!(booking.status(), &BookingStatus::Completed);
    }

    #[test]
    fn hide_requires_removable_status_and_matching_party() {
        let Fixture {
            owner,
            borrower,
            mut booking,
            ..
        } = fixture();
        let today = date!(2024 - 03 - 01);
        let hide = BookingEvent::Hide {
            party: BookingParty::Borrower,
        };
        assert!(invalid(hide.check(
            &booking,
            &owner,
            &Actor::User(borrower.clone()),
            &today
        )));
        booking.apply(BookingEvent::Decline);
        assert!(forbidden(hide.check(
            &booking,
            &owner,
            &Actor::User(owner.clone()),
            &today
        )));
        assert!(hide
            .check(&booking, &owner, &Actor::User(borrower), &today)
            .is_ok());
        booking.apply(hide);
        assert_eq!(booking.status(), &BookingStatus::Declined);
        assert!(booking.visibility().borrower_deleted());
        assert!(!booking.visibility().owner_deleted());
    }

    #[test]
    fn withdrawal_is_borrower_only_while_pending() {
        let Fixture {
            owner,
            borrower,
            mut booking,
            ..
        } = fixture();
        assert!(forbidden(check_withdrawal(&booking, &owner)));
        assert!(check_withdrawal(&booking, &borrower).is_ok());
        booking.apply(BookingEvent::Approve);
        assert!(invalid(check_withdrawal(&booking, &borrower)));
    }

    #[test]
    fn invalid_transition_leaves_status() {
        let Fixture { mut booking, .. } = fixture();
        let version = booking.version().clone();
        booking.apply(BookingEvent::Complete);
        assert_eq!(booking.status(), &BookingStatus::Pending);
        assert_eq!(booking.version(), &version);
    }

    #[test]
    fn hiding_twice_bumps_once() {
        let Fixture { mut booking, .. } = fixture();
        let version = booking.version().clone();
        booking.apply(BookingEvent::Hide {
            party: BookingParty::Borrower,
        });
        let hidden = booking.version().clone();
        assert_ne!(hidden, version);
        booking.apply(BookingEvent::Hide {
            party: BookingParty::Borrower,
        });
        assert_eq!(booking.version(), &hidden);
    }
}
