//! Projection between internal states and persisted public statuses.
//!
//! [`project`] is total and deterministic. [`rehydrate`] is its lossy inverse:
//! several internal states share a public status (`planning` and `coding` both
//! project to `in_progress`), so each public status maps back to exactly one
//! canonical internal state. Records written by any version therefore always
//! reload to the same starting state.

use super::{InternalState, PublicStatus, ReviewReason, StatusRecord, TaskSnapshot};

/// Projects an internal state and its review reason to a public record.
///
/// The review reason is only meaningful for [`InternalState::HumanReview`];
/// every other state implies its own reason or none.
#[must_use]
pub const fn project(state: InternalState, review_reason: Option<ReviewReason>) -> StatusRecord {
    match state {
        InternalState::Backlog => StatusRecord::new(PublicStatus::Backlog),
        InternalState::Planning | InternalState::Coding => {
            StatusRecord::new(PublicStatus::InProgress)
        }
        InternalState::PlanReview => {
            StatusRecord::with_reason(PublicStatus::HumanReview, ReviewReason::PlanReview)
        }
        InternalState::QaReview | InternalState::QaFixing => {
            StatusRecord::new(PublicStatus::AiReview)
        }
        InternalState::HumanReview => StatusRecord {
            status: PublicStatus::HumanReview,
            review_reason,
        },
        InternalState::Error => {
            StatusRecord::with_reason(PublicStatus::HumanReview, ReviewReason::Errors)
        }
        InternalState::CreatingPr => {
            StatusRecord::with_reason(PublicStatus::HumanReview, ReviewReason::Completed)
        }
        InternalState::PrCreated => StatusRecord::new(PublicStatus::PrCreated),
        InternalState::Done => StatusRecord::new(PublicStatus::Done),
    }
}

/// Projects a full machine snapshot.
#[must_use]
pub const fn project_snapshot(snapshot: &TaskSnapshot) -> StatusRecord {
    project(snapshot.state(), snapshot.review_reason())
}

/// Picks the canonical internal state for a persisted public status.
#[must_use]
pub const fn rehydrate(status: PublicStatus, review_reason: Option<ReviewReason>) -> InternalState {
    match (status, review_reason) {
        (PublicStatus::Backlog | PublicStatus::Queue, _) => InternalState::Backlog,
        (PublicStatus::InProgress, _) => InternalState::Coding,
        (PublicStatus::AiReview, _) => InternalState::QaReview,
        (PublicStatus::HumanReview, Some(ReviewReason::PlanReview)) => InternalState::PlanReview,
        (PublicStatus::HumanReview, Some(ReviewReason::Errors)) | (PublicStatus::Error, _) => {
            InternalState::Error
        }
        (PublicStatus::HumanReview, Some(ReviewReason::Completed)) => InternalState::CreatingPr,
        (PublicStatus::HumanReview, _) => InternalState::HumanReview,
        (PublicStatus::PrCreated, _) => InternalState::PrCreated,
        (PublicStatus::Done, _) => InternalState::Done,
    }
}

/// Rebuilds a starting snapshot from a persisted record.
///
/// A rehydrated `human_review` task keeps its review reason; other states
/// start without attached context.
#[must_use]
pub fn rehydrate_snapshot(record: StatusRecord) -> TaskSnapshot {
    let state = rehydrate(record.status, record.review_reason);
    let reason = match state {
        InternalState::HumanReview => record.review_reason,
        _ => None,
    };
    TaskSnapshot::at(state).with_review_reason(reason)
}
