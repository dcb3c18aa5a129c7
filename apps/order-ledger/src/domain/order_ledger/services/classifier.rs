//! Order Update Classifier
//!
//! Maps the venue's `(volume_left, status)` view of an order onto exactly
//! one ledger transition. Rules are applied in priority order:
//!
//! | volume_left                  | venue status | result          |
//! |------------------------------|--------------|-----------------|
//! | `0`                          | FINISHED     | FULL_FILL       |
//! | `0`                          | ALIVE        | invalid         |
//! | `0 < left < original`        | FINISHED     | PARTIAL_CANCEL  |
//! | `0 < left < original`        | ALIVE        | PARTIAL_FILL    |
//! | `left == original`           | FINISHED     | FULL_CANCEL     |
//! | `left == original`           | ALIVE        | NEW             |

use crate::domain::order_ledger::errors::LedgerError;
use crate::domain::order_ledger::value_objects::{OrderStatus, OrderUpdate, VenueStatus};

/// How much of the order a fill covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillKind {
    /// Some volume remains working.
    Partial,
    /// Nothing remains.
    Full,
}

/// How much of the order a cancel removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelKind {
    /// Part of the order had filled first.
    Partial,
    /// Nothing had filled.
    Full,
}

/// Classified order update, computed once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// First sighting or re-announcement of a working order.
    New,
    /// Some or all of the order traded.
    Fill(FillKind),
    /// The order finished with volume left.
    Cancel(CancelKind),
}

impl Classification {
    /// Ledger status an order takes after this transition.
    #[must_use]
    pub const fn resulting_status(&self) -> OrderStatus {
        match self {
            Self::New => OrderStatus::Alive,
            Self::Fill(FillKind::Partial) => OrderStatus::PartialFill,
            Self::Fill(FillKind::Full) => OrderStatus::FullFill,
            Self::Cancel(CancelKind::Partial) => OrderStatus::PartialCancel,
            Self::Cancel(CancelKind::Full) => OrderStatus::FullCancel,
        }
    }

    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Fill(FillKind::Partial) => "partial_fill",
            Self::Fill(FillKind::Full) => "full_fill",
            Self::Cancel(CancelKind::Partial) => "partial_cancel",
            Self::Cancel(CancelKind::Full) => "full_cancel",
        }
    }
}

/// Classify an order update.
///
/// # Errors
///
/// Returns a `LedgerError` invariant violation when the update matches no
/// rule: nothing left while still alive, more left than ordered, or an
/// order of zero volume.
pub fn classify(update: &OrderUpdate) -> Result<Classification, LedgerError> {
    let left = update.volume_left;
    let original = update.volume_original;

    if original == 0 {
        return Err(LedgerError::ZeroOriginal {
            order_id: update.order_id.clone(),
        });
    }
    if left > original {
        return Err(LedgerError::LeftExceedsOriginal {
            order_id: update.order_id.clone(),
            volume_left: left,
            volume_original: original,
        });
    }

    match (left, update.status) {
        (0, VenueStatus::Finished) => Ok(Classification::Fill(FillKind::Full)),
        (0, VenueStatus::Alive) => Err(LedgerError::ZeroLeftWhileAlive {
            order_id: update.order_id.clone(),
        }),
        (l, VenueStatus::Finished) if l < original => {
            Ok(Classification::Cancel(CancelKind::Partial))
        }
        (l, VenueStatus::Alive) if l < original => Ok(Classification::Fill(FillKind::Partial)),
        (_, VenueStatus::Finished) => Ok(Classification::Cancel(CancelKind::Full)),
        (_, VenueStatus::Alive) => Ok(Classification::New),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_ledger::value_objects::{Direction, Offset};
    use crate::domain::shared::{OrderId, Price, Timestamp};
    use test_case::test_case;

    fn update(original: u64, left: u64, status: VenueStatus) -> OrderUpdate {
        OrderUpdate {
            order_id: OrderId::new("O1"),
            direction: Direction::Buy,
            offset: Offset::Open,
            limit_price: Price::from_i64(2380),
            volume_original: original,
            volume_left: left,
            status,
            insert_time: Timestamp::now(),
            trades: vec![],
        }
    }

    #[test_case(5, 0, VenueStatus::Finished, Classification::Fill(FillKind::Full) ; "nothing left finished is full fill")]
    #[test_case(5, 2, VenueStatus::Finished, Classification::Cancel(CancelKind::Partial) ; "some left finished is partial cancel")]
    #[test_case(5, 2, VenueStatus::Alive, Classification::Fill(FillKind::Partial) ; "some left alive is partial fill")]
    #[test_case(5, 5, VenueStatus::Finished, Classification::Cancel(CancelKind::Full) ; "all left finished is full cancel")]
    #[test_case(5, 5, VenueStatus::Alive, Classification::New ; "all left alive is new")]
    #[test_case(1, 0, VenueStatus::Finished, Classification::Fill(FillKind::Full) ; "single lot full fill")]
    #[test_case(1, 1, VenueStatus::Alive, Classification::New ; "single lot new")]
    fn classifies(original: u64, left: u64, status: VenueStatus, expected: Classification) {
        assert_eq!(classify(&update(original, left, status)).unwrap(), expected);
    }

    #[test]
    fn zero_left_while_alive_is_rejected() {
        let err = classify(&update(5, 0, VenueStatus::Alive)).unwrap_err();
        assert!(matches!(err, LedgerError::ZeroLeftWhileAlive { .. }));
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn left_above_original_is_rejected() {
        let err = classify(&update(5, 6, VenueStatus::Alive)).unwrap_err();
        assert!(matches!(err, LedgerError::LeftExceedsOriginal { .. }));
    }

    #[test]
    fn zero_original_is_rejected() {
        let err = classify(&update(0, 0, VenueStatus::Finished)).unwrap_err();
        assert!(matches!(err, LedgerError::ZeroOriginal { .. }));
    }

    #[test]
    fn resulting_status_follows_classification() {
        assert_eq!(Classification::New.resulting_status(), OrderStatus::Alive);
        assert_eq!(
            Classification::Cancel(CancelKind::Partial).resulting_status(),
            OrderStatus::PartialCancel
        );
        assert_eq!(Classification::Fill(FillKind::Full).label(), "full_fill");
    }
}
