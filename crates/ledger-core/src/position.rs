//! Allocation of the next free position in an account's log.

use crate::{Error, Result, event::Event};

/// The position the next event for this account should be written at.
///
/// Advisory only. Two writers can compute the same value; the store's
/// create-if-absent append decides which one wins, and the loser must reload
/// and try again.
pub fn next_position(events: &[Event]) -> Result<u64> {
  match events.iter().map(|e| e.position).max() {
    None => Ok(0),
    Some(last) => last.checked_add(1).ok_or_else(|| {
      Error::internal(format!("position {last} has no successor"), "failed to process the data")
    }),
  }
}

/// The first place where `events`, sorted by position, stop counting up from
/// 0 as `(expected, found)`. `None` for a gapless log.
pub fn first_gap(events: &[Event]) -> Option<(u64, u64)> {
  (0u64..)
    .zip(events)
    .find(|(expected, e)| e.position != *expected)
    .map(|(expected, e)| (expected, e.position))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    ErrorKind,
    event::{AccountId, EventKind},
  };

  fn at(position: u64) -> Event {
    Event::new(
      AccountId::parse("a").unwrap(),
      position,
      EventKind::MoneyCredited { value: 1.0 },
    )
  }

  #[test]
  fn empty_log_starts_at_zero() {
    assert_eq!(next_position(&[]).unwrap(), 0);
  }

  #[test]
  fn follows_the_highest_position() {
    let events: Vec<_> = (0..5).map(at).collect();
    assert_eq!(next_position(&events).unwrap(), 5);
    assert_eq!(next_position(&events[..1]).unwrap(), 1);
  }

  #[test]
  fn ignores_slice_order() {
    let events = [at(2), at(0), at(1)];
    assert_eq!(next_position(&events).unwrap(), 3);
  }

  #[test]
  fn maximal_position_is_internal_error() {
    let err = next_position(&[at(0), at(u64::MAX)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
  }

  #[test]
  fn gaps_are_located() {
    assert_eq!(first_gap(&[]), None);
    assert_eq!(first_gap(&[at(0), at(1), at(2)]), None);
    assert_eq!(first_gap(&[at(0), at(2)]), Some((1, 2)));
    assert_eq!(first_gap(&[at(1)]), Some((0, 1)));
    assert_eq!(first_gap(&[at(0), at(u64::MAX)]), Some((1, u64::MAX)));
  }
}
