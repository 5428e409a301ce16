//! Numeric coercion between primitive integer and float types.
//!
//! A dependency registered as one integer type can fill a field of any other
//! integer type, and likewise for floats. Values are converted with `as`, so
//! narrowing truncates.

use std::any::{Any, TypeId};

macro_rules! for_integers {
  ($apply:ident) => {
    $apply!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize)
  };
}

macro_rules! for_floats {
  ($apply:ident) => {
    $apply!(f32, f64)
  };
}

pub(crate) fn is_integer(id: TypeId) -> bool {
  macro_rules! check {
    ($($t:ty),*) => { false $(|| id == TypeId::of::<$t>())* };
  }
  for_integers!(check)
}

pub(crate) fn is_float(id: TypeId) -> bool {
  macro_rules! check {
    ($($t:ty),*) => { false $(|| id == TypeId::of::<$t>())* };
  }
  for_floats!(check)
}

fn integer_value(value: &dyn Any) -> Option<i128> {
  macro_rules! read {
    ($($t:ty),*) => {
      $(
        if let Some(v) = value.downcast_ref::<$t>() {
          return Some(*v as i128);
        }
      )*
    };
  }
  for_integers!(read);
  None
}

fn float_value(value: &dyn Any) -> Option<f64> {
  macro_rules! read {
    ($($t:ty),*) => {
      $(
        if let Some(v) = value.downcast_ref::<$t>() {
          return Some(*v as f64);
        }
      )*
    };
  }
  for_floats!(read);
  None
}

/// Converts `value` into `V` when both are integers or both are floats.
pub(crate) fn coerce<V: 'static>(value: &dyn Any) -> Option<V> {
  let mut out: Option<V> = None;
  let slot = &mut out as &mut dyn Any;

  if let Some(n) = integer_value(value) {
    macro_rules! write {
      ($($t:ty),*) => {
        $(
          if let Some(slot) = slot.downcast_mut::<Option<$t>>() {
            *slot = Some(n as $t);
          }
        )*
      };
    }
    for_integers!(write);
  } else if let Some(n) = float_value(value) {
    macro_rules! write {
      ($($t:ty),*) => {
        $(
          if let Some(slot) = slot.downcast_mut::<Option<$t>>() {
            *slot = Some(n as $t);
          }
        )*
      };
    }
    for_floats!(write);
  }

  out
}
