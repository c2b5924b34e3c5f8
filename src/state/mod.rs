//! Pure interaction state, independent of any page.
//!
//! DESIGN
//! ======
//! The live state of each control is its DOM class membership. These types
//! give that state a name and own the transition rules so controllers only
//! translate between classes and states.

pub mod menu;
pub mod theme;
