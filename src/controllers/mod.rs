//! Page controllers, one per interactive behavior.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each controller wires its own listeners from an `attach` function and
//! returns the handles. Controllers never call each other; when two react to
//! the same click (nav menu and dropdown dismissal) they touch disjoint
//! classes, so their order does not matter.

pub mod dropdown;
pub mod like;
pub mod nav_menu;
pub mod preference;
pub mod smooth_scroll;
pub mod theme;
