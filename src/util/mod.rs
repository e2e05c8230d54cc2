//! Utility modules for xmlarbor.
//!
//! Contains the lenient string-to-number conversions shared by text and
//! attribute views.

pub mod convert;
