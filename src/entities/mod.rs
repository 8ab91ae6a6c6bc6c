//! Entity type definitions
//!
//! - [`Part`] - a catalog item; an assembly when it lists subparts
//! - [`Offer`] - a distributor or seller price for one part

pub mod offer;
pub mod part;

pub use offer::{Offer, OfferSource};
pub use part::{OrgContext, Part, SubpartRef};
