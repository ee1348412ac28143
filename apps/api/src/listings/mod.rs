// Listings: submission rules, persistence, and the describe/regenerate flow
// that sits on top of the generation pipeline.

pub mod handlers;
pub mod service;
pub mod store;
pub mod validation;
