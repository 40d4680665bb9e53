//! Core types for API replay
//!
//! A fixture is a recorded request paired with the response the service
//! returned when it was recorded. This crate defines those types, the live
//! response captured at replay time, and loading of fixtures and the
//! authorization credential from disk.
//!
//! # Fixture file format
//!
//! ```json
//! {
//!   "request": {
//!     "url": "https://api.example.com/v1/credits",
//!     "method": "GET",
//!     "headers": { "Accept": "application/json" }
//!   },
//!   "response": {
//!     "status": 200,
//!     "body": { "credits": 42 }
//!   }
//! }
//! ```

mod credential;
mod error;
mod fixture;
mod loader;

pub use credential::Credential;
pub use error::{CredentialLoadError, FixtureLoadError, LoadResult};
pub use fixture::{Fixture, LiveResponse, RecordedRequest, RecordedResponse};
pub use loader::{discover_fixtures, load_fixture, load_fixtures};
