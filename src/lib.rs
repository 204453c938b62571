//! Doomsday personality quiz backend.
//!
//! Serves the SPA, generates questions and results through Gemini, and runs
//! each quiz as a server-side session with its own countdown timer.

pub mod audio;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod gemini;
pub mod handoff;
pub mod locale;
pub mod logic;
pub mod prompts;
pub mod protocol;
pub mod quiz;
pub mod render;
pub mod routes;
pub mod seeds;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod util;

pub use routes::build_router;
pub use state::AppState;
