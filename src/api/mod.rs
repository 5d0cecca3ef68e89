pub mod routes;
mod server;
pub use server::{app, serve};
pub mod public;
