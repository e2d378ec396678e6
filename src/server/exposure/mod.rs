//! Protocol exposures of the application state

pub mod rest;

pub use rest::RestExposure;
