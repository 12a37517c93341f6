//! Q-Bot client library: the question model, the REST client for the
//! generation backend, per-page state and the PDF/text exporter.

pub mod alert;
pub mod api;
pub mod export;
pub mod generate;
pub mod home;
pub mod page;
pub mod paper;
pub mod question;
pub mod saved;

#[cfg(test)]
pub(crate) mod testing;
