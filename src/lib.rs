//! Client for the BharatLens news-analysis service.
//!
//! A topic goes in through the analysis form, one `POST /analyze` call goes
//! out, and the reply is rendered as perspective cards, an executive summary,
//! evaluation metrics, bias charts, and a bias report, or as a single error
//! banner. The same controller drives the terminal output of
//! `bharatlens analyze` and the server-rendered page of `bharatlens serve`.

pub mod analysis;
pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod markup;
pub mod page;
pub mod terminal;
pub mod ui;
pub mod web;
