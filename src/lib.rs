/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/6/25
******************************************************************************/

//! Archives raw marketplace order pages.
//!
//! A run refreshes an OAuth2 access token, splits its lookback period into
//! windows (a rolling N-day window or calendar months), pages through the
//! orders search endpoint for each window and appends every non-empty page,
//! untouched, to a REST-backed table.

pub mod config;

pub mod constants;

pub mod error;

pub mod application;

pub mod session;

pub mod storage;

pub mod transport;

pub mod utils;
