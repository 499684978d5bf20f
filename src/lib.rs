//! # libxpns
//! 
//! `libxpns` is a backend library for `xpns` app: a personal
//! expense tracker with per-user accounts, funds, expenses,
//! spending statistics and reports.

extern crate dirs;
extern crate chrono;
extern crate rusqlite;

//
// Public modules
//

pub mod datetime;
pub mod error;
pub mod location;
pub mod storage;
pub mod auth;
pub mod core;
pub mod report;
