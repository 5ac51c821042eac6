//! report-portal web server.
//!
//! This crate provides the Axum routes, authentication flow and
//! server-rendered Leptos pages for the report portal.

#![allow(non_snake_case)]

pub mod app;
pub mod auth;
pub mod config;
pub mod pages;
