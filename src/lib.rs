//! Delivery Consult - Conversational Consultation for TAFE NSW Delivery Staff
//!
//! This crate delivers a fixed questionnaire through a hosted language model,
//! one question per turn, tailoring each question to what the respondent has
//! already said about their campus, program areas, and role.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
