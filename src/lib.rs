//! Boleta Chat - Receipt extraction and question answering for Peruvian boletas
//!
//! Reads a receipt image through a multimodal model, validates the extracted
//! fields (RUC, series, IGV, totals) and answers typed or spoken questions
//! about the last receipt.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
