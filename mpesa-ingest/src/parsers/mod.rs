//! Statement text parsers.

pub mod mpesa_text;
