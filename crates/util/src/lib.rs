//! Small string helpers and id generation.

#![forbid(unsafe_code)]

pub mod idutil;
pub mod stringutil;
