//! Разбор банковских выписок в формате CODA (128 колонок фиксированной ширины).
//!
//! Точка входа - [`parse`] для одной выписки и [`parse_all`] для файла,
//! в котором выписки идут подряд.

pub mod account;
pub mod codebook;
pub mod communication;
pub mod error;
pub mod model;
pub mod serialization;

mod document;
mod linker;
mod merge;
mod records;
mod utils;

#[cfg(test)]
mod testing;

pub use crate::account::{Account, AccountStructure};
pub use crate::codebook::{Coded, UNKNOWN};
pub use crate::communication::{
    Communication, CommunicationKind, InformationPayload, MovementPayload, Structured,
};
pub use crate::document::{decode_text, parse, parse_all};
pub use crate::error::ParseError;
pub use crate::model::{
    Balances, Document, FreeCommunication, Header, Information, Movement, NewBalance, OldBalance,
    TransactionCode, Trailer,
};
