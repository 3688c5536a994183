mod information;
mod movement;

pub use information::*;
pub use movement::*;

use crate::codebook::{Codebook, describe};
use crate::error::ParseError;
use crate::utils::{FieldCursor, parse_number};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Ширина кода типа структурированного сообщения
const TYPE_WIDTH: usize = 3;

/// Флаг структуры сообщения в записях 2.1 и 3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunicationKind {
    /// '0' - свободный текст
    Unstructured,
    /// '1' - структурированное сообщение с кодом типа в первых трёх колонках
    Structured,
}

impl From<char> for CommunicationKind {
    fn from(flag: char) -> Self {
        match flag {
            '1' => CommunicationKind::Structured,
            _ => CommunicationKind::Unstructured,
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::MovementPayload {}
    impl Sealed for super::InformationPayload {}
}

/// Набор вариантов структурированного сообщения одной стороны (движения или информация).
///
/// Закрыт: реализуют его только [`MovementPayload`] и [`InformationPayload`].
pub trait Payload: sealed::Sealed + Sized {
    /// справочник описаний типов
    type Types: Codebook;
}

/// Раскладка тела по коду типа
pub(crate) trait DecodePayload: Payload {
    /// Разбирает тело сообщения после трёх цифр типа
    fn decode(code: u16, body: &mut FieldCursor) -> Result<Self, ParseError>;
}

/// Сообщение: либо текст, либо разобранная структура, но не оба сразу
#[derive(Debug, Clone, PartialEq)]
pub enum Communication<P> {
    Plain(String),
    Structured(Structured<P>),
}

/// Структурированное сообщение с кодом типа
#[derive(Debug, Clone, PartialEq)]
pub struct Structured<P> {
    pub code: u16,
    pub payload: P,
}

impl<P: Payload> Structured<P> {
    pub fn type_description(&self) -> &'static str {
        describe::<P::Types>(&format!("{:03}", self.code))
    }
}

impl<P> Communication<P> {
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Communication::Plain(text) => Some(text),
            Communication::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Structured<P>> {
        match self {
            Communication::Plain(_) => None,
            Communication::Structured(s) => Some(s),
        }
    }
}

/// Для `Unstructured` строка возвращается как есть, для `Structured`
/// разбирается по коду типа из первых трёх колонок.
///
/// Неизвестный или нечисловой код типа - ошибка
/// [`ParseError::UnknownCommunicationStructureType`]: раскладку остальных
/// колонок без него не определить.
pub(crate) fn decode<P: DecodePayload>(
    payload: &str,
    kind: CommunicationKind,
) -> Result<Communication<P>, ParseError> {
    match kind {
        CommunicationKind::Unstructured => Ok(Communication::Plain(payload.to_string())),
        CommunicationKind::Structured => {
            let mut c = FieldCursor::new(payload);
            let raw = c.take(TYPE_WIDTH);
            let code: u16 = parse_number(&raw)
                .map_err(|_| ParseError::UnknownCommunicationStructureType(raw.clone()))?;
            let payload = P::decode(code, &mut c)?;

            Ok(Communication::Structured(Structured { code, payload }))
        }
    }
}

/// Сумма: 15 цифр, 3 знака после запятой
pub(crate) fn money(c: &mut FieldCursor) -> Result<Decimal, ParseError> {
    c.amount(15, 3)
}

/// Ставка или процент: 12 цифр, 8 знаков после запятой
pub(crate) fn rate(c: &mut FieldCursor) -> Result<Decimal, ParseError> {
    c.amount(12, 8)
}

impl<P: Payload + Serialize> Serialize for Structured<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a, P> {
            r#type: String,
            type_description: &'static str,
            #[serde(flatten)]
            payload: &'a P,
        }

        View {
            r#type: format!("{:03}", self.code),
            type_description: self.type_description(),
            payload: &self.payload,
        }
        .serialize(serializer)
    }
}

impl<P: Payload + Serialize> Serialize for Communication<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Communication::Plain(text) => serializer.serialize_str(text),
            Communication::Structured(s) => s.serialize(serializer),
        }
    }
}

impl<P: Payload> fmt::Display for Communication<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Communication::Plain(text) => write!(f, "{text}"),
            Communication::Structured(s) => write!(f, "[{:03}] {}", s.code, s.type_description()),
        }
    }
}
