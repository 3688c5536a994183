//! Структурированные сообщения в информационных записях (типы 001-011).

use super::{DecodePayload, Payload, money};
use crate::codebook::{
    Coded, InformationCommunicationTypes, SecuritiesCodeTypes, TransactionCategories,
};
use crate::error::ParseError;
use crate::utils::{FieldCursor, apply_sign, normalize_whitespace};
use rust_decimal::Decimal;
use serde::Serialize;

/// Варианты структурированного сообщения информационной записи
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InformationPayload {
    /// 001
    Counterparty(CounterpartyData),
    /// 002
    BankCommunication(BankCommunication),
    /// 006
    DetailAmount(DetailAmount),
    /// 007
    DetailCash(DetailCash),
    /// 008 - конечный получатель, 009 - конечный плательщик
    UltimateParty(UltimateParty),
    /// 010
    Securities(Securities),
    /// 011
    Coupons(Coupons),
}

/// Данные контрагента
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyData {
    pub name: String,
    pub street: String,
    pub locality: String,
    pub identification_code: String,
}

/// Свободный текст от банка
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankCommunication {
    pub text: String,
}

/// Сумма детали со своим знаком
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailAmount {
    pub description: String,
    pub currency: String,
    pub amount: Decimal,
    pub category: Coded<TransactionCategories>,
}

/// Разбивка наличных по купюрам/монетам
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailCash {
    pub count: u32,
    pub denomination: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UltimateParty {
    pub name: String,
    pub identification_code: String,
}

/// Покупка или продажа ценных бумаг
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Securities {
    pub code_type: Coded<SecuritiesCodeTypes>,
    pub security_code: String,
    pub quantity: Decimal,
    pub price_currency: String,
    pub unit_price: Decimal,
    pub counter_value: Decimal,
}

/// Выплата по купонам
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coupons {
    pub code_type: Coded<SecuritiesCodeTypes>,
    pub security_code: String,
    pub coupon_number: String,
    pub quantity: Decimal,
    pub unit_amount: Decimal,
    pub currency: String,
    pub gross_amount: Decimal,
}

impl Payload for InformationPayload {
    type Types = InformationCommunicationTypes;
}

impl DecodePayload for InformationPayload {
    fn decode(code: u16, c: &mut FieldCursor) -> Result<Self, ParseError> {
        let payload = match code {
            1 => InformationPayload::Counterparty(CounterpartyData {
                name: c.text(70),
                street: c.text(35),
                locality: c.text(35),
                identification_code: c.text(35),
            }),
            2 => InformationPayload::BankCommunication(BankCommunication {
                text: normalize_whitespace(&c.rest()),
            }),
            6 => {
                let description = c.text(30);
                let currency = c.text(3);
                let magnitude = money(c)?;
                let amount = apply_sign(c.flag(), magnitude)?;

                InformationPayload::DetailAmount(DetailAmount {
                    description,
                    currency,
                    amount,
                    category: Coded::new(c.text(3)),
                })
            }
            7 => InformationPayload::DetailCash(DetailCash {
                count: c.number(7)?,
                denomination: c.amount(6, 3)?,
                total_amount: money(c)?,
            }),
            8 | 9 => InformationPayload::UltimateParty(UltimateParty {
                name: c.text(70),
                identification_code: c.text(35),
            }),
            10 => InformationPayload::Securities(Securities {
                code_type: Coded::new(c.text(1)),
                security_code: c.text(15),
                quantity: c.amount(15, 4)?,
                price_currency: c.text(3),
                unit_price: c.amount(15, 6)?,
                counter_value: money(c)?,
            }),
            11 => InformationPayload::Coupons(Coupons {
                code_type: Coded::new(c.text(1)),
                security_code: c.text(15),
                coupon_number: c.text(6),
                quantity: c.amount(15, 4)?,
                unit_amount: c.amount(15, 6)?,
                currency: c.text(3),
                gross_amount: money(c)?,
            }),
            other => {
                return Err(ParseError::UnknownCommunicationStructureType(format!(
                    "{other:03}"
                )));
            }
        };

        Ok(payload)
    }
}
