//! Структурированные сообщения в записях движений (типы 100-127).
//!
//! Тело собирается из полей сообщения записей 2.1, 2.2 и 2.3 подряд,
//! поэтому у длинных раскладок хвост может прийти из 2.3.

use super::{DecodePayload, Payload, money, rate};
use crate::codebook::{
    CardSchemes, Coded, DirectDebitSchemes, DirectDebitTypes, Dom80SettlementCodes,
    IssuingInstitutions, MinimumApplicableCodes, MovementCommunicationTypes, PaidOrRefusedCodes,
    PosTransactionTypes, ProductCodes, RTransactionTypes,
};
use crate::error::ParseError;
use crate::utils::FieldCursor;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

/// Варианты структурированного сообщения движения
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MovementPayload {
    /// 100
    CreditorReference(CreditorReference),
    /// 101, 102
    StructuredReference(StructuredReference),
    /// 103
    Number(DocumentNumber),
    /// 104
    EuroEquivalent(EuroEquivalent),
    /// 105
    OriginalAmount(OriginalAmount),
    /// 106
    CalculationMethod(CalculationMethod),
    /// 107
    Dom80DirectDebit(Dom80DirectDebit),
    /// 108
    Closing(Closing),
    /// 111
    PosGlobalisation(PosGlobalisation),
    /// 113
    PosTransaction(PosTransaction),
    /// 121
    CommercialBill(CommercialBill),
    /// 122
    BillInterest(BillInterest),
    /// 123
    FeesAndCommissions(FeesAndCommissions),
    /// 124
    CreditCard(CreditCard),
    /// 125
    Credit(Credit),
    /// 126
    TermInvestment(TermInvestment),
    /// 127
    SepaDirectDebit(SepaDirectDebit),
}

/// Референс кредитора по ISO 11649 (RF...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditorReference {
    pub reference: String,
}

/// Бельгийское структурированное сообщение +++xxx/xxxx/xxxxx+++ (12 цифр)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredReference {
    pub reference: String,
}

/// Номер чека, карты и т.п.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentNumber {
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EuroEquivalent {
    pub equivalent_in_eur: Decimal,
}

/// Исходная сумма операции в валюте
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginalAmount {
    pub gross_amount_account_currency: Decimal,
    pub gross_amount_original_currency: Decimal,
    pub rate: Decimal,
    pub currency: String,
    pub structured_reference: String,
    pub country_code: String,
    pub equivalent_in_eur: Decimal,
}

/// Способ расчёта (НДС, налог у источника, комиссия)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationMethod {
    pub equivalent_amount: Decimal,
    pub basis_amount: Decimal,
    pub percent: Decimal,
    pub minimum: Coded<MinimumApplicableCodes>,
    pub equivalent_in_eur: Decimal,
}

/// Инкассо DOM'80
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dom80DirectDebit {
    pub direct_debit_number: String,
    pub central_date: Option<NaiveDateTime>,
    pub communication: String,
    pub direct_debit_type: Coded<DirectDebitTypes>,
    pub settlement: Coded<Dom80SettlementCodes>,
}

/// Закрытие периода (проценты)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Closing {
    pub equivalent_amount: Decimal,
    pub interest_rate: Decimal,
    pub period_from: Option<NaiveDateTime>,
    pub period_to: Option<NaiveDateTime>,
}

/// Итог по POS-терминалу за период
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosGlobalisation {
    pub card_scheme: Coded<CardSchemes>,
    pub pos_number: String,
    pub period_number: String,
    pub first_sequence: String,
    pub first_date: Option<NaiveDateTime>,
    pub last_sequence: String,
    pub last_date: Option<NaiveDateTime>,
    pub transaction_type: Coded<PosTransactionTypes>,
    pub terminal_name: String,
    pub terminal_city: String,
}

/// Отдельная операция в банкомате или POS-терминале
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosTransaction {
    pub card_number: String,
    pub card_scheme: Coded<CardSchemes>,
    pub terminal_number: String,
    pub sequence: String,
    pub date_time: Option<NaiveDateTime>,
    pub transaction_type: Coded<PosTransactionTypes>,
    pub terminal_name: String,
    pub terminal_city: String,
    pub original_amount: Decimal,
    pub rate: Decimal,
    pub currency: String,
    pub volume: Decimal,
    pub product_code: Coded<ProductCodes>,
    pub unit_price: Decimal,
}

/// Коммерческий вексель
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommercialBill {
    pub amount: Decimal,
    pub maturity_date: Option<NaiveDateTime>,
    pub conventional_maturity_date: Option<NaiveDateTime>,
    pub issue_date: Option<NaiveDateTime>,
    pub company_number: String,
    pub currency: String,
    pub bill_number: String,
    pub exchange_rate: Decimal,
}

/// Расчёт процентов по векселю
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillInterest {
    pub days: u32,
    pub interest_rate: Decimal,
    pub basis_amount: Decimal,
    pub minimum_rate: Coded<MinimumApplicableCodes>,
    pub bill_number: String,
    pub maturity_date: Option<NaiveDateTime>,
}

/// Сборы и комиссии (в т.ч. за банковскую гарантию)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeesAndCommissions {
    pub start_date: Option<NaiveDateTime>,
    /// `None` также для "999999" (бессрочно)
    pub maturity_date: Option<NaiveDateTime>,
    pub basis_amount: Decimal,
    pub percent: Decimal,
    pub term_days: u32,
    pub minimum: Coded<MinimumApplicableCodes>,
    pub guarantee_number: String,
}

/// Расчёты по кредитной карте
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditCard {
    pub card_scheme: Coded<CardSchemes>,
    pub issuing_institution: Coded<IssuingInstitutions>,
    pub invoice_number: String,
    pub identification_number: String,
    pub date: Option<NaiveDateTime>,
}

/// Кредит
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credit {
    pub account: String,
    pub old_balance: Decimal,
    pub new_balance: Decimal,
    pub amount: Decimal,
    pub currency: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub nominal_interest_rate: Decimal,
    pub transaction_reference: String,
}

/// Срочный депозит
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermInvestment {
    pub deposit_number: String,
    pub deposit_amount: Decimal,
    pub equivalent_amount: Decimal,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub interest_rate: Decimal,
    pub interest_amount: Decimal,
    pub currency: String,
    pub rate: Decimal,
}

/// SEPA-инкассо
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SepaDirectDebit {
    pub settlement_date: Option<NaiveDateTime>,
    pub direct_debit_type: Coded<DirectDebitTypes>,
    pub direct_debit_scheme: Coded<DirectDebitSchemes>,
    pub paid_or_refused: Coded<PaidOrRefusedCodes>,
    pub creditor_id: String,
    pub mandate_reference: String,
    pub communication: String,
    pub r_transaction_type: Coded<RTransactionTypes>,
    pub reason: String,
}

impl Payload for MovementPayload {
    type Types = MovementCommunicationTypes;
}

impl DecodePayload for MovementPayload {
    fn decode(code: u16, c: &mut FieldCursor) -> Result<Self, ParseError> {
        let payload = match code {
            100 => MovementPayload::CreditorReference(CreditorReference {
                reference: c.text(21),
            }),
            101 | 102 => MovementPayload::StructuredReference(StructuredReference {
                reference: c.text(12),
            }),
            103 => MovementPayload::Number(DocumentNumber {
                number: c.text(12),
            }),
            104 => MovementPayload::EuroEquivalent(EuroEquivalent {
                equivalent_in_eur: money(c)?,
            }),
            105 => MovementPayload::OriginalAmount(OriginalAmount {
                gross_amount_account_currency: money(c)?,
                gross_amount_original_currency: money(c)?,
                rate: rate(c)?,
                currency: c.text(3),
                structured_reference: c.text(12),
                country_code: c.text(2),
                equivalent_in_eur: money(c)?,
            }),
            106 => MovementPayload::CalculationMethod(CalculationMethod {
                equivalent_amount: money(c)?,
                basis_amount: money(c)?,
                percent: rate(c)?,
                minimum: Coded::new(c.text(1)),
                equivalent_in_eur: money(c)?,
            }),
            107 => MovementPayload::Dom80DirectDebit(Dom80DirectDebit {
                direct_debit_number: c.text(12),
                central_date: c.date(6)?,
                communication: c.text(30),
                direct_debit_type: Coded::new(c.text(1)),
                settlement: Coded::new(c.text(1)),
            }),
            108 => MovementPayload::Closing(Closing {
                equivalent_amount: money(c)?,
                interest_rate: rate(c)?,
                period_from: c.date(6)?,
                period_to: c.date(6)?,
            }),
            111 => MovementPayload::PosGlobalisation(PosGlobalisation {
                card_scheme: Coded::new(c.text(1)),
                pos_number: c.text(6),
                period_number: c.text(3),
                first_sequence: c.text(6),
                first_date: c.date(6)?,
                last_sequence: c.text(6),
                last_date: c.date(6)?,
                transaction_type: Coded::new(c.text(1)),
                terminal_name: c.text(16),
                terminal_city: c.text(10),
            }),
            113 => MovementPayload::PosTransaction(PosTransaction {
                card_number: c.text(19),
                card_scheme: Coded::new(c.text(1)),
                terminal_number: c.text(6),
                sequence: c.text(6),
                date_time: c.date(10)?,
                transaction_type: Coded::new(c.text(1)),
                terminal_name: c.text(16),
                terminal_city: c.text(10),
                original_amount: money(c)?,
                rate: rate(c)?,
                currency: c.text(3),
                volume: c.amount(5, 2)?,
                product_code: Coded::new(c.text(2)),
                unit_price: c.amount(5, 2)?,
            }),
            121 => {
                let amount = money(c)?;
                let maturity_date = c.date(6)?;
                let conventional_maturity_date = c.date(6)?;
                let issue_date = c.date(6)?;
                let company_number = c.text(11);
                let currency = c.text(3);
                c.skip(3);

                MovementPayload::CommercialBill(CommercialBill {
                    amount,
                    maturity_date,
                    conventional_maturity_date,
                    issue_date,
                    company_number,
                    currency,
                    bill_number: c.text(13),
                    exchange_rate: rate(c)?,
                })
            }
            122 => MovementPayload::BillInterest(BillInterest {
                days: c.number(4)?,
                interest_rate: rate(c)?,
                basis_amount: money(c)?,
                minimum_rate: Coded::new(c.text(1)),
                bill_number: c.text(13),
                maturity_date: c.date(6)?,
            }),
            123 => MovementPayload::FeesAndCommissions(FeesAndCommissions {
                start_date: c.date(6)?,
                maturity_date: c.date(6)?,
                basis_amount: money(c)?,
                percent: rate(c)?,
                term_days: c.number(4)?,
                minimum: Coded::new(c.text(1)),
                guarantee_number: c.text(13),
            }),
            124 => MovementPayload::CreditCard(CreditCard {
                card_scheme: Coded::new(c.text(1)),
                issuing_institution: Coded::new(c.text(1)),
                invoice_number: c.text(12),
                identification_number: c.text(15),
                date: c.date(6)?,
            }),
            125 => MovementPayload::Credit(Credit {
                account: c.text(37),
                old_balance: money(c)?,
                new_balance: money(c)?,
                amount: money(c)?,
                currency: c.text(3),
                start_date: c.date(6)?,
                end_date: c.date(6)?,
                nominal_interest_rate: rate(c)?,
                transaction_reference: c.text(13),
            }),
            126 => MovementPayload::TermInvestment(TermInvestment {
                deposit_number: c.text(15),
                deposit_amount: money(c)?,
                equivalent_amount: money(c)?,
                start_date: c.date(6)?,
                end_date: c.date(6)?,
                interest_rate: rate(c)?,
                interest_amount: money(c)?,
                currency: c.text(3),
                rate: rate(c)?,
            }),
            127 => MovementPayload::SepaDirectDebit(SepaDirectDebit {
                settlement_date: c.date(6)?,
                direct_debit_type: Coded::new(c.text(1)),
                direct_debit_scheme: Coded::new(c.text(1)),
                paid_or_refused: Coded::new(c.text(1)),
                creditor_id: c.text(35),
                mandate_reference: c.text(35),
                communication: c.text(62),
                r_transaction_type: Coded::new(c.text(1)),
                reason: c.text(4),
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
