use crate::account::Account;
use crate::codebook::{
    Coded, GlobalisationCodes, MultipleFileCodes, RTransactionTypes, TransactionCategories,
    TransactionFamilies, TransactionTypes, Transactions, describe,
};
use crate::communication::{Communication, InformationPayload, MovementPayload};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Центральная/корневая структура библиотеки, содержащая одну CODA-выписку.
///
/// Пример использования:
/// ```no_run
/// let text = std::fs::read_to_string("statement.cod")?;
/// let document = coda_parser::parse(&text)?;
///
/// for movement in &document.movements {
///     println!("{movement}");
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// запись 0
    pub header: Option<Header>,
    /// записи 1 и 8
    pub balance: Balances,
    /// движения (записи 2.x), информационные записи уже привязаны к ним
    pub movements: Vec<Movement>,
    /// информационные записи (3.x), для которых не нашлось движения
    pub information: Vec<Information>,
    /// свободные сообщения (записи 4)
    pub free_communications: Vec<FreeCommunication>,
    /// запись 9
    pub trailer: Option<Trailer>,
}

/// Заголовок выписки (запись 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// дата создания файла
    pub creation_date: Option<NaiveDateTime>,
    /// идентификатор банка
    pub bank_id: String,
    /// код приложения, обычно "05"
    pub application_code: String,
    /// файл - дубликат ранее отправленного
    pub duplicate: bool,
    pub file_reference: String,
    /// имя получателя выписки
    pub account_name: String,
    pub bic: String,
    /// номер предприятия владельца счёта
    pub identification_number: String,
    pub external_application_code: String,
    pub transaction_reference: String,
    pub related_reference: String,
    /// версия формата
    pub version: u8,
}

/// Старый и новый балансы
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Balances {
    pub old: Option<OldBalance>,
    pub new: Option<NewBalance>,
}

/// Старый баланс (запись 1)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OldBalance {
    /// номер бумажной выписки
    pub sequence: u32,
    pub account: Account,
    pub amount: Decimal,
    pub date: Option<NaiveDateTime>,
    pub holder_name: String,
    pub description: String,
    /// порядковый номер CODA-выписки
    pub coda_sequence: u32,
}

/// Новый баланс (запись 8)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBalance {
    pub sequence: u32,
    /// `None`, если записи старого баланса не было и структура счёта неизвестна.
    /// В JSON такой счёт выводится пустым объектом `{}`.
    #[serde(serialize_with = "account_or_empty")]
    pub account: Option<Account>,
    pub amount: Decimal,
    pub date: Option<NaiveDateTime>,
}

fn account_or_empty<S: Serializer>(
    account: &Option<Account>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match account {
        Some(account) => account.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Код операции: тип, семейство, операция, категория
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCode {
    pub r#type: String,
    pub family: String,
    pub transaction: String,
    pub category: String,
}

impl TransactionCode {
    /// Разбирает 8 символов кода операции
    pub(crate) fn from_raw(raw: &str) -> Self {
        let digits: Vec<char> = raw.chars().collect();
        let part = |from: usize, to: usize| -> String {
            digits
                .get(from..to.min(digits.len()))
                .map(|s| s.iter().collect::<String>())
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        TransactionCode {
            r#type: part(0, 1),
            family: part(1, 3),
            transaction: part(3, 5),
            category: part(5, 8),
        }
    }

    pub fn type_description(&self) -> &'static str {
        describe::<TransactionTypes>(&self.r#type)
    }

    pub fn family_description(&self) -> &'static str {
        describe::<TransactionFamilies>(&self.family)
    }

    pub fn transaction_description(&self) -> &'static str {
        describe::<Transactions>(&format!("{}{}", self.family, self.transaction))
    }

    pub fn category_description(&self) -> &'static str {
        describe::<TransactionCategories>(&self.category)
    }
}

impl Serialize for TransactionCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            r#type: &'a str,
            type_description: &'static str,
            family: &'a str,
            family_description: &'static str,
            transaction: &'a str,
            transaction_description: &'static str,
            category: &'a str,
            category_description: &'static str,
        }

        View {
            r#type: &self.r#type,
            type_description: self.type_description(),
            family: &self.family,
            family_description: self.family_description(),
            transaction: &self.transaction,
            transaction_description: self.transaction_description(),
            category: &self.category,
            category_description: self.category_description(),
        }
        .serialize(serializer)
    }
}

/// Движение по счёту: записи 2.1, 2.2, 2.3, склеенные в одну
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movement {
    /// номер движения
    pub sequence: u32,
    /// номер детали
    pub detail_sequence: u32,
    /// банковский референс
    pub reference_number: String,
    /// сумма со знаком
    pub amount: Decimal,
    pub value_date: Option<NaiveDateTime>,
    pub transaction_code: TransactionCode,
    pub communication: Communication<MovementPayload>,
    /// дата проводки
    pub entry_date: Option<NaiveDateTime>,
    /// номер бумажной выписки
    pub statement_sequence: u32,
    pub globalisation: Coded<GlobalisationCodes>,

    // 2.2
    pub customer_reference: Option<String>,
    pub counterparty_bic: Option<String>,
    pub r_transaction_type: Option<Coded<RTransactionTypes>>,
    pub reason_return_code: Option<String>,
    pub category_purpose: Option<String>,
    pub purpose: Option<String>,

    // 2.3
    pub counterparty_account: Option<String>,
    pub counterparty_name: Option<String>,

    /// информационные записи с тем же (sequence, reference_number)
    pub information: Vec<Information>,
}

/// Информационная запись: 3.1, 3.2, 3.3, склеенные в одну
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Information {
    pub sequence: u32,
    pub detail_sequence: u32,
    pub reference_number: String,
    pub transaction_code: TransactionCode,
    pub communication: Communication<InformationPayload>,
}

/// Свободное сообщение (записи 4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeCommunication {
    pub sequence: u32,
    pub detail_sequence: u32,
    pub text: String,
}

/// Трейлер (запись 9)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trailer {
    /// число записей 1, 2, 3 и 8
    pub record_count: u32,
    pub debit: Decimal,
    pub credit: Decimal,
    pub multiple_file: Coded<MultipleFileCodes>,
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value_date_str = self
            .value_date
            .map(|d| d.date().to_string())
            .unwrap_or_default();

        let counterparty_str = self.counterparty_account.as_deref().unwrap_or("");
        let counterparty_name_str = self.counterparty_name.as_deref().unwrap_or("");

        write!(
            f,
            "{:>4}/{:<4} {:<10} {:>15} {} {} {}",
            self.sequence,
            self.detail_sequence,
            value_date_str,
            self.amount,
            counterparty_str,
            counterparty_name_str,
            self.communication,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountStructure;
    use crate::codebook::UNKNOWN;

    #[test]
    fn transaction_code_splits_eight_digits() {
        let code = TransactionCode::from_raw("00150000");

        assert_eq!(code.r#type, "0");
        assert_eq!(code.family, "01");
        assert_eq!(code.transaction, "50");
        assert_eq!(code.category, "000");

        assert_eq!(code.type_description(), "Simple amount without detailed data");
        assert_eq!(code.family_description(), "Domestic or local SEPA credit transfers");
        assert_eq!(code.transaction_description(), "Transfer in your favour");
        assert_eq!(code.category_description(), "Net amount");
    }

    #[test]
    fn transaction_code_unknown_codes_resolve_to_sentinel() {
        let code = TransactionCode::from_raw("17799999");

        assert_eq!(code.family_description(), UNKNOWN);
        assert_eq!(code.transaction_description(), UNKNOWN);
        assert_eq!(code.category_description(), UNKNOWN);
    }

    #[test]
    fn transaction_code_tolerates_short_input() {
        let code = TransactionCode::from_raw("00");

        assert_eq!(code.family, "0");
        assert_eq!(code.transaction, "");
        assert_eq!(code.category, "");
    }

    #[test]
    fn transaction_code_serializes_descriptions_as_plain_fields() {
        let code = TransactionCode::from_raw("00401000");
        let json = serde_json::to_value(&code).unwrap();

        assert_eq!(json["family"], "04");
        assert_eq!(json["family_description"], "Cards");
        assert_eq!(json["transaction"], "01");
        assert_eq!(json["category_description"], "Net amount");
    }

    #[test]
    fn new_balance_without_account_serializes_empty_object() {
        let mut balance = NewBalance {
            sequence: 1,
            account: None,
            amount: Decimal::ZERO,
            date: None,
        };
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["account"], serde_json::json!({}));

        let field = format!("{:<34}EUR", "BE68539007547034");
        balance.account = Some(Account::decode(AccountStructure::IbanBelgian, &field));
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["account"]["number"], "BE68539007547034");
    }
}
