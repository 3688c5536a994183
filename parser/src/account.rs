use crate::codebook::{AccountStructures, describe};
use crate::error::ParseError;
use crate::utils::FieldCursor;
use serde::{Serialize, Serializer};

/// Ширина поля "номер счёта + валюта" в записях 1 и 8
pub(crate) const ACCOUNT_FIELD_WIDTH: usize = 37;

/// Структура номера счёта, задаётся цифрой во второй колонке записи 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStructure {
    /// 0 - бельгийский номер счёта (12 цифр)
    Belgian,
    /// 1 - иностранный номер счёта
    Foreign,
    /// 2 - IBAN бельгийского счёта
    IbanBelgian,
    /// 3 - IBAN иностранного счёта
    IbanForeign,
}

impl AccountStructure {
    pub fn code(self) -> char {
        match self {
            AccountStructure::Belgian => '0',
            AccountStructure::Foreign => '1',
            AccountStructure::IbanBelgian => '2',
            AccountStructure::IbanForeign => '3',
        }
    }

    pub fn description(self) -> &'static str {
        describe::<AccountStructures>(self.code().encode_utf8(&mut [0; 4]))
    }
}

impl TryFrom<char> for AccountStructure {
    type Error = ParseError;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        match code {
            '0' => Ok(AccountStructure::Belgian),
            '1' => Ok(AccountStructure::Foreign),
            '2' => Ok(AccountStructure::IbanBelgian),
            '3' => Ok(AccountStructure::IbanForeign),
            other => Err(ParseError::UnknownAccountStructure(other)),
        }
    }
}

/// Счёт владельца выписки
///
/// Поля `qualification_code`, `country` и `extension_zone` есть не во всех структурах.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub structure: AccountStructure,
    pub number: String,
    pub currency: String,
    pub qualification_code: Option<String>,
    pub country: Option<String>,
    pub extension_zone: Option<String>,
}

impl Account {
    /// Разбирает 37 колонок поля счёта по заданной структуре
    pub(crate) fn decode(structure: AccountStructure, field: &str) -> Self {
        let mut c = FieldCursor::new(field);

        match structure {
            AccountStructure::Belgian => {
                let number = c.text(12);
                c.skip(1);
                let currency = c.text(3);
                let qualification_code = c.text(1);
                let country = c.text(2);
                c.skip(3);
                let extension_zone = c.text(15);

                Account {
                    structure,
                    number,
                    currency,
                    qualification_code: Some(qualification_code),
                    country: Some(country),
                    extension_zone: Some(extension_zone),
                }
            }
            AccountStructure::Foreign | AccountStructure::IbanForeign => {
                let number = c.text(34);
                let currency = c.text(3);

                Account {
                    structure,
                    number,
                    currency,
                    qualification_code: None,
                    country: None,
                    extension_zone: None,
                }
            }
            AccountStructure::IbanBelgian => {
                let number = c.text(31);
                let extension_zone = c.text(3);
                let currency = c.text(3);

                Account {
                    structure,
                    number,
                    currency,
                    qualification_code: None,
                    country: None,
                    extension_zone: Some(extension_zone),
                }
            }
        }
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct View<'a> {
            r#type: char,
            type_description: &'static str,
            number: &'a str,
            currency: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            qualification_code: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            country: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            extension_zone: Option<&'a str>,
        }

        View {
            r#type: self.structure.code(),
            type_description: self.structure.description(),
            number: &self.number,
            currency: &self.currency,
            qualification_code: self.qualification_code.as_deref(),
            country: self.country.as_deref(),
            extension_zone: self.extension_zone.as_deref(),
        }
        .serialize(serializer)
    }
}
