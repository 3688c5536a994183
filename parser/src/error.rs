use std::io::Error as IoError;
use thiserror::Error;

/// Ошибки при разборе CODA-выписки
///
/// Все варианты фатальны для текущего документа: разбор прерывается
/// и частичный результат не возвращается. Проблемы качества данных
/// (оборванная цепочка записей, неизвестный код справочника) ошибками
/// не являются, они только логируются.
#[derive(Debug, Error)]
pub enum ParseError {
    // обёртки

    /// обёртка std::io::Error
    #[error("io error: {0}")]
    Io(#[from] IoError),
    /// обёртка csv::Error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// обёртка serde_json::Error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // логические ошибки

    /// неизвестный тип записи (первый символ строки, для 2 и 3 - два символа)
    #[error("unknown record type: '{0}'")]
    UnknownRecordType(String),
    /// неизвестный тип структурированного сообщения (три колонки как есть)
    #[error("unknown structured communication type: '{0}'")]
    UnknownCommunicationStructureType(String),
    /// длина даты не 6, 8 или 10 символов
    #[error("unknown date format: '{0}'")]
    UnknownDateFormat(String),
    /// структура счёта вне диапазона 0..=3
    #[error("unknown account structure: '{0}'")]
    UnknownAccountStructure(char),
    /// ошибка при парсинге денежной суммы или её знака
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// ошибка при парсинге целого числа
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}
