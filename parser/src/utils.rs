use crate::error::ParseError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Значение даты "неизвестна" в шестизначном формате
const UNKNOWN_DATE: &str = "000000";

static SPACES_RE: Lazy<Regex> = Lazy::new(|| {
    // два и более пробела подряд
    Regex::new(r" {2,}").unwrap()
});

/// Последовательное чтение полей фиксированной ширины из одной строки.
///
/// Позиции считаются в символах, а не в байтах. Если строка короче
/// запрошенного поля, недостающие колонки считаются пробелами.
#[derive(Debug, Clone)]
pub(crate) struct FieldCursor {
    columns: Vec<char>,
    pos: usize,
}

impl FieldCursor {
    pub(crate) fn new(line: &str) -> Self {
        FieldCursor {
            columns: line.chars().collect(),
            pos: 0,
        }
    }

    /// Текущая позиция (0-based)
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Пропускает `width` колонок заполнителя
    pub(crate) fn skip(&mut self, width: usize) -> &mut Self {
        self.pos += width;
        self
    }

    /// Ровно `width` колонок как есть, без обрезки пробелов
    pub(crate) fn take(&mut self, width: usize) -> String {
        let start = self.pos.min(self.columns.len());
        let end = (self.pos + width).min(self.columns.len());

        let mut raw: String = self.columns[start..end].iter().collect();
        raw.extend(std::iter::repeat_n(' ', width - (end - start)));

        self.pos += width;
        raw
    }

    /// Всё, что осталось до конца строки
    pub(crate) fn rest(&mut self) -> String {
        let width = self.columns.len().saturating_sub(self.pos);
        self.take(width)
    }

    /// Строковое поле без пробелов по краям
    pub(crate) fn text(&mut self, width: usize) -> String {
        self.take(width).trim().to_string()
    }

    /// Однобуквенный код (флаг продолжения, знак, дискриминант)
    pub(crate) fn flag(&mut self) -> char {
        self.take(1).chars().next().unwrap_or(' ')
    }

    pub(crate) fn number<T>(&mut self, width: usize) -> Result<T, ParseError>
    where
        T: FromStr + Default,
    {
        parse_number(&self.take(width))
    }

    /// Беззнаковая сумма с `scale` подразумеваемыми знаками после запятой
    pub(crate) fn amount(&mut self, width: usize, scale: u32) -> Result<Decimal, ParseError> {
        parse_scaled(&self.take(width), scale)
    }

    /// Код знака (1 символ) и сразу за ним 15 цифр суммы с 3 знаками после запятой
    pub(crate) fn signed_amount(&mut self) -> Result<Decimal, ParseError> {
        let sign = self.flag();
        let amount = self.amount(15, 3)?;
        apply_sign(sign, amount)
    }

    pub(crate) fn date(&mut self, width: usize) -> Result<Option<NaiveDateTime>, ParseError> {
        decode_date(&self.take(width))
    }
}

/// Целое число, дополненное нулями слева. Пустое поле даёт значение по умолчанию.
pub(crate) fn parse_number<T>(raw: &str) -> Result<T, ParseError>
where
    T: FromStr + Default,
{
    let s = raw.trim();
    if s.is_empty() {
        return Ok(T::default());
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidNumber(format!("not a number: '{raw}'")));
    }

    s.parse()
        .map_err(|_| ParseError::InvalidNumber(format!("number out of range: '{raw}'")))
}

/// Сумма с фиксированной точкой: целое из цифр, делённое на 10^scale.
/// Пустое поле - ноль.
pub(crate) fn parse_scaled(raw: &str, scale: u32) -> Result<Decimal, ParseError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(Decimal::ZERO);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidAmount(format!("not a number: '{raw}'")));
    }

    let units: i128 = s
        .parse()
        .map_err(|_| ParseError::InvalidAmount(format!("amount out of range: '{raw}'")))?;

    Decimal::try_from_i128_with_scale(units, scale)
        .map_err(|e| ParseError::InvalidAmount(format!("amount out of range: '{raw}': {e}")))
}

/// '0' - кредит (+), '1' - дебет (-)
pub(crate) fn apply_sign(sign: char, amount: Decimal) -> Result<Decimal, ParseError> {
    match sign {
        '0' => Ok(amount),
        '1' => Ok(-amount),
        other => Err(ParseError::InvalidAmount(format!(
            "unknown sign code: '{other}'"
        ))),
    }
}

/// Декодирует дату по длине строки: 6 - DDMMYY, 8 - DDMMYYYY, 10 - DDMMYYHHMM.
///
/// `000000` и пустое поле означают отсутствие даты. Для двузначного года
/// век берётся из текущего системного года.
pub(crate) fn decode_date(raw: &str) -> Result<Option<NaiveDateTime>, ParseError> {
    let len = raw.chars().count();
    if !matches!(len, 6 | 8 | 10) {
        return Err(ParseError::UnknownDateFormat(raw.to_string()));
    }

    if raw == UNKNOWN_DATE || raw.trim().is_empty() {
        return Ok(None);
    }

    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        warn!("date is not numeric, treated as absent: '{raw}'");
        return Ok(None);
    }

    // после проверки выше все символы - цифры ASCII
    let field = |from: usize, to: usize| -> u32 { raw[from..to].parse().unwrap_or_default() };

    let day = field(0, 2);
    let month = field(2, 4);
    let year = match len {
        8 => field(4, 8) as i32,
        _ => current_century() + field(4, 6) as i32,
    };
    let (hour, minute) = if len == 10 {
        (field(6, 8), field(8, 10))
    } else {
        (0, 0)
    };

    let decoded = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0));

    if decoded.is_none() {
        warn!("not a calendar date, treated as absent: '{raw}'");
    }

    Ok(decoded)
}

fn current_century() -> i32 {
    Utc::now().year() / 100 * 100
}

/// Схлопывает пробелы (2+ подряд в один) и обрезает края
pub(crate) fn normalize_whitespace(s: &str) -> String {
    SPACES_RE.replace_all(s.trim(), " ").into_owned()
}
