//! Сборка документа: строки -> записи -> цепочки -> привязка.

use crate::error::ParseError;
use crate::linker::link;
use crate::merge::{merge_free_communications, merge_information, merge_movements};
use crate::model::{Balances, Document};
use crate::records::{DecodeContext, Record, decode_line};
use log::{debug, warn};
use std::io::{BufReader, Read};

/// Разбирает одну CODA-выписку.
///
/// Пустые строки пропускаются. Если запись 0, 1, 8 или 9 встречается
/// повторно, остаётся первая, а о повторе пишется предупреждение.
///
/// При ошибке разметки (неизвестный тип записи, формат даты, код
/// структурированного сообщения) возвращает [`ParseError`], частичного
/// результата нет.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let mut ctx = DecodeContext::default();

    let mut header = None;
    let mut old = None;
    let mut new = None;
    let mut trailer = None;
    let mut movement_records = Vec::new();
    let mut information_records = Vec::new();
    let mut free_records = Vec::new();

    for line in lines(text) {
        match decode_line(line, &ctx)? {
            Record::Header(h) => {
                keep_first(&mut header, h, "header");
            }
            Record::OldBalance(b) => {
                let structure = b.account.structure;
                if keep_first(&mut old, b, "old balance") {
                    ctx.account_structure = Some(structure);
                }
            }
            Record::Movement(m) => movement_records.push(m),
            Record::Information(i) => information_records.push(i),
            Record::FreeCommunication(f) => free_records.push(f),
            Record::NewBalance(b) => {
                keep_first(&mut new, b, "new balance");
            }
            Record::Trailer(t) => {
                keep_first(&mut trailer, t, "trailer");
            }
        }
    }

    debug!(
        "decoded {} movement, {} information and {} free communication records",
        movement_records.len(),
        information_records.len(),
        free_records.len()
    );

    let mut movements = merge_movements(&movement_records)?;
    let information = merge_information(&information_records)?;
    let free_communications = merge_free_communications(&free_records);
    let information = link(&mut movements, information);

    Ok(Document {
        header,
        balance: Balances { old, new },
        movements,
        information,
        free_communications,
        trailer,
    })
}

/// Разбирает файл с несколькими выписками подряд: каждая начинается с записи 0.
///
/// Строки до первого заголовка образуют отдельный документ без заголовка.
pub fn parse_all(text: &str) -> Result<Vec<Document>, ParseError> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();

    for line in lines(text) {
        if line.starts_with('0') || blocks.is_empty() {
            blocks.push(Vec::new());
        }
        if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    debug!("found {} statements", blocks.len());

    blocks.iter().map(|block| parse(&block.join("\n"))).collect()
}

impl Document {
    /// Читает выписку из переданного reader и разбирает её через [`parse`].
    ///
    /// Байты, которые не являются UTF-8, читаются как Latin-1.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParseError> {
        let mut bytes = Vec::new();
        BufReader::new(reader).read_to_end(&mut bytes)?;

        parse(&decode_text(bytes))
    }
}

/// Текст файла: UTF-8, а если он невалиден, то Latin-1 (байт = символ U+0000..U+00FF)
pub fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        debug!("input is not valid UTF-8, decoding as Latin-1");
        err.into_bytes().iter().map(|&b| char::from(b)).collect()
    })
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

/// `true`, если значение сохранено
fn keep_first<T>(slot: &mut Option<T>, value: T, record: &str) -> bool {
    if slot.is_some() {
        warn!("duplicate {record} record ignored");
        return false;
    }

    *slot = Some(value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountStructure;
    use crate::testing::line;

    fn header(reference: &str) -> String {
        line(&[
            (0, "00000"),
            (5, "241214"),
            (11, "725"),
            (14, "05"),
            (21, reference),
            (126, "2"),
        ])
    }

    fn old_balance(structure: &str) -> String {
        line(&[
            (0, "1"),
            (1, structure),
            (2, "001"),
            (5, "BE68539007547034"),
            (39, "EUR"),
            (42, "0000000001000000"),
            (58, "231214"),
            (125, "001"),
        ])
    }

    fn new_balance() -> String {
        line(&[
            (0, "8"),
            (1, "001"),
            (4, "BE68539007547034"),
            (38, "EUR"),
            (41, "0000000001500000"),
            (57, "241214"),
        ])
    }

    #[test]
    fn empty_input_gives_empty_document() {
        let doc = parse("").unwrap();

        assert!(doc.header.is_none());
        assert!(doc.movements.is_empty());
        assert!(doc.trailer.is_none());
    }

    #[test]
    fn new_balance_account_uses_old_balance_structure() {
        let text = [header("REF1"), old_balance("2"), new_balance()].join("\n");
        let doc = parse(&text).unwrap();

        let old = doc.balance.old.expect("old balance");
        let new = doc.balance.new.expect("new balance");
        let account = new.account.expect("account");

        assert_eq!(old.account.structure, AccountStructure::IbanBelgian);
        assert_eq!(account.structure, AccountStructure::IbanBelgian);
        assert_eq!(account.number, "BE68539007547034");
    }

    #[test]
    fn new_balance_without_old_balance_has_no_account() {
        let doc = parse(&new_balance()).unwrap();

        assert!(doc.balance.old.is_none());
        assert!(doc.balance.new.expect("new balance").account.is_none());
    }

    #[test]
    fn duplicate_records_keep_the_first() {
        let text = [
            header("FIRST"),
            header("SECOND"),
            old_balance("2"),
            old_balance("0"),
        ]
        .join("\n");
        let doc = parse(&text).unwrap();

        assert_eq!(doc.header.expect("header").file_reference, "FIRST");
        assert_eq!(
            doc.balance.old.expect("old balance").account.structure,
            AccountStructure::IbanBelgian
        );
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let text = format!("\r\n{}\r\n\r\n{}\r\n", header("REF1"), new_balance());
        let doc = parse(&text).unwrap();

        assert!(doc.header.is_some());
        assert!(doc.balance.new.is_some());
    }

    #[test]
    fn unknown_record_type_fails_the_whole_document() {
        let text = [header("REF1"), line(&[(0, "7")])].join("\n");
        assert!(matches!(parse(&text), Err(ParseError::UnknownRecordType(_))));
    }

    #[test]
    fn parse_all_splits_before_every_header() {
        let text = [
            header("ONE"),
            old_balance("2"),
            new_balance(),
            header("TWO"),
            new_balance(),
        ]
        .join("\n");

        let docs = parse_all(&text).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].header.as_ref().map(|h| h.file_reference.as_str()), Some("ONE"));
        assert_eq!(docs[1].header.as_ref().map(|h| h.file_reference.as_str()), Some("TWO"));
        // у второй выписки нет записи 1, структура счёта не переносится
        assert!(docs[1].balance.new.as_ref().and_then(|b| b.account.as_ref()).is_none());
    }

    #[test]
    fn latin1_input_is_decoded_without_shifting_columns() {
        let mut bytes = line(&[
            (0, "00000"),
            (5, "241214"),
            (11, "725"),
            (28, "?LECTRABEL"),
            (54, "GEBABEBB"),
            (126, "2"),
        ])
        .into_bytes();
        bytes[28] = 0xC9; // 'É' в Latin-1

        let doc = Document::from_reader(bytes.as_slice()).unwrap();
        let header = doc.header.expect("header");

        assert_eq!(header.account_name, "ÉLECTRABEL");
        assert_eq!(header.bic, "GEBABEBB");
        assert_eq!(header.version, 2);
    }

    #[test]
    fn decode_text_keeps_valid_utf8() {
        assert_eq!(decode_text("Société".as_bytes().to_vec()), "Société");
        assert_eq!(decode_text(vec![0x53, 0xE9]), "Sé");
    }

    #[test]
    fn from_reader_reads_everything() {
        let text = [header("REF1"), new_balance()].join("\n");
        let doc = Document::from_reader(text.as_bytes()).unwrap();

        assert!(doc.header.is_some());
    }
}
