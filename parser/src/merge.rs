//! Склейка цепочек физических записей в логические.
//!
//! Сначала по флагам продолжения строятся диапазоны индексов (цепочки),
//! затем каждая цепочка сворачивается в одну сущность. Исходный список
//! при этом не меняется.

use crate::codebook::Coded;
use crate::communication::{self, Communication, CommunicationKind, DecodePayload};
use crate::error::ParseError;
use crate::model::{FreeCommunication, Information, Movement, TransactionCode};
use crate::records::{
    CONTINUES, FreeCommunicationRecord, InformationPart, InformationRecord, MovementPart,
    MovementRecord,
};
use crate::utils::normalize_whitespace;
use log::warn;
use rust_decimal::Decimal;
use std::ops::Range;

/// Диапазоны цепочек в порядке их корней.
///
/// Пока у последней записи стоит флаг продолжения, следующая запись
/// входит в цепочку. Оборванная цепочка не ошибка: она заканчивается
/// на том, что есть.
fn chains<R>(records: &[R], continues: impl Fn(&R) -> bool, kind: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    while start < records.len() {
        let mut end = start + 1;

        while continues(&records[end - 1]) {
            if end == records.len() {
                warn!("{kind} chain at record {start} is truncated: input ended");
                break;
            }
            end += 1;
        }

        ranges.push(start..end);
        start = end;
    }

    ranges
}

/// Пустое поле превращается в `None`
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Итоговое сообщение цепочки: текст нормализуется, структура разбирается
/// по сырому буферу, так как её поля стоят на фиксированных позициях.
fn finish<P: DecodePayload>(
    buffer: &str,
    kind: CommunicationKind,
) -> Result<Communication<P>, ParseError> {
    match kind {
        CommunicationKind::Unstructured => {
            communication::decode(&normalize_whitespace(buffer), kind)
        }
        CommunicationKind::Structured => communication::decode(buffer, kind),
    }
}

pub(crate) fn merge_movements(records: &[MovementRecord]) -> Result<Vec<Movement>, ParseError> {
    chains(records, |r| r.next_code == CONTINUES, "movement")
        .into_iter()
        .map(|range| fold_movement(&records[range]))
        .collect()
}

fn fold_movement(chain: &[MovementRecord]) -> Result<Movement, ParseError> {
    let root = &chain[0];

    // 2.2 или 2.3 без 2.1 становится корнем с пустыми полями 2.1
    let mut movement = Movement {
        sequence: root.sequence,
        detail_sequence: root.detail_sequence,
        reference_number: String::new(),
        amount: Decimal::ZERO,
        value_date: None,
        transaction_code: TransactionCode::from_raw(""),
        communication: Communication::Plain(String::new()),
        entry_date: None,
        statement_sequence: 0,
        globalisation: Coded::new(""),
        customer_reference: None,
        counterparty_bic: None,
        r_transaction_type: None,
        reason_return_code: None,
        category_purpose: None,
        purpose: None,
        counterparty_account: None,
        counterparty_name: None,
        information: Vec::new(),
    };
    let mut kind = CommunicationKind::Unstructured;
    let mut buffer = String::new();

    for record in chain {
        buffer.push_str(record.part.communication());

        match &record.part {
            MovementPart::Main {
                reference_number,
                amount,
                value_date,
                transaction_code,
                communication_kind,
                entry_date,
                statement_sequence,
                globalisation,
                ..
            } => {
                movement.reference_number = reference_number.clone();
                movement.amount = *amount;
                movement.value_date = *value_date;
                movement.transaction_code = transaction_code.clone();
                movement.entry_date = *entry_date;
                movement.statement_sequence = *statement_sequence;
                movement.globalisation = Coded::new(globalisation.as_str());
                kind = *communication_kind;
            }
            MovementPart::Detail {
                customer_reference,
                counterparty_bic,
                r_transaction_type,
                reason_return_code,
                category_purpose,
                purpose,
                ..
            } => {
                movement.customer_reference = non_empty(customer_reference);
                movement.counterparty_bic = non_empty(counterparty_bic);
                movement.r_transaction_type = non_empty(r_transaction_type).map(Coded::new);
                movement.reason_return_code = non_empty(reason_return_code);
                movement.category_purpose = non_empty(category_purpose);
                movement.purpose = non_empty(purpose);
            }
            MovementPart::Counterparty {
                counterparty_account,
                counterparty_name,
                ..
            } => {
                movement.counterparty_account = non_empty(counterparty_account);
                movement.counterparty_name = non_empty(counterparty_name);
            }
        }
    }

    movement.communication = finish(&buffer, kind)?;
    Ok(movement)
}

pub(crate) fn merge_information(
    records: &[InformationRecord],
) -> Result<Vec<Information>, ParseError> {
    chains(records, |r| r.next_code == CONTINUES, "information")
        .into_iter()
        .map(|range| fold_information(&records[range]))
        .collect()
}

fn fold_information(chain: &[InformationRecord]) -> Result<Information, ParseError> {
    let root = &chain[0];

    let mut reference_number = String::new();
    let mut transaction_code = TransactionCode::from_raw("");
    let mut kind = CommunicationKind::Unstructured;
    let mut buffer = String::new();

    for record in chain {
        buffer.push_str(record.part.communication());

        if let InformationPart::Main {
            reference_number: reference,
            transaction_code: code,
            communication_kind,
            ..
        } = &record.part
        {
            reference_number = reference.clone();
            transaction_code = code.clone();
            kind = *communication_kind;
        }
    }

    Ok(Information {
        sequence: root.sequence,
        detail_sequence: root.detail_sequence,
        reference_number,
        transaction_code,
        communication: finish(&buffer, kind)?,
    })
}

pub(crate) fn merge_free_communications(
    records: &[FreeCommunicationRecord],
) -> Vec<FreeCommunication> {
    chains(records, |r| r.link_code == CONTINUES, "free communication")
        .into_iter()
        .map(|range| {
            let chain = &records[range];
            let text: String = chain.iter().map(|r| r.text.as_str()).collect();

            FreeCommunication {
                sequence: chain[0].sequence,
                detail_sequence: chain[0].detail_sequence,
                text: normalize_whitespace(&text),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::MovementPayload;
    use crate::records::{DecodeContext, Record, decode_line};
    use crate::testing::line;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn movement_records(lines: &[String]) -> Vec<MovementRecord> {
        lines
            .iter()
            .map(|l| match decode_line(l, &DecodeContext::default()).unwrap() {
                Record::Movement(m) => m,
                other => panic!("expected movement record, got {other:?}"),
            })
            .collect()
    }

    fn information_records(lines: &[String]) -> Vec<InformationRecord> {
        lines
            .iter()
            .map(|l| match decode_line(l, &DecodeContext::default()).unwrap() {
                Record::Information(i) => i,
                other => panic!("expected information record, got {other:?}"),
            })
            .collect()
    }

    fn main_line(seq: &str, flag: &str, communication: &str, next: &str) -> String {
        line(&[
            (0, "21"),
            (2, seq),
            (6, "0000"),
            (10, "REF-"),
            (14, seq),
            (31, "0000000000250000"),
            (47, "241214"),
            (53, "00150000"),
            (61, flag),
            (62, communication),
            (115, "241214"),
            (121, "001"),
            (124, "0"),
            (125, next),
            (127, "0"),
        ])
    }

    /// Структурированное сообщение, разрезанное по полям 2.1, 2.2 и (если не влезло) 2.3
    fn structured_movement(payload: &str) -> Vec<String> {
        let fragment = |from: usize, width: usize| -> String {
            payload.chars().skip(from).take(width).collect()
        };
        let with_counterparty = payload.chars().count() > 53 + 53;

        let mut lines = vec![
            main_line("0001", "1", &fragment(0, 53), "1"),
            line(&[
                (0, "22"),
                (2, "0001"),
                (6, "0000"),
                (10, &fragment(53, 53)),
                (125, if with_counterparty { "1" } else { "0" }),
            ]),
        ];
        if with_counterparty {
            lines.push(line(&[
                (0, "23"),
                (2, "0001"),
                (6, "0000"),
                (82, &fragment(106, 43)),
                (125, "0"),
            ]));
        }
        lines
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn chain_of_three_merges_into_root() {
        let lines = [
            main_line("0001", "0", "PART ONE", "1"),
            line(&[
                (0, "22"),
                (2, "0001"),
                (6, "0000"),
                (10, "PART TWO"),
                (98, "GEBABEBB"),
                (112, "1"),
                (125, "1"),
            ]),
            line(&[
                (0, "23"),
                (2, "0001"),
                (6, "0000"),
                (10, "BE43068999999501"),
                (47, "ELECTRABEL"),
                (82, "END"),
                (125, "0"),
            ]),
        ];

        let movements = merge_movements(&movement_records(&lines)).unwrap();
        assert_eq!(movements.len(), 1);

        let m = &movements[0];
        assert_eq!(m.sequence, 1);
        assert_eq!(m.reference_number, "REF-0001");
        assert_eq!(m.amount, Decimal::from_str("250").unwrap());
        assert_eq!(m.communication.as_plain(), Some("PART ONE PART TWO END"));
        assert_eq!(m.counterparty_bic.as_deref(), Some("GEBABEBB"));
        assert_eq!(
            m.r_transaction_type.as_ref().map(|r| r.description()),
            Some("Reject")
        );
        assert_eq!(m.customer_reference, None);
        assert_eq!(m.counterparty_account.as_deref(), Some("BE43068999999501"));
        assert_eq!(m.counterparty_name.as_deref(), Some("ELECTRABEL"));
    }

    #[test]
    fn structured_communication_is_decoded_after_merge() {
        let lines = [main_line("0001", "1", "101123456789002", "0")];

        let movements = merge_movements(&movement_records(&lines)).unwrap();
        let structured = movements[0]
            .communication
            .as_structured()
            .expect("structured communication");

        assert_eq!(structured.code, 101);
        let MovementPayload::StructuredReference(reference) = &structured.payload else {
            panic!("expected structured reference");
        };
        assert_eq!(reference.reference, "123456789002");
    }

    #[test]
    fn commercial_bill_is_read_across_main_and_detail_records() {
        let payload = [
            "121",
            "000000001250000",
            "310115",
            "280215",
            "011214",
            "00123456789",
            "EUR",
            "   ",
            "BILL000000121",
            "000100000000",
        ]
        .concat();
        let lines = structured_movement(&payload);
        // номер векселя начинается ровно на границе 2.1 / 2.2
        assert_eq!(lines.len(), 2);

        let movements = merge_movements(&movement_records(&lines)).unwrap();
        assert_eq!(movements.len(), 1);

        let structured = movements[0]
            .communication
            .as_structured()
            .expect("structured communication");
        assert_eq!(structured.code, 121);
        let MovementPayload::CommercialBill(bill) = &structured.payload else {
            panic!("expected commercial bill");
        };

        assert_eq!(bill.amount, Decimal::from_str("1250").unwrap());
        assert_eq!(bill.maturity_date.map(|d| d.date()), day(2015, 1, 31));
        assert_eq!(bill.conventional_maturity_date.map(|d| d.date()), day(2015, 2, 28));
        assert_eq!(bill.issue_date.map(|d| d.date()), day(2014, 12, 1));
        assert_eq!(bill.company_number, "00123456789");
        assert_eq!(bill.currency, "EUR");
        assert_eq!(bill.bill_number, "BILL000000121");
        assert_eq!(bill.exchange_rate, Decimal::ONE);
    }

    #[test]
    fn credit_is_read_across_all_three_records() {
        let payload = [
            "125".to_string(),
            format!("{:<37}", "BE68539007547034"),
            "000000010000000".into(),
            "000000009000000".into(),
            "000000001000000".into(),
            "EUR".into(),
            "010114".into(),
            "311224".into(),
            "000350000000".into(),
            "LOAN000000125".into(),
        ]
        .concat();
        let lines = structured_movement(&payload);
        // хвост раскладки приходит из 2.3
        assert_eq!(lines.len(), 3);

        let movements = merge_movements(&movement_records(&lines)).unwrap();
        assert_eq!(movements.len(), 1);

        let structured = movements[0]
            .communication
            .as_structured()
            .expect("structured communication");
        assert_eq!(structured.code, 125);
        let MovementPayload::Credit(credit) = &structured.payload else {
            panic!("expected credit");
        };

        assert_eq!(credit.account, "BE68539007547034");
        assert_eq!(credit.old_balance, Decimal::from_str("10000").unwrap());
        assert_eq!(credit.new_balance, Decimal::from_str("9000").unwrap());
        assert_eq!(credit.amount, Decimal::from_str("1000").unwrap());
        assert_eq!(credit.currency, "EUR");
        assert_eq!(credit.start_date.map(|d| d.date()), day(2014, 1, 1));
        assert_eq!(credit.end_date.map(|d| d.date()), day(2024, 12, 31));
        assert_eq!(credit.nominal_interest_rate, Decimal::from_str("3.5").unwrap());
        assert_eq!(credit.transaction_reference, "LOAN000000125");
    }

    #[test]
    fn truncated_chain_keeps_what_was_accumulated() {
        let lines = [main_line("0001", "0", "ONLY ROOT", "1")];

        let movements = merge_movements(&movement_records(&lines)).unwrap();

        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].communication.as_plain(), Some("ONLY ROOT"));
    }

    #[test]
    fn continuation_flag_always_consumes_the_next_record() {
        // следующая 2.1 тоже вливается в цепочку, её поля перекрывают корень
        let lines = [
            main_line("0001", "0", "FIRST", "1"),
            main_line("0002", "0", "SECOND", "0"),
        ];

        let movements = merge_movements(&movement_records(&lines)).unwrap();

        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].sequence, 1);
        assert_eq!(movements[0].reference_number, "REF-0002");
        assert_eq!(movements[0].communication.as_plain(), Some("FIRST SECOND"));
    }

    #[test]
    fn chains_are_emitted_in_root_order() {
        let lines = [
            main_line("0001", "0", "A", "0"),
            main_line("0002", "0", "B", "1"),
            line(&[(0, "22"), (2, "0002"), (6, "0000"), (10, "B2"), (125, "0")]),
            main_line("0003", "0", "C", "0"),
        ];

        let movements = merge_movements(&movement_records(&lines)).unwrap();
        let sequences: Vec<u32> = movements.iter().map(|m| m.sequence).collect();

        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(movements[1].communication.as_plain(), Some("B B2"));
    }

    #[test]
    fn orphan_continuation_becomes_its_own_movement() {
        let lines = [line(&[
            (0, "23"),
            (2, "0007"),
            (6, "0000"),
            (47, "LONELY NAME"),
            (125, "0"),
        ])];

        let movements = merge_movements(&movement_records(&lines)).unwrap();

        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].sequence, 7);
        assert_eq!(movements[0].amount, Decimal::ZERO);
        assert_eq!(movements[0].counterparty_name.as_deref(), Some("LONELY NAME"));
        assert_eq!(movements[0].communication.as_plain(), Some(""));
    }

    #[test]
    fn information_chain_concatenates_all_fragments() {
        let lines = [
            line(&[
                (0, "31"),
                (2, "0001"),
                (6, "0001"),
                (10, "REF-0001"),
                (31, "00150000"),
                (39, "0"),
                (40, "FIRST"),
                (125, "1"),
            ]),
            line(&[(0, "32"), (2, "0001"), (6, "0001"), (10, "SECOND"), (125, "1")]),
            line(&[(0, "33"), (2, "0001"), (6, "0001"), (10, "THIRD"), (125, "0")]),
        ];

        let information = merge_information(&information_records(&lines)).unwrap();

        assert_eq!(information.len(), 1);
        assert_eq!(information[0].reference_number, "REF-0001");
        assert_eq!(information[0].detail_sequence, 1);
        assert_eq!(
            information[0].communication.as_plain(),
            Some("FIRST SECOND THIRD")
        );
    }

    #[test]
    fn structured_information_spans_records() {
        // 001: имя занимает 70 колонок, 3.1 даёт только 73 - 3 = 70
        let lines = [
            line(&[
                (0, "31"),
                (2, "0001"),
                (6, "0001"),
                (10, "REF-0001"),
                (31, "00150000"),
                (39, "1"),
                (40, "001ACME NV"),
                (125, "1"),
            ]),
            line(&[
                (0, "32"),
                (2, "0001"),
                (6, "0001"),
                (10, "KERKSTRAAT 1"),
                (45, "2000 ANTWERPEN"),
                (80, "0123456789"),
                (125, "0"),
            ]),
        ];

        let information = merge_information(&information_records(&lines)).unwrap();
        let structured = information[0]
            .communication
            .as_structured()
            .expect("structured communication");

        let crate::communication::InformationPayload::Counterparty(cp) = &structured.payload else {
            panic!("expected counterparty data");
        };
        assert_eq!(cp.name, "ACME NV");
        assert_eq!(cp.street, "KERKSTRAAT 1");
        assert_eq!(cp.locality, "2000 ANTWERPEN");
        assert_eq!(cp.identification_code, "0123456789");
    }

    #[test]
    fn free_communications_follow_link_code() {
        let records: Vec<FreeCommunicationRecord> = [
            line(&[(0, "4 "), (2, "0001"), (6, "0000"), (32, "HELLO"), (127, "1")]),
            line(&[(0, "4 "), (2, "0001"), (6, "0001"), (32, "WORLD"), (127, "0")]),
            line(&[(0, "4 "), (2, "0002"), (6, "0000"), (32, "ALONE"), (127, "0")]),
        ]
        .iter()
        .map(|l| match decode_line(l, &DecodeContext::default()).unwrap() {
            Record::FreeCommunication(f) => f,
            other => panic!("expected free communication, got {other:?}"),
        })
        .collect();

        let merged = merge_free_communications(&records);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "HELLO WORLD");
        assert_eq!(merged[1].sequence, 2);
        assert_eq!(merged[1].text, "ALONE");
    }
}
