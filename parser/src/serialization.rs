use crate::error::ParseError;
use crate::model::{Document, Movement, TransactionCode};
use chrono::NaiveDateTime;
use csv::WriterBuilder;
use std::io::Write;

/// Заголовки CSV, по одной колонке на поле движения
const CSV_HEADERS: [&str; 10] = [
    "sequence",
    "detail_sequence",
    "reference_number",
    "value_date",
    "entry_date",
    "amount",
    "transaction_code",
    "counterparty_account",
    "counterparty_name",
    "communication",
];

impl Document {
    /// Записывает выписку целиком в JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ParseError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Записывает движения в CSV, одна строка на движение
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ParseError> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

        wtr.write_record(CSV_HEADERS)?;

        for movement in &self.movements {
            wtr.write_record(movement_row(movement))?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn movement_row(movement: &Movement) -> [String; 10] {
    [
        movement.sequence.to_string(),
        movement.detail_sequence.to_string(),
        movement.reference_number.clone(),
        format_date(movement.value_date),
        format_date(movement.entry_date),
        movement.amount.to_string(),
        format_code(&movement.transaction_code),
        movement.counterparty_account.clone().unwrap_or_default(),
        movement.counterparty_name.clone().unwrap_or_default(),
        movement.communication.to_string(),
    ]
}

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Код операции одной строкой, как в файле: тип, семейство, операция, категория
fn format_code(code: &TransactionCode) -> String {
    format!(
        "{}{}{}{}",
        code.r#type, code.family, code.transaction, code.category
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::testing::line;

    fn sample() -> Document {
        let text = [
            line(&[(0, "00000"), (5, "241214"), (11, "725"), (126, "2")]),
            line(&[
                (0, "21"),
                (2, "0001"),
                (6, "0000"),
                (10, "REF-1"),
                (31, "1000000000012500"),
                (47, "241214"),
                (53, "00501000"),
                (61, "0"),
                (62, "ELECTRICITY,  DECEMBER"),
                (115, "251214"),
                (125, "1"),
            ]),
            line(&[
                (0, "23"),
                (2, "0001"),
                (6, "0000"),
                (10, "BE43068999999501"),
                (47, "ELECTRABEL"),
                (125, "0"),
            ]),
        ]
        .join("\n");

        parse(&text).unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_movement() {
        let mut out = Vec::new();
        sample().write_csv(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("sequence,detail_sequence,reference_number"));
        assert_eq!(
            lines[1],
            "1,0,REF-1,2014-12-24,2014-12-25,-12.500,00501000,BE43068999999501,ELECTRABEL,\"ELECTRICITY, DECEMBER\""
        );
    }

    #[test]
    fn json_contains_descriptions_next_to_codes() {
        let mut out = Vec::new();
        sample().write_json(&mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let movement = &json["movements"][0];

        assert_eq!(movement["amount"], "-12.500");
        assert_eq!(movement["transaction_code"]["family"], "05");
        assert_eq!(movement["transaction_code"]["family_description"], "Direct debit");
        assert_eq!(movement["communication"], "ELECTRICITY, DECEMBER");
        assert_eq!(movement["globalisation"]["code"], "");
        assert!(json["balance"]["old"].is_null());
    }
}
