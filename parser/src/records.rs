//! Разбор одной физической строки по типу записи.
//!
//! Каждая функция - чистая: строка на входе, плоская запись на выходе.
//! Флаги `next_code` и `link_code` остаются в записи для склейки цепочек.

use crate::account::{ACCOUNT_FIELD_WIDTH, Account, AccountStructure};
use crate::codebook::Coded;
use crate::communication::CommunicationKind;
use crate::error::ParseError;
use crate::model::{Header, NewBalance, OldBalance, TransactionCode, Trailer};
use crate::utils::FieldCursor;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Флаг "следующая запись продолжает эту"
pub(crate) const CONTINUES: char = '1';

/// Одна разобранная физическая строка
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Record {
    Header(Header),
    OldBalance(OldBalance),
    Movement(MovementRecord),
    Information(InformationRecord),
    FreeCommunication(FreeCommunicationRecord),
    NewBalance(NewBalance),
    Trailer(Trailer),
}

/// Состояние, которое переносится между строками одного документа
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DecodeContext {
    /// структура счёта из записи 1, нужна для разбора записи 8
    pub(crate) account_structure: Option<AccountStructure>,
}

/// Физическая запись движения (2.1, 2.2 или 2.3)
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MovementRecord {
    pub(crate) sequence: u32,
    pub(crate) detail_sequence: u32,
    pub(crate) part: MovementPart,
    pub(crate) next_code: char,
    pub(crate) link_code: char,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MovementPart {
    /// 2.1
    Main {
        reference_number: String,
        amount: Decimal,
        value_date: Option<NaiveDateTime>,
        transaction_code: TransactionCode,
        communication_kind: CommunicationKind,
        communication: String,
        entry_date: Option<NaiveDateTime>,
        statement_sequence: u32,
        globalisation: String,
    },
    /// 2.2
    Detail {
        communication: String,
        customer_reference: String,
        counterparty_bic: String,
        r_transaction_type: String,
        reason_return_code: String,
        category_purpose: String,
        purpose: String,
    },
    /// 2.3
    Counterparty {
        counterparty_account: String,
        counterparty_name: String,
        communication: String,
    },
}

impl MovementPart {
    /// Кусок сообщения как есть, без обрезки пробелов
    pub(crate) fn communication(&self) -> &str {
        match self {
            MovementPart::Main { communication, .. }
            | MovementPart::Detail { communication, .. }
            | MovementPart::Counterparty { communication, .. } => communication,
        }
    }
}

/// Физическая информационная запись (3.1, 3.2 или 3.3)
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InformationRecord {
    pub(crate) sequence: u32,
    pub(crate) detail_sequence: u32,
    pub(crate) part: InformationPart,
    pub(crate) next_code: char,
    pub(crate) link_code: char,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InformationPart {
    /// 3.1
    Main {
        reference_number: String,
        transaction_code: TransactionCode,
        communication_kind: CommunicationKind,
        communication: String,
    },
    /// 3.2 и 3.3 несут только продолжение сообщения
    Continuation { communication: String },
}

impl InformationPart {
    pub(crate) fn communication(&self) -> &str {
        match self {
            InformationPart::Main { communication, .. }
            | InformationPart::Continuation { communication } => communication,
        }
    }
}

/// Физическая запись свободного сообщения (4)
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FreeCommunicationRecord {
    pub(crate) sequence: u32,
    pub(crate) detail_sequence: u32,
    pub(crate) text: String,
    pub(crate) link_code: char,
}

/// Разбирает строку по первому символу (для 2 и 3 - по двум первым)
pub(crate) fn decode_line(line: &str, ctx: &DecodeContext) -> Result<Record, ParseError> {
    let mut chars = line.chars();
    let record_type = chars.next().unwrap_or(' ');
    let article = chars.next().unwrap_or(' ');

    let record = match (record_type, article) {
        ('0', _) => Record::Header(decode_header(line)?),
        ('1', _) => Record::OldBalance(decode_old_balance(line)?),
        ('2', '1') => Record::Movement(decode_movement_main(line)?),
        ('2', '2') => Record::Movement(decode_movement_detail(line)?),
        ('2', '3') => Record::Movement(decode_movement_counterparty(line)?),
        ('3', '1') => Record::Information(decode_information_main(line)?),
        ('3', '2') => Record::Information(decode_information_continuation(line, 105)?),
        ('3', '3') => Record::Information(decode_information_continuation(line, 90)?),
        ('4', _) => Record::FreeCommunication(decode_free_communication(line)?),
        ('8', _) => Record::NewBalance(decode_new_balance(line, ctx)?),
        ('9', _) => Record::Trailer(decode_trailer(line)?),
        ('2' | '3', other) => {
            return Err(ParseError::UnknownRecordType(format!("{record_type}{other}")));
        }
        (other, _) => return Err(ParseError::UnknownRecordType(other.to_string())),
    };

    Ok(record)
}

fn decode_header(line: &str) -> Result<Header, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(5);
    let creation_date = c.date(6)?;
    let bank_id = c.text(3);
    let application_code = c.text(2);
    let duplicate = c.flag() == 'D';
    c.skip(4);
    let file_reference = c.text(7);
    let account_name = c.text(26);
    let bic = c.text(11);
    let identification_number = c.text(11);
    c.skip(6);
    let external_application_code = c.text(5);
    let transaction_reference = c.text(16);
    let related_reference = c.text(16);
    c.skip(7);
    let version = c.number(1)?;

    Ok(Header {
        creation_date,
        bank_id,
        application_code,
        duplicate,
        file_reference,
        account_name,
        bic,
        identification_number,
        external_application_code,
        transaction_reference,
        related_reference,
        version,
    })
}

fn decode_old_balance(line: &str) -> Result<OldBalance, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(1);
    let structure = AccountStructure::try_from(c.flag())?;
    let sequence = c.number(3)?;
    let account = Account::decode(structure, &c.take(ACCOUNT_FIELD_WIDTH));
    let amount = c.signed_amount()?;
    let date = c.date(6)?;
    let holder_name = c.text(26);
    let description = c.text(35);
    let coda_sequence = c.number(3)?;

    Ok(OldBalance {
        sequence,
        account,
        amount,
        date,
        holder_name,
        description,
        coda_sequence,
    })
}

fn decode_new_balance(line: &str, ctx: &DecodeContext) -> Result<NewBalance, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(1);
    let sequence = c.number(3)?;
    let account_field = c.take(ACCOUNT_FIELD_WIDTH);
    let amount = c.signed_amount()?;
    let date = c.date(6)?;

    // без записи 1 структура счёта неизвестна
    let account = ctx
        .account_structure
        .map(|structure| Account::decode(structure, &account_field));

    Ok(NewBalance {
        sequence,
        account,
        amount,
        date,
    })
}

fn decode_movement_main(line: &str) -> Result<MovementRecord, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(2);
    let sequence = c.number(4)?;
    let detail_sequence = c.number(4)?;
    let reference_number = c.text(21);
    let amount = c.signed_amount()?;
    let value_date = c.date(6)?;
    let transaction_code = TransactionCode::from_raw(&c.take(8));
    let communication_kind = CommunicationKind::from(c.flag());
    let communication = c.take(53);
    let entry_date = c.date(6)?;
    let statement_sequence = c.number(3)?;
    let globalisation = c.text(1);
    let next_code = c.flag();
    c.skip(1);
    let link_code = c.flag();

    Ok(MovementRecord {
        sequence,
        detail_sequence,
        part: MovementPart::Main {
            reference_number,
            amount,
            value_date,
            transaction_code,
            communication_kind,
            communication,
            entry_date,
            statement_sequence,
            globalisation,
        },
        next_code,
        link_code,
    })
}

fn decode_movement_detail(line: &str) -> Result<MovementRecord, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(2);
    let sequence = c.number(4)?;
    let detail_sequence = c.number(4)?;
    let communication = c.take(53);
    let customer_reference = c.text(35);
    let counterparty_bic = c.text(11);
    c.skip(3);
    let r_transaction_type = c.text(1);
    let reason_return_code = c.text(4);
    let category_purpose = c.text(4);
    let purpose = c.text(4);
    let next_code = c.flag();
    c.skip(1);
    let link_code = c.flag();

    Ok(MovementRecord {
        sequence,
        detail_sequence,
        part: MovementPart::Detail {
            communication,
            customer_reference,
            counterparty_bic,
            r_transaction_type,
            reason_return_code,
            category_purpose,
            purpose,
        },
        next_code,
        link_code,
    })
}

fn decode_movement_counterparty(line: &str) -> Result<MovementRecord, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(2);
    let sequence = c.number(4)?;
    let detail_sequence = c.number(4)?;
    let counterparty_account = c.text(ACCOUNT_FIELD_WIDTH);
    let counterparty_name = c.text(35);
    let communication = c.take(43);
    let next_code = c.flag();
    c.skip(1);
    let link_code = c.flag();

    Ok(MovementRecord {
        sequence,
        detail_sequence,
        part: MovementPart::Counterparty {
            counterparty_account,
            counterparty_name,
            communication,
        },
        next_code,
        link_code,
    })
}

fn decode_information_main(line: &str) -> Result<InformationRecord, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(2);
    let sequence = c.number(4)?;
    let detail_sequence = c.number(4)?;
    let reference_number = c.text(21);
    let transaction_code = TransactionCode::from_raw(&c.take(8));
    let communication_kind = CommunicationKind::from(c.flag());
    let communication = c.take(73);
    c.skip(12);
    let next_code = c.flag();
    c.skip(1);
    let link_code = c.flag();

    Ok(InformationRecord {
        sequence,
        detail_sequence,
        part: InformationPart::Main {
            reference_number,
            transaction_code,
            communication_kind,
            communication,
        },
        next_code,
        link_code,
    })
}

/// 3.2 и 3.3 отличаются только шириной поля сообщения
fn decode_information_continuation(
    line: &str,
    width: usize,
) -> Result<InformationRecord, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(2);
    let sequence = c.number(4)?;
    let detail_sequence = c.number(4)?;
    let communication = c.take(width);
    // next_code всегда в колонке 125
    let filler = 125 - c.position();
    c.skip(filler);
    let next_code = c.flag();
    c.skip(1);
    let link_code = c.flag();

    Ok(InformationRecord {
        sequence,
        detail_sequence,
        part: InformationPart::Continuation { communication },
        next_code,
        link_code,
    })
}

fn decode_free_communication(line: &str) -> Result<FreeCommunicationRecord, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(2);
    let sequence = c.number(4)?;
    let detail_sequence = c.number(4)?;
    c.skip(22);
    let text = c.take(80);
    c.skip(15);
    let link_code = c.flag();

    Ok(FreeCommunicationRecord {
        sequence,
        detail_sequence,
        text,
        link_code,
    })
}

fn decode_trailer(line: &str) -> Result<Trailer, ParseError> {
    let mut c = FieldCursor::new(line);

    c.skip(16);
    let record_count = c.number(6)?;
    let debit = c.amount(15, 3)?;
    let credit = c.amount(15, 3)?;
    c.skip(75);
    let multiple_file = Coded::new(c.text(1));

    Ok(Trailer {
        record_count,
        debit,
        credit,
        multiple_file,
    })
}
