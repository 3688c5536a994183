//! Справочники CODA "код -> описание".
//!
//! Каждый справочник - это `match` с обязательной веткой `_`: неизвестный
//! код не ошибка, а описание [`UNKNOWN`].

use log::debug;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Описание для кода, которого нет в справочнике
pub const UNKNOWN: &str = "Unknown";

/// Справочник кодов
pub trait Codebook {
    /// имя справочника, для логов
    const NAME: &'static str;

    /// `None`, если кода в справочнике нет
    fn lookup(code: &str) -> Option<&'static str>;
}

/// Описание кода или [`UNKNOWN`]
pub fn describe<C: Codebook>(code: &str) -> &'static str {
    C::lookup(code).unwrap_or_else(|| {
        debug!("unknown {} code '{code}'", C::NAME);
        UNKNOWN
    })
}

/// Код из справочника `C`. Хранится только сам код, описание вычисляется по запросу.
#[derive(Clone, PartialEq, Eq)]
pub struct Coded<C> {
    code: String,
    book: PhantomData<C>,
}

impl<C: Codebook> Coded<C> {
    pub fn new(code: impl Into<String>) -> Self {
        Coded {
            code: code.into(),
            book: PhantomData,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &'static str {
        describe::<C>(&self.code)
    }
}

impl<C: Codebook> fmt::Debug for Coded<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", C::NAME, self.code)
    }
}

impl<C: Codebook> Serialize for Coded<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Coded", 2)?;
        s.serialize_field("code", &self.code)?;
        s.serialize_field("description", self.description())?;
        s.end()
    }
}

macro_rules! codebook {
    ($(#[$doc:meta])* $name:ident, $label:literal { $($code:literal => $desc:literal,)* }) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq)]
        pub enum $name {}

        impl Codebook for $name {
            const NAME: &'static str = $label;

            fn lookup(code: &str) -> Option<&'static str> {
                match code {
                    $($code => Some($desc),)*
                    _ => None,
                }
            }
        }
    };
}

codebook! {
    /// Структура номера счёта (0-3)
    AccountStructures, "account structure" {
        "0" => "Belgian account number",
        "1" => "Foreign account number",
        "2" => "IBAN of the Belgian account number",
        "3" => "IBAN of the foreign account number",
    }
}

codebook! {
    /// Тип кода операции (первая цифра)
    TransactionTypes, "transaction type" {
        "0" => "Simple amount without detailed data",
        "1" => "Amount as totalised by the customer",
        "2" => "Amount as totalised by the bank",
        "3" => "Simple amount with detailed data",
        "5" => "Detail of 1",
        "6" => "Detail of 2",
        "7" => "Detail of 2, simple amount without detailed data",
        "8" => "Detail of 3",
        "9" => "Detail of 7",
    }
}

codebook! {
    /// Семейство операций
    TransactionFamilies, "transaction family" {
        "00" => "Undefined transactions",
        "01" => "Domestic or local SEPA credit transfers",
        "02" => "Instant SEPA credit transfer",
        "03" => "Cheques",
        "04" => "Cards",
        "05" => "Direct debit",
        "07" => "Domestic commercial paper",
        "09" => "Counter transactions",
        "11" => "Securities",
        "13" => "Credit",
        "30" => "Various transactions",
        "35" => "Closing (periodical settlements for interest, costs,...)",
        "41" => "International credit transfers - non-SEPA credit transfers",
        "43" => "Foreign cheques",
        "47" => "Foreign commercial paper",
        "49" => "Foreign counter transactions",
        "80" => "Separately charged costs and provisions",
    }
}

codebook! {
    /// Операция внутри семейства, ключ - семейство и операция подряд ("0150")
    Transactions, "transaction" {
        "0101" => "Individual transfer order",
        "0102" => "Individual transfer order initiated by the bank",
        "0103" => "Standing order",
        "0105" => "Payment of wages, etc.",
        "0107" => "Collective transfer",
        "0113" => "Transfer from your account",
        "0117" => "Financial centralisation",
        "0137" => "Costs",
        "0139" => "Your issue circular cheque",
        "0149" => "Cancellation or correction",
        "0150" => "Transfer in your favour",
        "0151" => "Transfer in your favour - initiated by the bank",
        "0152" => "Payment in your favour",
        "0154" => "Unexecutable transfer order",
        "0160" => "Non-presented circular cheque",
        "0162" => "Unpaid postal order",
        "0164" => "Transfer to your account",
        "0166" => "Financial centralisation",
        "0187" => "Reimbursement of costs",
        "0199" => "Cancellation or correction",
        "0301" => "Payment of your cheque",
        "0305" => "Payment of voucher",
        "0337" => "Costs",
        "0352" => "First credit of cheques, vouchers, luncheon vouchers, postal orders, credit under usual reserve",
        "0358" => "Remittance of cheques, vouchers, etc. credit after collection",
        "0401" => "Loading a GSM card",
        "0402" => "Payment by means of a payment card within the Eurozone",
        "0403" => "Settlement credit cards",
        "0404" => "Cash withdrawal from an ATM",
        "0405" => "Loading Proton",
        "0406" => "Payment with tank card",
        "0407" => "Payment by GSM",
        "0408" => "Payment by means of a payment card outside the Eurozone",
        "0437" => "Costs",
        "0450" => "Credit after a payment at a terminal",
        "0451" => "Unloading Proton",
        "0452" => "Loading GSM cards",
        "0453" => "Cash deposit at an ATM",
        "0455" => "Income from payments by GSM",
        "0468" => "Credit after Proton payments",
        "0487" => "Reimbursement of costs",
        "0501" => "Payment",
        "0503" => "Unpaid debt",
        "0505" => "Reimbursement",
        "0537" => "Costs",
        "0550" => "Credit after collection",
        "0552" => "Credit under usual reserve",
        "0554" => "Reimbursement",
        "0556" => "Unexecutable reimbursement",
        "0558" => "Reversal",
        "0587" => "Reimbursement of costs",
        "0901" => "Cash withdrawal",
        "0950" => "Cash payment",
        "3001" => "Spot purchase of foreign exchange",
        "3003" => "Forward purchase of foreign exchange",
        "3050" => "Spot sale of foreign exchange",
        "3052" => "Forward sale of foreign exchange",
        "3054" => "Capital and/or interest term investment",
        "3055" => "Interest term investment",
        "3501" => "Closing",
        "3537" => "Costs",
        "3550" => "Closing",
        "8002" => "Costs relating to electronic output",
        "8009" => "Postage",
        "8013" => "Renting of safes",
        "8017" => "Charging fees for transactions",
        "8027" => "Subscription fee",
        "8029" => "Information charges",
        "8033" => "Miscellaneous fees and commissions",
        "8037" => "Access right to database",
        "8049" => "Cancellation or correction",
        "8099" => "Cancellation or correction",
    }
}

codebook! {
    /// Категория (последние три цифры кода операции)
    TransactionCategories, "transaction category" {
        "000" => "Net amount",
        "001" => "Data charges",
        "002" => "Building maintenance",
        "003" => "Telecommunications",
        "008" => "Information charges",
        "009" => "Travelling expenses",
        "010" => "Writ service fee",
        "011" => "VAT",
        "013" => "Payment commission",
        "017" => "Research costs",
        "019" => "Tax on physical delivery",
        "021" => "Costs for drawing up a bank cheque",
        "025" => "Individual entry for exchange charges",
        "027" => "Charges for unpaid bills",
        "037" => "Commission for handling charges",
        "049" => "Fiscal stamps/stamp duty",
        "050" => "Capital term investment",
        "051" => "Withholding tax",
        "052" => "Residence state tax",
        "055" => "Repayment loan or credit capital",
        "057" => "Interest subsidy",
        "058" => "Capital premium",
        "059" => "Default interest",
        "100" => "Gross amount",
    }
}

codebook! {
    /// Типы структурированных сообщений в записях движений (2.x)
    MovementCommunicationTypes, "movement communication type" {
        "100" => "Payment with a structured format communication applying the ISO standard 11649",
        "101" => "Credit transfer or cash payment with structured format communication",
        "102" => "Credit transfer or cash payment with reconstituted structured format communication",
        "103" => "Number (e.g. of the cheque, of the card, etc.)",
        "104" => "Equivalent in EUR",
        "105" => "Original amount of the transaction",
        "106" => "Method of calculation (VAT, withholding tax on income, commission, etc.)",
        "107" => "Direct debit - DOM'80",
        "108" => "Closing",
        "111" => "POS credit - Globalisation",
        "113" => "ATM/POS debit",
        "121" => "Commercial bills",
        "122" => "Bills - calculation of interest",
        "123" => "Fees and commissions",
        "124" => "Number of the credit card",
        "125" => "Credit",
        "126" => "Term investments",
        "127" => "European direct debit (SEPA)",
    }
}

codebook! {
    /// Типы структурированных сообщений в информационных записях (3.x)
    InformationCommunicationTypes, "information communication type" {
        "001" => "Data concerning the counterparty",
        "002" => "Communication of the bank",
        "006" => "Information concerning the detail amount",
        "007" => "Information concerning the detail cash",
        "008" => "Identification of the ultimate beneficiary/creditor (SEPA SCT/SDD)",
        "009" => "Identification of the ultimate ordering customer/debtor (SEPA SCT/SDD)",
        "010" => "Information pertaining to sale or purchase of securities",
        "011" => "Information pertaining to coupons",
    }
}

codebook! {
    CardSchemes, "card scheme" {
        "1" => "Bancontact/Mister Cash",
        "2" => "Maestro",
        "3" => "Private",
        "5" => "TINA",
        "9" => "Other",
    }
}

codebook! {
    PosTransactionTypes, "POS transaction type" {
        "0" => "Cumulative",
        "1" => "Withdrawal",
        "2" => "Proton loading",
        "3" => "Reimbursement Proton balance",
        "4" => "Reversal of purchases",
        "5" => "POS transaction",
        "7" => "Purchase of gift voucher",
        "8" => "Outside network",
        "9" => "Other",
    }
}

codebook! {
    /// Коды топлива и товаров для оплат на АЗС
    ProductCodes, "product code" {
        "00" => "Unset",
        "01" => "Premium with lead substitute",
        "02" => "Europremium",
        "03" => "Diesel",
        "04" => "LPG",
        "06" => "Premium plus 98 oct",
        "07" => "Regular unleaded",
        "08" => "Domestic fuel oil",
        "09" => "Lubricants",
        "10" => "Petrol",
        "11" => "Premium 99+",
        "12" => "Avgas",
        "16" => "Other types",
    }
}

codebook! {
    DirectDebitTypes, "direct debit type" {
        "0" => "Unspecified",
        "1" => "Recurrent",
        "2" => "One-off",
        "3" => "1-st (recurrent)",
        "4" => "Last (recurrent)",
    }
}

codebook! {
    DirectDebitSchemes, "direct debit scheme" {
        "0" => "Unspecified",
        "1" => "SEPA core",
        "2" => "SEPA B2B",
    }
}

codebook! {
    /// Результат исполнения SEPA-инкассо
    PaidOrRefusedCodes, "paid or refused code" {
        "0" => "Paid",
        "1" => "Technical problem",
        "2" => "Reason not specified",
        "3" => "Debtor disagrees",
        "4" => "Debtor's account problem",
    }
}

codebook! {
    /// Статус инкассо DOM'80
    Dom80SettlementCodes, "DOM'80 settlement code" {
        "0" => "Direct debit settled",
        "1" => "Direct debit unpaid",
    }
}

codebook! {
    RTransactionTypes, "R transaction type" {
        "1" => "Reject",
        "2" => "Return",
        "3" => "Refund",
        "4" => "Reversal",
        "5" => "Cancellation",
    }
}

codebook! {
    MinimumApplicableCodes, "minimum applicable code" {
        "1" => "Minimum applicable",
        "2" => "Minimum not applicable",
    }
}

codebook! {
    SecuritiesCodeTypes, "securities code type" {
        "1" => "ISIN code",
        "2" => "Belgian code",
        "3" => "Other code",
    }
}

codebook! {
    IssuingInstitutions, "issuing institution" {
        "1" => "Mastercard",
        "2" => "Visa",
        "3" => "American Express",
        "4" => "Diners Club",
        "9" => "Other",
    }
}

codebook! {
    GlobalisationCodes, "globalisation code" {
        "0" => "No globalisation",
        "1" => "Globalisation level 1",
        "2" => "Globalisation level 2",
        "3" => "Globalisation level 3",
        "4" => "Globalisation level 4",
        "5" => "Globalisation level 5",
        "6" => "Globalisation level 6",
        "7" => "Globalisation level 7",
        "8" => "Globalisation level 8",
        "9" => "Globalisation level 9",
    }
}

codebook! {
    /// Признак последнего файла в трейлере
    MultipleFileCodes, "multiple file code" {
        "1" => "Another file is following",
        "2" => "Last file",
    }
}
