//! Credit card billing: cycle date math, statement balances, cycle history,
//! payments against a card, and uploaded statement documents.

mod api;
mod archive;
mod cycle;
mod payment;
mod statement;

pub use api::{
    create_card_payment_endpoint, download_statement_file_endpoint, get_billing_cycles_endpoint,
    get_statement_balance_endpoint, list_card_payments_endpoint, list_statements_endpoint,
    upload_statement_endpoint,
};
pub use archive::{
    Statement, StatementId, create_statement_table, get_statement, get_statements,
    insert_statement,
};
pub use cycle::{BillingCycle, current_cycle, previous_cycles};
pub use payment::{
    CardPayment, CardPaymentId, create_card_payment_table, get_card_payments,
    record_card_payment, sum_card_payments_in_range,
};
pub use statement::{
    CycleSummary, StatementBalance, previous_billing_cycles, statement_balance,
};
