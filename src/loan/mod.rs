//! Loans and the payments made against them.

mod api;
mod balance;
mod core;
mod db;

pub use api::{
    create_loan_endpoint, create_loan_payment_endpoint, delete_loan_endpoint,
    delete_loan_payment_endpoint, get_calculated_balance_endpoint, get_loan_endpoint,
    get_payment_balance_history_endpoint, list_loan_payments_endpoint, list_loans_endpoint,
    update_loan_endpoint,
};
pub use balance::{BalancePoint, LoanBalance, calculated_balance, payment_balance_history};
pub use core::{
    Loan, LoanId, LoanKind, LoanPayment, LoanPaymentId, create_loan_payment_table,
    create_loan_table,
};
pub use db::{
    create_loan, delete_loan, delete_loan_payment, get_all_loans, get_loan, get_loan_payments,
    record_loan_payment, update_loan,
};
