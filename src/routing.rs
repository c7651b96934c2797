//! Assembles the application's routes.

use axum::{
    Router,
    routing::{delete, get},
};
use crate::{AppState, billing, endpoints, expense, loan, payment_method, person};

/// Build the application router with all API routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::PAYMENT_METHODS,
            get(payment_method::list_payment_methods_endpoint)
                .post(payment_method::create_payment_method_endpoint),
        )
        .route(
            endpoints::PAYMENT_METHOD,
            get(payment_method::get_payment_method_endpoint)
                .put(payment_method::update_payment_method_endpoint)
                .delete(payment_method::delete_payment_method_endpoint),
        )
        .route(
            endpoints::BILLING_CYCLES,
            get(billing::get_billing_cycles_endpoint),
        )
        .route(
            endpoints::STATEMENT_BALANCE,
            get(billing::get_statement_balance_endpoint),
        )
        .route(
            endpoints::CARD_PAYMENTS,
            get(billing::list_card_payments_endpoint)
                .post(billing::create_card_payment_endpoint),
        )
        .route(
            endpoints::STATEMENTS,
            get(billing::list_statements_endpoint).post(billing::upload_statement_endpoint),
        )
        .route(
            endpoints::STATEMENT_FILE,
            get(billing::download_statement_file_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            get(expense::list_expenses_endpoint).post(expense::create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(expense::get_expense_endpoint)
                .put(expense::update_expense_endpoint)
                .delete(expense::delete_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE_ALLOCATIONS,
            get(expense::get_allocations_endpoint).put(expense::replace_allocations_endpoint),
        )
        .route(
            endpoints::EXPENSE_INVOICE,
            get(expense::download_invoice_endpoint).post(expense::upload_invoice_endpoint),
        )
        .route(
            endpoints::PEOPLE,
            get(person::list_people_endpoint).post(person::create_person_endpoint),
        )
        .route(
            endpoints::PERSON,
            get(person::get_person_endpoint)
                .put(person::update_person_endpoint)
                .delete(person::delete_person_endpoint),
        )
        .route(
            endpoints::LOANS,
            get(loan::list_loans_endpoint).post(loan::create_loan_endpoint),
        )
        .route(
            endpoints::LOAN,
            get(loan::get_loan_endpoint)
                .put(loan::update_loan_endpoint)
                .delete(loan::delete_loan_endpoint),
        )
        .route(
            endpoints::LOAN_CALCULATED_BALANCE,
            get(loan::get_calculated_balance_endpoint),
        )
        .route(
            endpoints::LOAN_PAYMENT_BALANCE_HISTORY,
            get(loan::get_payment_balance_history_endpoint),
        )
        .route(
            endpoints::LOAN_PAYMENTS,
            get(loan::list_loan_payments_endpoint).post(loan::create_loan_payment_endpoint),
        )
        .route(
            endpoints::LOAN_PAYMENT,
            delete(loan::delete_loan_payment_endpoint),
        )
        .with_state(state)
}
