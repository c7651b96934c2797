//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/loans/{loan_id}', use
//! [format_endpoint].

/// The route to list or create payment methods.
pub const PAYMENT_METHODS: &str = "/api/payment-methods";
/// The route to access a single payment method.
pub const PAYMENT_METHOD: &str = "/api/payment-methods/{payment_method_id}";
/// The route to list a credit card's previous billing cycles with aggregates.
pub const BILLING_CYCLES: &str = "/api/payment-methods/{payment_method_id}/billing-cycles";
/// The route to get a credit card's current statement balance.
pub const STATEMENT_BALANCE: &str = "/api/payment-methods/{payment_method_id}/statement-balance";
/// The route to list or record payments made against a credit card.
pub const CARD_PAYMENTS: &str = "/api/payment-methods/{payment_method_id}/payments";
/// The route to list or upload credit card statement documents.
pub const STATEMENTS: &str = "/api/payment-methods/{payment_method_id}/statements";
/// The route to download a statement document.
pub const STATEMENT_FILE: &str = "/api/statements/{statement_id}/file";
/// The route to list or create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to access a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to get or replace an expense's per-person allocations.
pub const EXPENSE_ALLOCATIONS: &str = "/api/expenses/{expense_id}/allocations";
/// The route to upload or download an expense's invoice PDF.
pub const EXPENSE_INVOICE: &str = "/api/expenses/{expense_id}/invoice";
/// The route to list or create people.
pub const PEOPLE: &str = "/api/people";
/// The route to access a single person.
pub const PERSON: &str = "/api/people/{person_id}";
/// The route to list or create loans.
pub const LOANS: &str = "/api/loans";
/// The route to access a single loan.
pub const LOAN: &str = "/api/loans/{loan_id}";
/// The route to get a loan's balance summary.
pub const LOAN_CALCULATED_BALANCE: &str = "/api/loans/{loan_id}/calculated-balance";
/// The route to get a loan's running balance after each payment.
pub const LOAN_PAYMENT_BALANCE_HISTORY: &str = "/api/loans/{loan_id}/payment-balance-history";
/// The route to list or record payments against a loan.
pub const LOAN_PAYMENTS: &str = "/api/loans/{loan_id}/payments";
/// The route to delete a single loan payment.
pub const LOAN_PAYMENT: &str = "/api/loan-payments/{loan_payment_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/loans/{loan_id}', '{loan_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
