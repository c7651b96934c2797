//! Expenses, their per-person allocations, and attached invoice PDFs.

mod allocation;
mod api;
mod core;
mod db;
mod invoice;
mod query;

pub use allocation::{
    Allocation, create_expense_allocation_table, get_allocations, replace_allocations,
};
pub use api::{
    create_expense_endpoint, delete_expense_endpoint, download_invoice_endpoint,
    get_allocations_endpoint, get_expense_endpoint, list_expenses_endpoint,
    replace_allocations_endpoint, update_expense_endpoint, upload_invoice_endpoint,
};
pub use core::{Expense, ExpenseId, create_expense_table, map_expense_row};
pub use db::{
    ExpenseQuery, create_expense, delete_expense, get_expense, get_expenses, update_expense,
};
pub use invoice::{Invoice, create_invoice_table, get_invoice, insert_invoice};
pub use query::{RangeTotals, count_in_range, sum_in_range, totals_in_range};
