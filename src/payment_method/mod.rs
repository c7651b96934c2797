//! Payment methods: cash, debit, cheque, and credit cards.
//!
//! Credit cards additionally carry a billing cycle day which anchors the
//! [billing cycle](crate::billing) computations.

mod api;
mod core;
mod db;

pub use api::{
    create_payment_method_endpoint, delete_payment_method_endpoint, get_payment_method_endpoint,
    list_payment_methods_endpoint, update_payment_method_endpoint,
};
pub use core::{
    PaymentMethod, PaymentMethodId, PaymentMethodKind, create_payment_method_table,
    map_payment_method_row, validate_cycle_day,
};
pub use db::{
    create_payment_method, delete_payment_method, get_all_payment_methods, get_payment_method,
    update_payment_method,
};
