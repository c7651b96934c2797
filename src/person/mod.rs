//! Household members that expenses can be split between.

mod api;
mod core;
mod db;

pub use api::{
    create_person_endpoint, delete_person_endpoint, get_person_endpoint, list_people_endpoint,
    update_person_endpoint,
};
pub use core::{Person, PersonId, create_person_table};
pub use db::{create_person, delete_person, get_all_people, get_person, update_person};
