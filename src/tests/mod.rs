mod auth_tests;
mod common;
mod pick_tests;
