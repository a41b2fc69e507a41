pub mod fails;
pub mod form;
pub mod login;
