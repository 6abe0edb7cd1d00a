pub mod dates;
pub mod draft;
pub mod error;
pub mod events;
pub mod form;
pub mod list;
pub mod mode;
pub mod ports;
pub mod validator;
