pub mod run;
pub mod users;
