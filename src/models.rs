pub mod auth;
pub mod call_center;
pub mod dashboard;
pub mod nichos;
pub mod page;
pub mod perfiles;
pub mod tecnicos;
