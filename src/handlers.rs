pub mod auth;
pub mod crud;
pub mod dashboard;
pub mod perfiles;
pub mod tecnicos;
