pub mod identity;
pub mod session;
pub mod crud_view;
pub mod page;
pub mod nichos_service;
pub mod tecnicos_service;
pub mod call_center_service;
pub mod perfiles_service;
pub mod dashboard_service;
