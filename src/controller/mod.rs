pub(crate) mod document_controller;
pub(crate) mod health_check_controller;
