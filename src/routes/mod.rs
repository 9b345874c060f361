pub mod sms;

pub use sms::configure_sms_routes;
