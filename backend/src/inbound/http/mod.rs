//! HTTP inbound adapter: server-rendered pages, the attendance JSON
//! endpoints, OAuth login, and health probes.

pub mod availabilities;
pub mod comments;
pub mod error;
pub mod health;
pub mod index;
pub mod login;
pub mod schedules;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod views;

use actix_web::web;

use crate::domain::Error;

pub use error::{ApiResult, JsonError, PageError, PageResult};

/// JSON body settings that report malformed payloads in the `NG` envelope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        JsonError::from(Error::invalid_request(format!("malformed JSON body: {err}"))).into()
    })
}

/// Register every page, JSON endpoint and probe.
///
/// `/schedules/new` is registered ahead of `/schedules/{schedule_id}` so the
/// literal segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(index::index)
        .service(login::login_page)
        .service(login::logout)
        .service(login::start_oauth)
        .service(login::oauth_callback)
        .service(schedules::new_schedule)
        .service(schedules::create_schedule)
        .service(schedules::show_schedule)
        .service(schedules::edit_schedule)
        .service(schedules::update_schedule)
        .service(schedules::delete_schedule)
        .service(availabilities::set_availability)
        .service(comments::set_comment)
        .service(health::ready)
        .service(health::live);
}
