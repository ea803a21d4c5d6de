//! Top page: the signed-in user's schedules, or a landing page.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;

use crate::domain::Schedule;
use crate::inbound::http::error::PageResult;
use crate::inbound::http::session::{SessionContext, SessionUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views;

#[derive(Serialize)]
struct ScheduleSummary {
    id: String,
    name: String,
    updated_at: String,
}

impl From<&Schedule> for ScheduleSummary {
    fn from(schedule: &Schedule) -> Self {
        Self {
            id: schedule.id.to_string(),
            name: schedule.name.as_str().to_owned(),
            updated_at: views::display_timestamp(&schedule.updated_at),
        }
    }
}

#[derive(Serialize)]
struct IndexPage {
    user: Option<SessionUser>,
    schedules: Vec<ScheduleSummary>,
}

/// Render the top page.
#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> PageResult<HttpResponse> {
    let page = match session.current_user()? {
        Some(user) => {
            let schedules = state.schedules_query.owned_schedules(user.id()).await?;
            IndexPage {
                user: Some(SessionUser::from(&user)),
                schedules: schedules.iter().map(ScheduleSummary::from).collect(),
            }
        }
        None => IndexPage {
            user: None,
            schedules: Vec::new(),
        },
    };
    Ok(views::page("index.html", &page)?)
}
