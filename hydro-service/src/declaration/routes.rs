use crate::{
    axum::{EncodedId, Problem, ProblemConfig},
    declaration::{DayReport, DeclarationStoreError, LinkBuilder, LinkError, Revision, SharedDeclarationStore},
    utils::id_encoders::SharedIdEncoder,
};
use axum::{
    extract::{FromRef, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    links: LinkBuilder,
    store: SharedDeclarationStore,
    problem_config: ProblemConfig,
}

impl AppState {
    pub fn new(links: LinkBuilder, store: SharedDeclarationStore, problem_config: ProblemConfig) -> Self {
        Self {
            links,
            store,
            problem_config,
        }
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.links
    }
}

impl FromRef<AppState> for SharedIdEncoder {
    fn from_ref(state: &AppState) -> Self {
        state.links.encoder().clone()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReportSummary {
    pub plant: String,
    pub date: NaiveDate,
    pub link: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSummary {
    pub revision_no: u32,
    pub link: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReportPage {
    pub link: Url,
    pub plant: String,
    pub date: NaiveDate,
    pub generation_mwh: f64,
    pub declared_capacity_mw: f64,
    pub revisions: Vec<RevisionSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionPage {
    pub link: Url,
    pub day_report: Url,
    pub revision_no: u32,
    pub dispatch_mw: f64,
    pub acknowledged: bool,
}

fn store_problem(config: &ProblemConfig, err: DeclarationStoreError) -> Problem {
    log::error!("Declaration store failed: {err}");
    Problem::internal_error().with_confidential(config, |p| p, |p| p.with_detail_msg(err))
}

fn link_problem(config: &ProblemConfig, err: LinkError) -> Problem {
    log::error!("Link could not be created: {err}");
    Problem::internal_error().with_confidential(config, |p| p, |p| p.with_detail_msg(err))
}

/// A record missing for a decodable token gets the same answer as an invalid token.
fn missing_record() -> Problem {
    Problem::unauthorized()
}

async fn list_day_reports(State(state): State<AppState>) -> Result<Json<Vec<DayReportSummary>>, Problem> {
    let reports = state
        .store
        .list_day_reports()
        .await
        .map_err(|err| store_problem(&state.problem_config, err))?;

    let summaries = reports
        .into_iter()
        .map(|report| {
            Ok(DayReportSummary {
                link: state.links.day_report(report.id)?,
                plant: report.plant,
                date: report.date,
            })
        })
        .collect::<Result<Vec<_>, LinkError>>()
        .map_err(|err| link_problem(&state.problem_config, err))?;

    Ok(Json(summaries))
}

async fn get_day_report(
    State(state): State<AppState>,
    EncodedId(id): EncodedId,
) -> Result<Json<DayReportPage>, Problem> {
    let config = &state.problem_config;

    let report: DayReport = state
        .store
        .find_day_report(id)
        .await
        .map_err(|err| store_problem(config, err))?
        .ok_or_else(missing_record)?;
    let revisions = state
        .store
        .list_revisions(id)
        .await
        .map_err(|err| store_problem(config, err))?;

    let revisions = revisions
        .into_iter()
        .map(|revision| {
            Ok(RevisionSummary {
                revision_no: revision.revision_no,
                link: state.links.revision(revision.id)?,
            })
        })
        .collect::<Result<Vec<_>, LinkError>>()
        .map_err(|err| link_problem(config, err))?;

    Ok(Json(DayReportPage {
        link: state.links.day_report(report.id).map_err(|err| link_problem(config, err))?,
        plant: report.plant,
        date: report.date,
        generation_mwh: report.generation_mwh,
        declared_capacity_mw: report.declared_capacity_mw,
        revisions,
    }))
}

async fn get_revision(State(state): State<AppState>, EncodedId(id): EncodedId) -> Result<Json<RevisionPage>, Problem> {
    let config = &state.problem_config;

    let revision: Revision = state
        .store
        .find_revision(id)
        .await
        .map_err(|err| store_problem(config, err))?
        .ok_or_else(missing_record)?;

    Ok(Json(RevisionPage {
        link: state.links.revision(revision.id).map_err(|err| link_problem(config, err))?,
        day_report: state
            .links
            .day_report(revision.day_report_id)
            .map_err(|err| link_problem(config, err))?,
        revision_no: revision.revision_no,
        dispatch_mw: revision.dispatch_mw,
        acknowledged: revision.acknowledged,
    }))
}

/// Pages of the declarations, addressed by id tokens.
pub fn declaration_router() -> Router<AppState> {
    Router::new()
        .route("/declaration/day", get(list_day_reports))
        .route("/declaration/day/:token", get(get_day_report))
        .route("/declaration/revision/:token", get(get_revision))
}
