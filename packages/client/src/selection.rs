//! # Selection and analysis orchestration
//!
//! [`MapController`] owns the one active selection (point, radius, café type),
//! the description of the overlays the map widget should draw, and the latest
//! analysis and area-report data for that selection.
//!
//! ## Dispatch
//!
//! Changing the selection returns an [`AnalysisTicket`] when both a point and
//! a café type are known. The ticket is run against an [`AnalysisApi`] and the
//! resulting [`AnalysisCompletion`] handed back to
//! [`MapController::complete`]. Each ticket carries a sequence number; a
//! completion older than the newest dispatched ticket is discarded as
//! [`AnalysisOutcome::Stale`], so a slow response can never overwrite a newer
//! one. [`MapController::reset`] advances the sequence as well, which drops
//! anything still in flight when the session ends.
//!
//! [`MapController::analyze`] runs the whole cycle in place for callers that
//! never overlap requests.

use api::models::{AmenitiesReport, AreaPopulation, Cafe};
use api::{AnalysisApi, AnalysisRequest, AnalysisResponse, ApiError, AreaQuery, CafeType, LatLng};
use serde::Serialize;
use store::config::MapConfig;
use thiserror::Error;

use crate::report::{FullReport, ReportInputs};

/// Radius used until the slider is moved.
pub const DEFAULT_RADIUS_M: u32 = 500;

/// The user's current choice on the map page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub point: LatLng,
    pub radius_m: u32,
    pub cafe_type: Option<CafeType>,
}

/// Analysis radius circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub center: LatLng,
    pub radius_m: u32,
}

/// A café from the latest analysis, positioned on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CafeMarker {
    pub position: LatLng,
    pub name: String,
    pub cafe_type: Option<String>,
    pub rating: Option<f64>,
    pub review_count: u32,
}

impl CafeMarker {
    fn from_cafe(cafe: &Cafe) -> Option<Self> {
        Some(Self {
            position: cafe.position()?,
            name: cafe.name.clone(),
            cafe_type: cafe.cafe_type.clone(),
            rating: cafe.rating,
            review_count: cafe.review_count.unwrap_or(0),
        })
    }
}

/// Everything the map widget draws. `revision` increases with every change so
/// the widget can replace its layers in one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overlays {
    pub revision: u64,
    pub marker: Option<LatLng>,
    pub circle: Option<Circle>,
    pub cafes: Vec<CafeMarker>,
}

/// Why the latest analysis produced no results.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Unreachable(String),
    #[error("{0}")]
    Unexpected(String),
}

impl From<ApiError> for AnalysisError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } => AnalysisError::Rejected(message),
            err @ ApiError::Unreachable { .. } => AnalysisError::Unreachable(err.to_string()),
            err => AnalysisError::Unexpected(err.to_string()),
        }
    }
}

/// A dispatched analysis request.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a ticket does nothing until it is run and completed"]
pub struct AnalysisTicket {
    pub seq: u64,
    pub request: AnalysisRequest,
}

impl AnalysisTicket {
    pub async fn run<A: AnalysisApi>(self, api: &A) -> AnalysisCompletion {
        let result = api.request_analysis(&self.request).await;
        AnalysisCompletion {
            seq: self.seq,
            request: self.request,
            result,
        }
    }
}

/// Backend answer to an [`AnalysisTicket`].
#[derive(Debug)]
pub struct AnalysisCompletion {
    pub seq: u64,
    pub request: AnalysisRequest,
    pub result: Result<AnalysisResponse, ApiError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Updated,
    Failed(AnalysisError),
    /// A newer request was dispatched (or the selection was reset) first.
    Stale,
}

/// Result of a map click.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSelected {
    Analyze(AnalysisTicket),
    /// No café type chosen yet; the user should be prompted.
    NeedsCategory,
}

/// Area report request for the current point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use = "a ticket does nothing until it is run and completed"]
pub struct ReportTicket {
    pub seq: u64,
    pub query: AreaQuery,
}

impl ReportTicket {
    /// Fetch amenities and population. Either may fail; a failure leaves that
    /// section out of the report.
    pub async fn run<A: AnalysisApi>(self, api: &A) -> ReportCompletion {
        let amenities = match api.amenities_report(&self.query).await {
            Ok(report) => Some(report),
            Err(err) => {
                tracing::warn!("amenities report unavailable: {}", err);
                None
            }
        };
        let population = match api.area_population(&self.query).await {
            Ok(population) => Some(population),
            Err(err) => {
                tracing::warn!("area population unavailable: {}", err);
                None
            }
        };
        ReportCompletion {
            seq: self.seq,
            query: self.query,
            amenities,
            population,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportCompletion {
    pub seq: u64,
    pub query: AreaQuery,
    pub amenities: Option<AmenitiesReport>,
    pub population: Option<AreaPopulation>,
}

#[derive(Debug, Clone, PartialEq)]
struct AreaData {
    query: AreaQuery,
    amenities: Option<AmenitiesReport>,
    population: Option<AreaPopulation>,
}

/// Owner of the map selection and everything derived from it.
pub struct MapController<A> {
    api: A,
    active: bool,
    min_radius_m: u32,
    max_radius_m: u32,
    point: Option<LatLng>,
    radius_m: u32,
    cafe_type: Option<CafeType>,
    overlays: Overlays,
    latest: Option<(AnalysisRequest, AnalysisResponse)>,
    error: Option<AnalysisError>,
    dispatched: u64,
    in_flight: Option<u64>,
    area: Option<AreaData>,
    report_seq: u64,
}

impl<A: AnalysisApi> MapController<A> {
    pub fn new(api: A) -> Self {
        Self::with_config(api, &MapConfig::default())
    }

    pub fn with_config(api: A, config: &MapConfig) -> Self {
        Self {
            api,
            active: false,
            min_radius_m: config.min_radius_m,
            max_radius_m: config.max_radius_m,
            point: None,
            radius_m: config.default_radius_m,
            cafe_type: None,
            overlays: Overlays::default(),
            latest: None,
            error: None,
            dispatched: 0,
            in_flight: None,
            area: None,
            report_seq: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Mark the map as in use. Called when a session starts.
    pub fn activate(&mut self) {
        if !self.active {
            tracing::debug!("map activated");
            self.active = true;
        }
    }

    /// Clear everything and mark the map unused. Called when a session ends.
    pub fn release(&mut self) {
        self.reset();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn selection(&self) -> Option<Selection> {
        Some(Selection {
            point: self.point?,
            radius_m: self.radius_m,
            cafe_type: self.cafe_type,
        })
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    pub fn cafe_type(&self) -> Option<CafeType> {
        self.cafe_type
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    /// Latest applied analysis.
    pub fn latest(&self) -> Option<&AnalysisResponse> {
        self.latest.as_ref().map(|(_, response)| response)
    }

    /// Error from the latest analysis, shown inline in the results panel.
    pub fn analysis_error(&self) -> Option<&AnalysisError> {
        self.error.as_ref()
    }

    /// Whether the newest dispatched analysis is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replace the selected point.
    pub fn select_point(&mut self, lat: f64, lng: f64) -> PointSelected {
        let point = LatLng::new(lat, lng);
        self.point = Some(point);
        self.invalidate_area();
        self.overlays = Overlays {
            revision: self.overlays.revision + 1,
            marker: Some(point),
            circle: Some(Circle {
                center: point,
                radius_m: self.radius_m,
            }),
            cafes: Vec::new(),
        };

        match self.begin_analysis() {
            Some(ticket) => PointSelected::Analyze(ticket),
            None => PointSelected::NeedsCategory,
        }
    }

    pub fn set_category(&mut self, cafe_type: CafeType) -> Option<AnalysisTicket> {
        self.cafe_type = Some(cafe_type);
        self.begin_analysis()
    }

    /// Resize the circle while the slider is being dragged.
    pub fn preview_radius(&mut self, meters: u32) {
        let radius_m = meters.clamp(self.min_radius_m, self.max_radius_m);
        if radius_m != self.radius_m {
            self.invalidate_area();
        }
        self.radius_m = radius_m;
        if let Some(circle) = self.overlays.circle.as_mut() {
            circle.radius_m = self.radius_m;
            self.overlays.revision += 1;
        }
    }

    /// Commit a radius and re-run the analysis for the current point.
    pub fn set_radius(&mut self, meters: u32) -> Option<AnalysisTicket> {
        self.preview_radius(meters);
        self.begin_analysis()
    }

    /// Dispatch an analysis for the current selection, if it is complete.
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        let point = self.point?;
        let cafe_type = self.cafe_type?;
        self.dispatched += 1;
        self.in_flight = Some(self.dispatched);
        Some(AnalysisTicket {
            seq: self.dispatched,
            request: AnalysisRequest {
                lat: point.lat,
                lng: point.lng,
                cafe_type,
                radius: self.radius_m,
            },
        })
    }

    /// Apply a completed analysis unless a newer one has been dispatched.
    pub fn complete(&mut self, completion: AnalysisCompletion) -> AnalysisOutcome {
        if completion.seq != self.dispatched {
            tracing::debug!(
                seq = completion.seq,
                latest = self.dispatched,
                "discarding stale analysis"
            );
            return AnalysisOutcome::Stale;
        }
        self.in_flight = None;

        match completion.result {
            Ok(response) => {
                self.overlays.cafes = response.top5.iter().filter_map(CafeMarker::from_cafe).collect();
                self.overlays.revision += 1;
                self.latest = Some((completion.request, response));
                self.error = None;
                AnalysisOutcome::Updated
            }
            Err(err) => {
                tracing::warn!("analysis failed: {}", err);
                let err = AnalysisError::from(err);
                self.latest = None;
                self.overlays.cafes.clear();
                self.overlays.revision += 1;
                self.error = Some(err.clone());
                AnalysisOutcome::Failed(err)
            }
        }
    }

    /// Analyse the current selection and apply the result. `None` without a
    /// point or café type; no request is made in that case.
    pub async fn analyze(&mut self) -> Option<AnalysisOutcome> {
        let ticket = self.begin_analysis()?;
        let completion = ticket.run(&self.api).await;
        Some(self.complete(completion))
    }

    /// Clear selection, overlays, and cached responses.
    pub fn reset(&mut self) {
        self.point = None;
        self.cafe_type = None;
        self.overlays = Overlays {
            revision: self.overlays.revision + 1,
            ..Overlays::default()
        };
        self.latest = None;
        self.error = None;
        self.area = None;
        // Invalidate whatever is still in flight.
        self.dispatched += 1;
        self.in_flight = None;
        self.report_seq += 1;
    }

    /// Drop area data and supersede any report fetch still running.
    fn invalidate_area(&mut self) {
        self.area = None;
        self.report_seq += 1;
    }

    /// Start fetching the area report for the current point.
    pub fn begin_report(&mut self) -> Option<ReportTicket> {
        let point = self.point?;
        self.report_seq += 1;
        Some(ReportTicket {
            seq: self.report_seq,
            query: AreaQuery {
                lat: point.lat,
                lng: point.lng,
                radius: self.radius_m,
            },
        })
    }

    /// Keep fetched area data. Returns `false` for a superseded fetch.
    pub fn complete_report(&mut self, completion: ReportCompletion) -> bool {
        if completion.seq != self.report_seq {
            return false;
        }
        self.area = Some(AreaData {
            query: completion.query,
            amenities: completion.amenities,
            population: completion.population,
        });
        true
    }

    /// Fetch area data and build the full report in place.
    pub async fn fetch_report(&mut self) -> Option<FullReport> {
        let ticket = self.begin_report()?;
        let completion = ticket.run(&self.api).await;
        self.complete_report(completion);
        self.full_report()
    }

    /// Full report built from retained data. `None` without a point.
    pub fn full_report(&self) -> Option<FullReport> {
        let selection = self.selection()?;
        let area = self.area.as_ref().filter(|area| {
            area.query.lat == selection.point.lat
                && area.query.lng == selection.point.lng
                && area.query.radius == selection.radius_m
        });
        // An analysis for an earlier point or radius does not describe this one.
        let analysis = self
            .latest
            .as_ref()
            .filter(|(request, _)| {
                request.lat == selection.point.lat
                    && request.lng == selection.point.lng
                    && request.radius == selection.radius_m
                    && Some(request.cafe_type) == selection.cafe_type
            })
            .map(|(_, response)| response);
        Some(FullReport::build(ReportInputs {
            selection,
            analysis,
            amenities: area.and_then(|area| area.amenities.as_ref()),
            population: area.and_then(|area| area.population.as_ref()),
        }))
    }
}
