//! Presentation tables for analysis results and the full area report.
//!
//! Everything here is pure: views hand in the structured responses kept by
//! [`crate::MapController`] and render the strings these functions produce.

use api::models::{AmenitiesReport, AreaPopulation, Cafe};
use api::AnalysisResponse;

use crate::selection::Selection;

const MISSING: &str = "-";
const NOT_AVAILABLE: &str = "N/A";
/// Names listed per amenity type before collapsing into "...and N more".
const AMENITY_PREVIEW: usize = 5;

/// Colour band of the score ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            ScoreBand::Poor
        } else if score < 70.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Good
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ScoreBand::Poor => "#e17055",
            ScoreBand::Fair => "#fdcb6e",
            ScoreBand::Good => "#00b894",
        }
    }
}

pub fn location_strength(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent – high success potential"
    } else if score >= 60.0 {
        "Good – moderate success potential"
    } else if score >= 40.0 {
        "Fair – consider improvements"
    } else {
        "Poor – high risk, explore alternatives"
    }
}

pub fn competition_level(competitors: u32) -> &'static str {
    if competitors < 5 {
        "Low competition – great opportunity"
    } else if competitors < 15 {
        "Moderate competition – viable market"
    } else {
        "High competition – saturated market"
    }
}

pub fn market_potential(density: f64) -> &'static str {
    if density > 15000.0 {
        "High population density – strong market"
    } else if density > 8000.0 {
        "Moderate density – decent market"
    } else {
        "Low density – limited foot traffic expected"
    }
}

pub fn recommendation(score: f64) -> &'static str {
    if score >= 60.0 {
        "✅ This location shows good potential for a café business."
    } else {
        "⚠️ Consider alternative locations with less competition or better road access."
    }
}

/// Round to a whole number and group thousands with commas.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// `0.873` → `"87.3%"`.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn amenity_title(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

fn competitors(analysis: &AnalysisResponse) -> Option<u32> {
    analysis.suitability.competitor_count.or(analysis.nearby_count)
}

/// One row of the top-5 list.
#[derive(Debug, Clone, PartialEq)]
pub struct CafeRow {
    pub name: String,
    pub rating: String,
}

impl CafeRow {
    fn from_cafe(cafe: &Cafe) -> Self {
        let rating = match cafe.rating {
            Some(rating) if rating > 0.0 => format!("⭐ {}", format_number(rating)),
            _ => NOT_AVAILABLE.to_string(),
        };
        Self {
            name: cafe.name.clone(),
            rating,
        }
    }
}

/// Text for the sidebar results panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPanel {
    pub score: String,
    /// Score used to fill the ring, 0 when absent.
    pub ring_score: f64,
    pub band: ScoreBand,
    pub prediction: String,
    pub confidence: String,
    pub competitors: String,
    pub road_length: String,
    pub population_density: String,
    pub cafes: Vec<CafeRow>,
}

impl ResultsPanel {
    pub fn from_analysis(analysis: &AnalysisResponse) -> Self {
        let suitability = &analysis.suitability;
        let prediction = &analysis.prediction;
        let score = suitability.score.filter(|score| *score != 0.0);
        let ring_score = score.unwrap_or(0.0);

        Self {
            score: score.map_or_else(|| MISSING.to_string(), format_number),
            ring_score,
            band: ScoreBand::from_score(ring_score),
            prediction: prediction
                .predicted_suitability
                .clone()
                .or_else(|| prediction.predicted_type.clone())
                .or_else(|| suitability.level.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            confidence: prediction
                .confidence
                .filter(|confidence| *confidence != 0.0)
                .map_or_else(|| NOT_AVAILABLE.to_string(), percent),
            competitors: competitors(analysis)
                .map_or_else(|| MISSING.to_string(), |count| count.to_string()),
            road_length: suitability
                .road_length_m
                .map_or_else(|| MISSING.to_string(), |m| format!("{}m", format_number(m))),
            population_density: suitability
                .population_density
                .map_or_else(|| MISSING.to_string(), |d| format!("{}/km²", format_thousands(d))),
            cafes: analysis.top5.iter().map(CafeRow::from_cafe).collect(),
        }
    }
}

/// Data a full report is built from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub selection: Selection,
    pub analysis: Option<&'a AnalysisResponse>,
    pub amenities: Option<&'a AmenitiesReport>,
    pub population: Option<&'a AreaPopulation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WardRow {
    pub ward_number: u32,
    pub population: String,
    pub density: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSection {
    pub total: String,
    /// "1 ward" or "N wards".
    pub wards_label: String,
    pub wards: Vec<WardRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmenitySection {
    pub title: String,
    pub count: u32,
    pub names: Vec<String>,
    /// Set when more amenities exist than are listed.
    pub more: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub title: &'static str,
    pub text: &'static str,
}

/// The modal report for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FullReport {
    pub coordinates: String,
    pub radius: String,
    pub cafe_type: String,
    pub score: Option<f64>,
    pub score_text: String,
    pub competitors: String,
    pub road_length: String,
    pub population_density: String,
    pub population: Option<PopulationSection>,
    pub amenities: Vec<AmenitySection>,
    pub probabilities: Vec<(String, String)>,
    pub insights: Vec<Insight>,
}

impl FullReport {
    pub fn build(inputs: ReportInputs<'_>) -> Self {
        let ReportInputs {
            selection,
            analysis,
            amenities,
            population,
        } = inputs;
        let panel = analysis.map(ResultsPanel::from_analysis);
        let score = analysis.and_then(|a| a.suitability.score);
        let competitor_count = analysis.and_then(competitors);
        let density = analysis.and_then(|a| a.suitability.population_density);

        let population = population
            .and_then(|p| p.total_population.filter(|total| *total > 0.0).map(|total| (p, total)))
            .map(|(p, total)| PopulationSection {
                total: format_thousands(total),
                wards_label: if p.affected_ward_count == 1 {
                    "1 ward".to_string()
                } else {
                    format!("{} wards", p.affected_ward_count)
                },
                wards: p
                    .affected_wards
                    .iter()
                    .map(|ward| WardRow {
                        ward_number: ward.ward_number,
                        population: format_thousands(ward.population),
                        density: format!("{:.0}/km²", ward.population_density),
                    })
                    .collect(),
            });

        let amenities = amenities
            .map(|report| {
                report
                    .amenities_report
                    .iter()
                    .map(|(kind, group)| AmenitySection {
                        title: amenity_title(kind),
                        count: group.count,
                        names: group
                            .amenities
                            .iter()
                            .take(AMENITY_PREVIEW)
                            .map(|a| a.name.clone().unwrap_or_else(|| "Unnamed".to_string()))
                            .collect(),
                        more: (group.count as usize > AMENITY_PREVIEW)
                            .then(|| format!("...and {} more", group.count as usize - AMENITY_PREVIEW)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let probabilities = analysis
            .map(|a| {
                a.prediction
                    .all_probabilities
                    .iter()
                    .map(|(label, p)| (label.clone(), percent(*p)))
                    .collect()
            })
            .unwrap_or_default();

        // Missing metrics rank as zero, matching the empty panel.
        let insights = vec![
            Insight {
                title: "Location Strength",
                text: location_strength(score.unwrap_or(0.0)),
            },
            Insight {
                title: "Competition Level",
                text: competition_level(competitor_count.unwrap_or(0)),
            },
            Insight {
                title: "Market Potential",
                text: market_potential(density.unwrap_or(0.0)),
            },
            Insight {
                title: "Recommendation",
                text: recommendation(score.unwrap_or(0.0)),
            },
        ];

        let missing = || MISSING.to_string();
        Self {
            coordinates: format!("{:.6}, {:.6}", selection.point.lat, selection.point.lng),
            radius: format!("{} meters", selection.radius_m),
            cafe_type: selection
                .cafe_type
                .map_or_else(|| "Not selected".to_string(), |t| t.label().to_string()),
            score,
            score_text: panel.as_ref().map_or_else(missing, |p| p.score.clone()),
            competitors: panel.as_ref().map_or_else(missing, |p| p.competitors.clone()),
            road_length: panel.as_ref().map_or_else(missing, |p| p.road_length.clone()),
            population_density: panel
                .as_ref()
                .map_or_else(missing, |p| p.population_density.clone()),
            population,
            amenities,
            probabilities,
            insights,
        }
    }
}
