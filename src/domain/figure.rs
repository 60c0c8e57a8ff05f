// Chart figure description, drawn by whatever front end consumes it
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    Pending,
    Achieved,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "anchor")]
pub enum AnnotationAnchor {
    /// Placed at a data coordinate
    Data { date: NaiveDate, value: f64 },
    /// Placed relative to the plot area, 0.0..=1.0 on both axes
    Paper { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub tone: Tone,
    #[serde(flatten)]
    pub anchor: AnnotationAnchor,
}

/// Vertical guide from zero up to a milestone marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideLine {
    pub date: NaiveDate,
    pub top: f64,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalFigure {
    pub title: String,
    pub cumulative: Vec<ChartPoint>,
    pub daily: Vec<ChartPoint>,
    pub annotations: Vec<Annotation>,
    pub guides: Vec<GuideLine>,
}
