// Mapper from location reports to chart figure descriptions
use crate::application::goal_service::LocationReport;
use crate::domain::figure::{Annotation, AnnotationAnchor, ChartPoint, GoalFigure, GuideLine, Tone};
use crate::domain::milestone::MilestoneResult;
use chrono::NaiveDate;

pub fn report_to_figure(report: &LocationReport, headline_threshold: f64) -> GoalFigure {
    let cumulative = report
        .series
        .iter()
        .map(|o| ChartPoint::new(o.date, o.cumulative_count as f64))
        .collect();
    let daily = report
        .series
        .iter()
        .map(|o| ChartPoint::new(o.date, o.daily_count as f64))
        .collect();

    let mut annotations = vec![summary_annotation(report)];
    let mut guides = Vec::new();

    for evaluation in &report.milestones {
        let result = match &evaluation.outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(
                    "No marker for {}% in {}: {}",
                    evaluation.threshold_percent,
                    report.location,
                    e
                );
                continue;
            }
        };

        let tone = if result.is_reached {
            Tone::Achieved
        } else {
            Tone::Pending
        };
        let text = if (result.threshold_percent - headline_threshold).abs() < f64::EPSILON {
            headline_text(result, report.doses_per_completion)
        } else {
            marker_text(result)
        };

        annotations.push(Annotation {
            text,
            tone,
            anchor: AnnotationAnchor::Data {
                date: result.date(),
                value: result.marker_count(),
            },
        });
        guides.push(GuideLine {
            date: result.date(),
            top: result.marker_count(),
            tone,
        });
    }

    GoalFigure {
        title: report.location.clone(),
        cumulative,
        daily,
        annotations,
        guides,
    }
}

fn summary_annotation(report: &LocationReport) -> Annotation {
    let fact = &report.fact;
    let text = format!(
        "Population: {} ({})\nVaccination started: {}\n{}: {} ({}%) people received at least {} doses, {} doses were administered",
        group_thousands(report.population),
        report.reference_year,
        long_date(report.vaccination_started),
        long_date(fact.latest_date),
        group_thousands(fact.fully_covered_count as i64),
        fact.percent_fully_covered() as i64,
        report.doses_per_completion,
        group_thousands(fact.latest_daily_count),
    );

    Annotation {
        text,
        tone: Tone::Neutral,
        anchor: AnnotationAnchor::Paper { x: 0.05, y: 0.95 },
    }
}

fn headline_text(result: &MilestoneResult, doses_per_completion: u32) -> String {
    let percent = format_percent(result.threshold_percent);
    if result.is_reached {
        format!(
            "Vaccination goal: {}% / {} doses achieved",
            percent, doses_per_completion
        )
    } else {
        format!(
            "Vaccination goal: {}% / {} doses in {} days ({}), ~{} doses required",
            percent,
            doses_per_completion,
            result.days_remaining,
            result.date().format("%B %Y"),
            approximate_count(result.target_dose_count)
        )
    }
}

fn marker_text(result: &MilestoneResult) -> String {
    let percent = format_percent(result.threshold_percent);
    if result.is_reached {
        format!("{}% reached", percent)
    } else {
        format!("{}%", percent)
    }
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

fn format_percent(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{:.0}", percent)
    } else {
        format!("{}", percent)
    }
}

/// "1234567" -> "1,234,567"
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn approximate_count(value: f64) -> String {
    const SCALES: [(f64, &str); 3] = [(1e12, "trillion"), (1e9, "billion"), (1e6, "million")];

    SCALES
        .iter()
        .find(|(scale, _)| value.abs() >= *scale)
        .map(|(scale, word)| format!("{:.1} {}", value / scale, word))
        .unwrap_or_else(|| group_thousands(value.round() as i64))
}
