//! Email-ready digests of a recommendation run.
//!
//! Only the text is produced here; delivery is left to whatever mailer the
//! caller pipes it into.

use serde::Serialize;

use lishe_recommend::metrics::BodyMetrics;
use lishe_recommend::Recommendations;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

impl Digest {
    pub fn render(&self) -> String {
        format!("Subject: {}\n\n{}\n", self.subject, self.body)
    }
}

/// One message listing every recommended food, group by group.
pub fn run_digest(recommendations: &Recommendations) -> Digest {
    Digest {
        subject: format!("Mapendekezo ya Vyakula ({})", recommendations.meta.goal),
        body: recommendations.all_names().collect::<Vec<_>>().join("\n"),
    }
}

/// One message per recommended food. Metric lines are omitted without a profile.
pub fn item_digests(
    recommendations: &Recommendations,
    greeting_name: Option<&str>,
    metrics: Option<&BodyMetrics>,
) -> Vec<Digest> {
    let goal = &recommendations.meta.goal;
    recommendations
        .all_names()
        .map(|food| item_digest(food, goal, greeting_name, metrics))
        .collect()
}

pub fn item_digest(
    food: &str,
    goal: &str,
    greeting_name: Option<&str>,
    metrics: Option<&BodyMetrics>,
) -> Digest {
    let greeting = match greeting_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Habari {name},"),
        None => "Salamu,".to_string(),
    };

    let mut lines = vec![
        greeting,
        String::new(),
        format!("Hapa kuna pendekezo: {food}"),
        format!("Lengo: {goal}"),
    ];
    if let Some(m) = metrics {
        lines.push(format!("BMI: {}", m.bmi));
        lines.push(format!("BMR: {}", m.bmr));
        lines.push(format!("TDEE: {}", m.tdee));
    }
    lines.push(String::new());
    lines.push("Asante.".to_string());

    Digest {
        subject: format!("Mapendekezo: {food} - {goal}"),
        body: lines.join("\n"),
    }
}
